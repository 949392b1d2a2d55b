use serde::{Deserialize, Serialize};

/// Placeholder used so that `weaknesses` is never empty.
pub const NO_WEAKNESS: &str = "Aucun point faible identifié";

/// Weakness recorded when no rule produced a strength.
pub const FEW_KEYWORDS: &str = "Peu de mots-clés pertinents trouvés dans l'offre";

/// Outcome of scoring one posting against one profile.
/// Fully self-contained and serializable.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreResult {
    /// Always within 0..=100.
    #[serde(default)]
    pub score: u8,
    #[serde(default)]
    pub justification: String,
    #[serde(rename = "points_forts", alias = "strengths", default)]
    pub strengths: Vec<String>,
    #[serde(rename = "points_faibles", alias = "weaknesses", default)]
    pub weaknesses: Vec<String>,
}

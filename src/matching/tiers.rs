use serde::Serialize;

use crate::config::MatchingThresholds;

/// Justification tier, decided by comparing a final score to the configured
/// thresholds (inclusive lower bounds).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchTier {
    Limited,
    Suggestion,
    HighPriority,
}

impl MatchTier {
    pub fn for_score(score: u8, thresholds: &MatchingThresholds) -> Self {
        let score = u32::from(score);
        if score >= thresholds.high_priority {
            MatchTier::HighPriority
        } else if score >= thresholds.suggestion {
            MatchTier::Suggestion
        } else {
            MatchTier::Limited
        }
    }

    pub fn message(self) -> &'static str {
        match self {
            MatchTier::HighPriority => {
                "Excellente correspondance avec votre profil ! Cette offre mérite une attention particulière."
            }
            MatchTier::Suggestion => "Bonne correspondance. Cette offre pourrait vous intéresser.",
            MatchTier::Limited => "Correspondance limitée. À évaluer avec attention.",
        }
    }
}

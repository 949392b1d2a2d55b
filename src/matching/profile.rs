use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ProfileError {
    #[error("Malformed profile: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainsOfInterest {
    #[serde(rename = "principaux", alias = "primary")]
    pub primary: Vec<String>,
    #[serde(rename = "secondaires", alias = "secondary")]
    pub secondary: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationPreferences {
    #[serde(rename = "preferences", alias = "preferred")]
    pub preferred: Vec<String>,
    #[serde(rename = "acceptables", alias = "acceptable")]
    pub acceptable: Vec<String>,
}

/// The one shape every scoring rule reads.
///
/// Built from either the full profile (location under `criteres_these`,
/// skills grouped by category) or the flattened one (top-level location,
/// flat skill list). Serializing it yields the flattened shape, which
/// normalizes back to an identical value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct CandidateProfile {
    #[serde(rename = "mots_cles_positifs")]
    pub positive_keywords: Vec<String>,
    #[serde(rename = "mots_cles_negatifs")]
    pub negative_keywords: Vec<String>,
    #[serde(rename = "domaines_interet")]
    pub domains: DomainsOfInterest,
    #[serde(rename = "localisation")]
    pub location: LocationPreferences,
    #[serde(rename = "competences")]
    pub skills: Vec<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawProfile {
    #[serde(alias = "positive_keywords")]
    mots_cles_positifs: Vec<String>,
    #[serde(alias = "negative_keywords")]
    mots_cles_negatifs: Vec<String>,
    #[serde(alias = "domains")]
    domaines_interet: DomainsOfInterest,
    #[serde(alias = "location")]
    localisation: Option<LocationPreferences>,
    #[serde(alias = "criteria")]
    criteres_these: Option<RawCriteria>,
    #[serde(alias = "skills")]
    competences: Option<Value>,
    #[serde(alias = "technical_skills")]
    competences_techniques: Option<Map<String, Value>>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawCriteria {
    #[serde(alias = "location")]
    localisation: LocationPreferences,
}

impl CandidateProfile {
    /// Accepts either profile shape.
    pub fn from_value(value: Value) -> Result<Self, ProfileError> {
        let raw: RawProfile = serde_json::from_value(value)?;
        Ok(Self::from(raw))
    }

    /// The token-reduced projection handed to callers that score many
    /// postings against the same profile.
    pub fn to_minimal(&self) -> Value {
        // A struct of strings and string vectors always serializes.
        serde_json::to_value(self).unwrap_or(Value::Null)
    }
}

impl From<RawProfile> for CandidateProfile {
    fn from(raw: RawProfile) -> Self {
        let location = match (raw.localisation, raw.criteres_these) {
            (Some(flat), _) => flat,
            (None, Some(criteria)) => criteria.localisation,
            (None, None) => LocationPreferences::default(),
        };

        let skills = match raw.competences {
            Some(Value::Array(items)) => strings_of(&items),
            _ => raw
                .competences_techniques
                .unwrap_or_default()
                .values()
                .filter_map(Value::as_array)
                .flat_map(|items| strings_of(items))
                .collect(),
        };

        CandidateProfile {
            positive_keywords: distinct(raw.mots_cles_positifs),
            negative_keywords: distinct(raw.mots_cles_negatifs),
            domains: DomainsOfInterest {
                primary: distinct(raw.domaines_interet.primary),
                secondary: distinct(raw.domaines_interet.secondary),
            },
            location: LocationPreferences {
                preferred: distinct(location.preferred),
                acceptable: distinct(location.acceptable),
            },
            skills: distinct(skills),
        }
    }
}

fn strings_of(items: &[Value]) -> Vec<String> {
    items
        .iter()
        .filter_map(Value::as_str)
        .map(str::to_string)
        .collect()
}

/// Trimmed, non-blank, first occurrence wins (case-insensitive).
fn distinct(terms: Vec<String>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::with_capacity(terms.len());
    let mut out = Vec::with_capacity(terms.len());
    for term in terms {
        let term = term.trim();
        if term.is_empty() {
            continue;
        }
        let key = term.to_lowercase();
        if !seen.contains(&key) {
            seen.push(key);
            out.push(term.to_string());
        }
    }
    out
}

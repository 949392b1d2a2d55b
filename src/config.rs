//! Settings handed to the core as already-loaded structured data.
//!
//! Reading files (YAML, JSON, environment) is left to the embedding process;
//! this module validates what it receives and fails loudly on anything the
//! scorer or the tracking sink cannot work without.

use serde::{Deserialize, Serialize};
use serde_json::{Number, Value};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing required setting: {0}")]
    MissingField(&'static str),
    #[error("Setting {name} must be a non-negative number, got {value}")]
    OutOfRange { name: &'static str, value: f64 },
    #[error("Malformed configuration: {0}")]
    Malformed(#[from] serde_json::Error),
}

/// Score cut-offs for the justification tiers.
///
/// Any ordering is accepted: a suggestion cut-off above the high-priority one
/// only means the middle tier is never reached, and a cut-off above 100 means
/// its tier never is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchingThresholds {
    #[serde(rename = "seuil_haute_priorite")]
    pub high_priority: u32,
    #[serde(rename = "seuil_suggestion")]
    pub suggestion: u32,
}

impl MatchingThresholds {
    pub fn new(high_priority: u32, suggestion: u32) -> Self {
        Self {
            high_priority,
            suggestion,
        }
    }
}

/// Destination parameters for the tracking sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TrackingSettings {
    #[serde(alias = "destination")]
    pub database_id: String,
    /// Status label given to freshly created entries.
    #[serde(alias = "default_status")]
    pub statut_nouveau: String,
    #[serde(default, alias = "entry_type")]
    pub type_these: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    pub matching: MatchingThresholds,
    pub tracking: Option<TrackingSettings>,
}

#[derive(Deserialize)]
struct RawSettings {
    #[serde(default)]
    matching: Option<RawMatching>,
    #[serde(default, alias = "tracking")]
    notion: Option<TrackingSettings>,
}

#[derive(Deserialize)]
struct RawMatching {
    #[serde(default, alias = "high_priority")]
    seuil_haute_priorite: Option<Number>,
    #[serde(default, alias = "suggestion")]
    seuil_suggestion: Option<Number>,
}

impl Settings {
    pub fn from_value(value: Value) -> Result<Self, ConfigError> {
        let raw: RawSettings = serde_json::from_value(value)?;
        let matching = raw
            .matching
            .ok_or(ConfigError::MissingField("matching"))?;

        let high_priority = threshold(
            matching.seuil_haute_priorite,
            "matching.seuil_haute_priorite",
        )?;
        let suggestion = threshold(matching.seuil_suggestion, "matching.seuil_suggestion")?;

        Ok(Settings {
            matching: MatchingThresholds::new(high_priority, suggestion),
            tracking: raw.notion,
        })
    }

    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let value: Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    pub fn tracking(&self) -> Result<&TrackingSettings, ConfigError> {
        self.tracking
            .as_ref()
            .ok_or(ConfigError::MissingField("notion"))
    }
}

fn threshold(value: Option<Number>, name: &'static str) -> Result<u32, ConfigError> {
    let value = value.ok_or(ConfigError::MissingField(name))?;
    if let Some(whole) = value.as_u64() {
        return Ok(u32::try_from(whole).unwrap_or(u32::MAX));
    }
    // YAML-converted settings often carry `60.0`; fractions are floored
    let v = value.as_f64().unwrap_or(f64::NAN);
    if v.is_finite() && v >= 0.0 {
        Ok(v.floor().min(f64::from(u32::MAX)) as u32)
    } else {
        Err(ConfigError::OutOfRange { name, value: v })
    }
}

/// Every `http(s)` URL found anywhere in a monitored-sources document, in
/// document order, without repeats.
pub fn source_urls(sources: &Value) -> Vec<String> {
    let mut urls = Vec::new();
    collect_urls(sources, &mut urls);
    urls
}

fn collect_urls(value: &Value, urls: &mut Vec<String>) {
    match value {
        Value::String(s) => {
            let s = s.trim();
            if (s.starts_with("http://") || s.starts_with("https://"))
                && !urls.iter().any(|u| u == s)
            {
                urls.push(s.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_urls(item, urls)),
        Value::Object(map) => map.values().for_each(|item| collect_urls(item, urls)),
        _ => {}
    }
}

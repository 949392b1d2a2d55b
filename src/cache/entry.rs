use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};

use crate::types::identifiers::PostingId;

/// One line of the seen-cache: appended once, never mutated, never removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeenEntry {
    pub hash: PostingId,
    #[serde(rename = "date_vue", deserialize_with = "deserialize_first_seen")]
    pub first_seen: DateTime<Utc>,
    #[serde(rename = "titre")]
    pub title: String,
}

/// Accepts RFC 3339 as well as offset-less ISO-8601 timestamps (read as UTC),
/// which older cache files contain.
fn deserialize_first_seen<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;

    if let Ok(dt) = DateTime::parse_from_rfc3339(&raw) {
        return Ok(dt.with_timezone(&Utc));
    }

    raw.parse::<NaiveDateTime>()
        .map(|naive| naive.and_utc())
        .map_err(|e| serde::de::Error::custom(format!("invalid date_vue {raw:?}: {e}")))
}

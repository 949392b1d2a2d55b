use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime};
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::types::identifiers::PostingId;

/// A single discovered doctoral-position advertisement.
///
/// Carries no stored identity; see [`Posting::id`].
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Posting {
    #[serde(rename = "titre", alias = "title")]
    pub title: String,
    pub description: String,
    #[serde(rename = "labo", alias = "lab")]
    pub lab: String,
    pub url: String,
    #[serde(rename = "lieu", alias = "location")]
    pub location: Option<String>,
    #[serde(
        rename = "date_publication",
        alias = "published_on",
        deserialize_with = "deserialize_loose_date"
    )]
    pub published_on: Option<NaiveDate>,
    #[serde(
        rename = "date_limite",
        alias = "deadline",
        deserialize_with = "deserialize_loose_date"
    )]
    pub deadline: Option<NaiveDate>,
}

impl Posting {
    pub fn new(title: impl Into<String>, lab: impl Into<String>, url: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            lab: lab.into(),
            url: url.into(),
            ..Self::default()
        }
    }

    /// Identity over (title, lab, url). Pure, stable across runs and processes.
    pub fn id(&self) -> PostingId {
        PostingId::from_fields(&self.title, &self.lab, &self.url)
    }

    /// Location, or `None` when unset or blank.
    pub fn location(&self) -> Option<&str> {
        self.location
            .as_deref()
            .map(str::trim)
            .filter(|loc| !loc.is_empty())
    }

    /// True when the posting was published in the last `days` days relative
    /// to `today`. Undated postings are always kept.
    pub fn published_within(&self, days: u32, today: NaiveDate) -> bool {
        match self.published_on {
            Some(date) => match today.checked_sub_signed(Duration::days(i64::from(days))) {
                Some(cutoff) => date >= cutoff,
                None => true,
            },
            None => true,
        }
    }
}

/// Dates arrive as whatever the source page or the caller wrote. Nothing
/// downstream depends on them, so an unreadable date is dropped rather than
/// failing the whole posting.
fn deserialize_loose_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Value::deserialize(deserializer)?;
    Ok(raw.as_str().and_then(parse_date))
}

/// `YYYY-MM-DD`, RFC 3339, offset-less ISO-8601 datetime or `dd/mm/yyyy`.
fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();

    if let Ok(date) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        return Some(date);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    if let Ok(naive) = raw.parse::<NaiveDateTime>() {
        return Some(naive.date());
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S") {
        return Some(naive.date());
    }
    NaiveDate::parse_from_str(raw, "%d/%m/%Y").ok()
}

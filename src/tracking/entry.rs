use serde::Serialize;

use crate::config::TrackingSettings;
use crate::posting::Posting;
use crate::types::score::ScoreResult;

/// Sink text fields are cut to this many characters.
pub const FIELD_MAX_CHARS: usize = 2000;

pub const UNKNOWN_LAB: &str = "Laboratoire non spécifié";

/// The structured record handed to the tracking sink.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TrackingEntry {
    pub destination: String,
    pub organization: String,
    pub status: String,
    pub entry_type: Option<String>,
    pub position: Option<String>,
    pub url: Option<String>,
    pub city: Option<String>,
    pub note: String,
}

impl TrackingEntry {
    pub fn build(posting: &Posting, result: &ScoreResult, settings: &TrackingSettings) -> Self {
        let organization = match posting.lab.trim() {
            "" => UNKNOWN_LAB.to_string(),
            lab => lab.to_string(),
        };

        TrackingEntry {
            destination: settings.database_id.clone(),
            organization,
            status: settings.statut_nouveau.clone(),
            entry_type: settings.type_these.clone(),
            position: non_empty(&posting.title).map(|t| truncate(t, FIELD_MAX_CHARS)),
            url: non_empty(&posting.url).map(str::to_string),
            city: posting.location().map(str::to_string),
            note: truncate(&render_note(result), FIELD_MAX_CHARS),
        }
    }
}

fn render_note(result: &ScoreResult) -> String {
    let bullets = |items: &[String]| {
        items
            .iter()
            .map(|item| format!("• {item}"))
            .collect::<Vec<_>>()
            .join("\n")
    };

    format!(
        "[Score: {}/100]\n\n{}\n\nPoints forts:\n{}\n\nPoints faibles:\n{}",
        result.score,
        result.justification,
        bullets(result.strengths.as_slice()),
        bullets(result.weaknesses.as_slice()),
    )
}

fn non_empty(s: &str) -> Option<&str> {
    let s = s.trim();
    (!s.is_empty()).then_some(s)
}

fn truncate(s: &str, max_chars: usize) -> String {
    s.chars().take(max_chars).collect()
}

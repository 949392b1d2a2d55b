pub mod entry;
pub mod followup;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use entry::{TrackingEntry, FIELD_MAX_CHARS, UNKNOWN_LAB};
pub use followup::{
    next_status, run_follow_ups, ApplicationStore, EntryDate, FollowUp, FollowUpReport,
    TrackedApplication,
};

#[derive(Debug, Error)]
pub enum SinkError {
    #[error("Missing credentials: {0}")]
    MissingCredentials(String),
    #[error("Entry rejected: {0}")]
    Rejected(String),
    #[error("Transport error: {0}")]
    Transport(String),
}

/// What the sink hands back for a created entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CreatedEntry {
    pub id: String,
    pub url: String,
}

/// External system recording qualifying postings for follow-up.
#[async_trait]
pub trait TrackingSink: Send + Sync {
    async fn create_entry(&self, entry: &TrackingEntry) -> Result<CreatedEntry, SinkError>;
}

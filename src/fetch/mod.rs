pub mod http;
pub mod orchestrator;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

pub use http::HttpFetcher;
pub use orchestrator::{SaveFailed, ScrapeMetadata, ScrapeReport, SourceScraper};

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),
    #[error("{url} answered with status {status}")]
    Status { url: String, status: u16 },
    #[error("{url} timed out after {after:?}")]
    Timeout { url: String, after: Duration },
}

/// Retrieves raw markup for one source URL.
#[async_trait]
pub trait PageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Pause between two consecutive requests.
    pub request_delay: Duration,
    /// A single source is abandoned after this long.
    pub request_timeout: Duration,
    pub user_agent: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            request_delay: Duration::from_secs(2),
            request_timeout: Duration::from_secs(30),
            user_agent: "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36"
                .to_string(),
        }
    }
}

pub mod keywords;
pub mod labs;
pub mod links;

use crate::posting::Posting;

pub use keywords::KeywordSet;
pub use labs::LabDirectory;
pub use links::{LinkExtractor, DESCRIPTION_MAX_CHARS};

/// Turns one fetched page into candidate postings.
///
/// Never fails: malformed or empty markup yields no candidates. No
/// deduplication happens here; that is the seen-cache's job.
pub trait Extractor {
    fn extract(&self, markup: &str, source_url: &str) -> Vec<Posting>;
}

use serde::Serialize;
use thiserror::Error;
use tracing::{error, info, warn};

use crate::cache::{CacheError, SeenCache};
use crate::extraction::Extractor;
use crate::fetch::{FetchError, PageFetcher, ScrapeConfig};
use crate::posting::Posting;

/// Counters describing one `scrape_all` run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ScrapeMetadata {
    pub sources_attempted: usize,
    pub sources_failed: usize,
    pub candidates_found: usize,
    pub postings_new: usize,
}

/// Result of a run: postings never seen before, in discovery order.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ScrapeReport {
    pub postings: Vec<Posting>,
    pub metadata: ScrapeMetadata,
}

/// The run completed but the seen-cache could not be persisted.
///
/// The in-memory cache already holds every identity in `report`, so the
/// postings are only recoverable from here; reloading the cache from disk
/// brings them back as new on the next run.
#[derive(Debug, Error)]
#[error("scrape run finished but the seen-cache was not saved: {source}")]
pub struct SaveFailed {
    pub report: ScrapeReport,
    #[source]
    pub source: CacheError,
}

/// Walks a list of sources one at a time, feeding each page through the
/// extractor and the seen-cache.
///
/// Strictly sequential: one request in flight, a fixed pause between
/// requests. The cache is persisted once, after the last source; dropping
/// the future early discards the whole run.
pub struct SourceScraper<F, E> {
    fetcher: F,
    extractor: E,
    config: ScrapeConfig,
}

impl<F, E> SourceScraper<F, E>
where
    F: PageFetcher,
    E: Extractor,
{
    pub fn new(fetcher: F, extractor: E, config: ScrapeConfig) -> Self {
        Self {
            fetcher,
            extractor,
            config,
        }
    }

    pub fn config(&self) -> &ScrapeConfig {
        &self.config
    }

    pub async fn scrape_all<I, S>(
        &self,
        urls: I,
        cache: &mut SeenCache,
    ) -> Result<ScrapeReport, SaveFailed>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut report = ScrapeReport::default();

        for (i, url) in urls.into_iter().enumerate() {
            let url = url.as_ref();
            if i > 0 && !self.config.request_delay.is_zero() {
                tokio::time::sleep(self.config.request_delay).await;
            }

            report.metadata.sources_attempted += 1;
            info!(url, "scraping source");

            let markup = match self.fetch_bounded(url).await {
                Ok(markup) => markup,
                Err(e) => {
                    warn!(url, error = %e, "fetch failed, source skipped");
                    report.metadata.sources_failed += 1;
                    continue;
                }
            };

            let candidates = self.extractor.extract(&markup, url);
            report.metadata.candidates_found += candidates.len();

            let mut fresh = 0;
            for posting in candidates {
                // check-and-record in one step: a repeat within the same run is not new
                if cache.record(&posting) {
                    report.postings.push(posting);
                    fresh += 1;
                }
            }
            report.metadata.postings_new += fresh;

            info!(url, new = fresh, "source processed");
        }

        if let Err(source) = cache.save() {
            error!(path = %cache.path().display(), error = %source, "seen-cache not saved");
            return Err(SaveFailed { report, source });
        }

        info!(
            sources = report.metadata.sources_attempted,
            failed = report.metadata.sources_failed,
            new = report.metadata.postings_new,
            "scrape run complete"
        );
        Ok(report)
    }

    async fn fetch_bounded(&self, url: &str) -> Result<String, FetchError> {
        let timeout = self.config.request_timeout;
        match tokio::time::timeout(timeout, self.fetcher.fetch(url)).await {
            Ok(result) => result,
            Err(_) => Err(FetchError::Timeout {
                url: url.to_string(),
                after: timeout,
            }),
        }
    }
}

use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use phd_watch::cache::{CacheError, SeenCache};
use phd_watch::extraction::LinkExtractor;
use phd_watch::fetch::{FetchError, PageFetcher, ScrapeConfig, SourceScraper};
use tempfile::tempdir;
use tokio::time::Instant;

enum Page {
    Markup(&'static str),
    Unreachable,
    Slow(&'static str),
}

/// Serves canned pages and remembers the order it was asked for them.
struct ScriptedFetcher {
    pages: HashMap<&'static str, Page>,
    calls: Mutex<Vec<(String, Instant)>>,
}

impl ScriptedFetcher {
    fn new(pages: Vec<(&'static str, Page)>) -> Self {
        Self {
            pages: pages.into_iter().collect(),
            calls: Mutex::new(Vec::new()),
        }
    }

    fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().iter().map(|(url, _)| url.clone()).collect()
    }

    fn call_times(&self) -> Vec<Instant> {
        self.calls.lock().unwrap().iter().map(|(_, at)| *at).collect()
    }
}

#[async_trait]
impl PageFetcher for ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        self.calls.lock().unwrap().push((url.to_string(), Instant::now()));
        match self.pages.get(url) {
            Some(Page::Markup(html)) => Ok(html.to_string()),
            Some(Page::Slow(html)) => {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(html.to_string())
            }
            Some(Page::Unreachable) | None => Err(FetchError::Status {
                url: url.to_string(),
                status: 503,
            }),
        }
    }
}

#[async_trait]
impl<'a> PageFetcher for &'a ScriptedFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        (**self).fetch(url).await
    }
}

fn test_config() -> ScrapeConfig {
    ScrapeConfig {
        request_delay: Duration::ZERO,
        request_timeout: Duration::from_millis(100),
        user_agent: "phd-watch-tests".to_string(),
    }
}

const LAAS: &str = "https://www.laas.fr/offres";
const LABRI: &str = "https://www.labri.fr/emplois";
const DOWN: &str = "https://down.example.org/";
const EMPTY: &str = "https://timc.fr/news";

const LAAS_HTML: &str = r#"<ul>
  <li><a href="/t/1">Thèse en robotique</a></li>
  <li><a href="/t/2">PhD in control</a></li>
  <li><a href="/contact">Contact</a></li>
</ul>"#;
const LABRI_HTML: &str = r#"<p><a href="https://www.labri.fr/d/9">Doctorat en informatique</a></p>"#;
const EMPTY_HTML: &str = "<p>Aucune offre pour le moment</p>";

#[tokio::test]
async fn second_run_finds_nothing_new() {
    let dir = tempdir().unwrap();
    let cache_path = dir.path().join("offres_vues.json");
    let urls = [LAAS, LABRI];

    let fetcher = ScriptedFetcher::new(vec![
        (LAAS, Page::Markup(LAAS_HTML)),
        (LABRI, Page::Markup(LABRI_HTML)),
    ]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());

    let mut cache = SeenCache::load(&cache_path).unwrap();
    let first = scraper.scrape_all(urls, &mut cache).await.unwrap();

    let titles: Vec<&str> = first.postings.iter().map(|p| p.title.as_str()).collect();
    assert_eq!(
        titles,
        vec!["Thèse en robotique", "PhD in control", "Doctorat en informatique"]
    );
    assert_eq!(first.metadata.postings_new, 3);
    assert!(cache_path.exists(), "cache must be persisted after the run");

    let mut reloaded = SeenCache::load(&cache_path).unwrap();
    assert_eq!(reloaded.len(), 3);

    let second = scraper.scrape_all(urls, &mut reloaded).await.unwrap();
    assert!(second.postings.is_empty());
    assert_eq!(second.metadata.candidates_found, 3);
    assert_eq!(SeenCache::load(&cache_path).unwrap().len(), 3);
}

#[tokio::test]
async fn failing_source_does_not_abort_the_run() {
    let dir = tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        (LAAS, Page::Markup(LAAS_HTML)),
        (DOWN, Page::Unreachable),
        (LABRI, Page::Markup(LABRI_HTML)),
    ]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let report = scraper.scrape_all([LAAS, DOWN, LABRI], &mut cache).await.unwrap();

    assert_eq!(report.postings.len(), 3);
    assert_eq!(report.metadata.sources_attempted, 3);
    assert_eq!(report.metadata.sources_failed, 1);
}

#[tokio::test]
async fn slow_source_is_abandoned_after_timeout() {
    let dir = tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        (DOWN, Page::Slow(LABRI_HTML)),
        (LAAS, Page::Markup(LAAS_HTML)),
    ]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let report = scraper.scrape_all([DOWN, LAAS], &mut cache).await.unwrap();

    assert_eq!(report.metadata.sources_failed, 1);
    assert_eq!(report.postings.len(), 2);
    assert!(report.postings.iter().all(|p| p.lab == "LAAS-CNRS"));
}

#[tokio::test]
async fn page_without_matches_contributes_nothing() {
    let dir = tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        (EMPTY, Page::Markup(EMPTY_HTML)),
        (LABRI, Page::Markup(LABRI_HTML)),
    ]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let report = scraper.scrape_all([EMPTY, LABRI], &mut cache).await.unwrap();

    assert_eq!(report.postings.len(), 1);
    assert_eq!(report.postings[0].lab, "LaBRI");
    assert_eq!(report.metadata.sources_failed, 0);
}

#[tokio::test]
async fn later_sources_see_earlier_identities() {
    let dir = tempdir().unwrap();
    let page_a = "https://www.laas.fr/a";
    let page_b = "https://www.laas.fr/b";
    // same title, same host-derived lab, same absolute url
    let html = r#"<p><a href="https://www.laas.fr/t/1">Thèse en robotique</a></p>"#;

    let fetcher = ScriptedFetcher::new(vec![(page_a, Page::Markup(html)), (page_b, Page::Markup(html))]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let report = scraper.scrape_all([page_a, page_b], &mut cache).await.unwrap();

    assert_eq!(report.postings.len(), 1);
    assert_eq!(report.metadata.candidates_found, 2);
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn sources_are_fetched_in_order() {
    let dir = tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        (LABRI, Page::Markup(LABRI_HTML)),
        (LAAS, Page::Markup(LAAS_HTML)),
    ]);
    let config = ScrapeConfig {
        request_delay: Duration::from_millis(10),
        ..test_config()
    };
    let scraper = SourceScraper::new(&fetcher, LinkExtractor::default(), config);
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    scraper.scrape_all([LABRI, LAAS, LABRI], &mut cache).await.unwrap();

    assert_eq!(fetcher.calls(), vec![LABRI, LAAS, LABRI]);
    assert_eq!(cache.len(), 3);
}

#[tokio::test(start_paused = true)]
async fn delay_separates_requests_but_does_not_trail_the_last() {
    let dir = tempdir().unwrap();
    let fetcher = ScriptedFetcher::new(vec![
        (LAAS, Page::Markup(LAAS_HTML)),
        (DOWN, Page::Unreachable),
        (LABRI, Page::Markup(LABRI_HTML)),
    ]);
    let delay = Duration::from_secs(2);
    let config = ScrapeConfig {
        request_delay: delay,
        ..test_config()
    };
    let scraper = SourceScraper::new(&fetcher, LinkExtractor::default(), config);
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let started = Instant::now();
    scraper.scrape_all([LAAS, DOWN, LABRI], &mut cache).await.unwrap();
    let finished = Instant::now();

    let times = fetcher.call_times();
    assert_eq!(times.len(), 3);
    assert_eq!(times[0], started, "first request goes out immediately");
    assert_eq!(times[1] - times[0], delay);
    assert_eq!(times[2] - times[1], delay, "a failed source still counts as a request");
    assert_eq!(finished, times[2], "no pause after the last request");
}

#[tokio::test]
async fn unsaved_run_still_hands_back_its_postings() {
    let dir = tempdir().unwrap();
    let blocker = dir.path().join("not-a-directory");
    std::fs::write(&blocker, "x").unwrap();

    let fetcher = ScriptedFetcher::new(vec![(LABRI, Page::Markup(LABRI_HTML))]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(blocker.join("offres_vues.json"));

    let failed = scraper.scrape_all([LABRI], &mut cache).await.unwrap_err();

    assert!(matches!(failed.source, CacheError::Io { .. }));
    assert_eq!(failed.report.postings.len(), 1);
    assert_eq!(failed.report.postings[0].title, "Doctorat en informatique");
    assert_eq!(cache.len(), 1);
}

#[tokio::test]
async fn duplicate_links_on_one_page_are_recorded_once() {
    let dir = tempdir().unwrap();
    let html = r#"<div><a href="/t/1">Thèse</a><a href="/t/1">Thèse</a></div>"#;
    let fetcher = ScriptedFetcher::new(vec![(LAAS, Page::Markup(html))]);
    let scraper = SourceScraper::new(fetcher, LinkExtractor::default(), test_config());
    let mut cache = SeenCache::empty(dir.path().join("c.json"));

    let report = scraper.scrape_all([LAAS], &mut cache).await.unwrap();

    assert_eq!(report.metadata.candidates_found, 2);
    assert_eq!(report.postings.len(), 1);
    assert_eq!(cache.len(), 1);
}

#[test]
fn pipeline_fetch_errors_name_their_source() {
    let errors = [
        FetchError::Status {
            url: DOWN.to_string(),
            status: 503,
        },
        FetchError::Timeout {
            url: DOWN.to_string(),
            after: Duration::from_secs(30),
        },
    ];

    for error in &errors {
        let url = match error {
            FetchError::Http(_) => unreachable!("built by reqwest only"),
            FetchError::Status { url, .. } | FetchError::Timeout { url, .. } => url,
        };
        assert!(error.to_string().contains(url.as_str()), "{error}");
    }
}

#[test]
fn default_config_is_polite() {
    let config = ScrapeConfig::default();

    assert_eq!(config.request_delay, Duration::from_secs(2));
    assert_eq!(config.request_timeout, Duration::from_secs(30));
}

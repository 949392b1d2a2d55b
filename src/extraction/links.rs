use scraper::{ElementRef, Html, Selector};
use url::Url;

use crate::extraction::keywords::KeywordSet;
use crate::extraction::labs::LabDirectory;
use crate::extraction::Extractor;
use crate::posting::Posting;

/// Maximum characters kept from the block surrounding a matched link.
pub const DESCRIPTION_MAX_CHARS: usize = 300;

const BLOCK_TAGS: &[&str] = &[
    "p", "div", "li", "td", "th", "tr", "dd", "dt", "article", "section", "header", "footer",
    "main", "aside", "blockquote", "h1", "h2", "h3", "h4", "h5", "h6", "table", "ul", "ol",
    "body",
];

/// Generic extraction: every hyperlink whose visible text contains a doctoral
/// keyword becomes one candidate posting.
///
/// Site-agnostic, so publication date and location are never set.
#[derive(Debug, Clone)]
pub struct LinkExtractor {
    keywords: KeywordSet,
    labs: LabDirectory,
}

impl Default for LinkExtractor {
    fn default() -> Self {
        Self {
            keywords: KeywordSet::default(),
            labs: LabDirectory::known_labs(),
        }
    }
}

impl LinkExtractor {
    pub fn new(keywords: KeywordSet, labs: LabDirectory) -> Self {
        Self { keywords, labs }
    }

    pub fn keywords(&self) -> &KeywordSet {
        &self.keywords
    }

    pub fn labs(&self) -> &LabDirectory {
        &self.labs
    }
}

impl Extractor for LinkExtractor {
    fn extract(&self, markup: &str, source_url: &str) -> Vec<Posting> {
        let Ok(links) = Selector::parse("a[href]") else {
            return Vec::new();
        };

        let document = Html::parse_document(markup);
        let base = Url::parse(source_url.trim()).ok();
        let lab = self.labs.label_for_url(source_url);

        let mut postings = Vec::new();
        for link in document.select(&links) {
            let title = collapse_whitespace(link.text());
            if !self.keywords.matches(&title.to_lowercase()) {
                continue;
            }

            let href = link.value().attr("href").unwrap_or_default();

            postings.push(Posting {
                title,
                description: describe(&link),
                lab: lab.clone(),
                url: resolve_href(base.as_ref(), href),
                location: None,
                published_on: None,
                deadline: None,
            });
        }

        postings
    }
}

/// Absolute hrefs are kept verbatim; relative ones are joined onto the
/// source page. Unresolvable hrefs pass through trimmed.
fn resolve_href(base: Option<&Url>, href: &str) -> String {
    let href = href.trim();
    if Url::parse(href).is_ok() {
        return href.to_string();
    }

    match base.map(|b| b.join(href)) {
        Some(Ok(resolved)) => resolved.into(),
        _ => href.to_string(),
    }
}

/// Text of the nearest enclosing block element, or of the direct parent
/// when no block ancestor exists.
fn describe(link: &ElementRef<'_>) -> String {
    let mut ancestors = link.ancestors().filter_map(ElementRef::wrap);
    let Some(parent) = ancestors.next() else {
        return String::new();
    };

    let block = std::iter::once(parent)
        .chain(ancestors)
        .find(|el| BLOCK_TAGS.contains(&el.value().name()))
        .unwrap_or(parent);

    collapse_whitespace(block.text())
        .chars()
        .take(DESCRIPTION_MAX_CHARS)
        .collect()
}

fn collapse_whitespace<'a>(parts: impl Iterator<Item = &'a str>) -> String {
    parts
        .flat_map(str::split_whitespace)
        .collect::<Vec<_>>()
        .join(" ")
}

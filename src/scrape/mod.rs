//! Resource locator for the survey listing page.
//!
//! The listing page groups each fiscal year under a `FY NNNN` section
//! header; the anchors following a header (up to the next header) are that
//! year's downloadable resources. The scrape result is memoized in
//! `urls.json` under the shared cache root, so subsequent runs make no
//! network call unless a forced refresh is requested.

mod error;

use std::collections::BTreeMap;
use std::sync::{Arc, LazyLock};

use async_trait::async_trait;
use regex::Regex;
use scraper::{ElementRef, Html, Selector};
use tracing::{debug, info};

use crate::cache::OnDiskCache;
use crate::config::Config;

pub use error::ScrapeError;

/// The survey listing page.
pub const SURVEY_URL: &str =
    "https://www.imls.gov/research-evaluation/data-collection/public-libraries-survey";

/// Shared cache file holding the scraped resource map.
pub const CACHED_URLS_FILE: &str = "urls.json";

/// Scraped resource map: year → anchor label → href.
///
/// Labels are free-text anchor captions taken verbatim from the page; they
/// are not normalized, so lookups are exact-string.
pub type ResourceMap = BTreeMap<String, BTreeMap<String, String>>;

// Loose match used to recognize fiscal-year headers anywhere in the text.
#[allow(clippy::expect_used)]
static YEAR_SEARCH: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"FY \d{4}").expect("static pattern"));

// Anchored match used to pull the year out of a recognized header.
#[allow(clippy::expect_used)]
static YEAR_CAPTURE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^FY (\d{4})").expect("static pattern"));

/// Seam for resource location, consumed by the downloader.
#[async_trait]
pub trait Scrape: Send + Sync {
    /// Produces the year → label → href resource map.
    async fn scrape(&self) -> Result<ResourceMap, ScrapeError>;
}

/// Scrapes the survey listing page into a [`ResourceMap`].
#[derive(Debug)]
pub struct ScrapingService {
    config: Config,
    cache: Arc<OnDiskCache>,
    client: reqwest::Client,
    listing_url: String,
}

impl ScrapingService {
    /// Creates a locator against the production listing page.
    #[must_use]
    pub fn new(config: Config, cache: Arc<OnDiskCache>) -> Self {
        Self {
            config,
            cache,
            client: reqwest::Client::new(),
            listing_url: SURVEY_URL.to_string(),
        }
    }

    /// Overrides the listing URL (test servers).
    #[must_use]
    pub fn with_listing_url(mut self, url: impl Into<String>) -> Self {
        self.listing_url = url.into();
        self
    }

    async fn scrape_listing(&self) -> Result<ResourceMap, ScrapeError> {
        let response = self
            .client
            .get(&self.listing_url)
            .send()
            .await
            .map_err(|e| ScrapeError::network(&self.listing_url, e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ScrapeError::http_status(&self.listing_url, status.as_u16()));
        }

        let body = response
            .text()
            .await
            .map_err(|e| ScrapeError::network(&self.listing_url, e))?;

        parse_listing(&body)
    }
}

#[async_trait]
impl Scrape for ScrapingService {
    async fn scrape(&self) -> Result<ResourceMap, ScrapeError> {
        if !self.config.overwrite_cached_urls {
            if let Some(cached) = self.cache.get_json_shared(CACHED_URLS_FILE)? {
                debug!("returning cached resource map");
                return serde_json::from_value(cached)
                    .map_err(|source| ScrapeError::ResourceMapFormat { source });
            }
        }

        info!(url = %self.listing_url, "scraping survey listing page");
        let map = self.scrape_listing().await?;

        let document = serde_json::to_value(&map)
            .map_err(|source| ScrapeError::ResourceMapFormat { source })?;
        self.cache.put_json_shared(&document, CACHED_URLS_FILE)?;

        Ok(map)
    }
}

#[allow(clippy::expect_used)]
fn selector(css: &str) -> Selector {
    Selector::parse(css).expect("static selector")
}

/// Parses the listing page body into a resource map.
///
/// For each `label` header matching the fiscal-year pattern, following
/// siblings are walked in document order collecting every anchor until the
/// next fiscal-year header.
pub(crate) fn parse_listing(html: &str) -> Result<ResourceMap, ScrapeError> {
    let document = Html::parse_document(html);
    let header_selector = selector("label");
    let anchor_selector = selector("a");

    let mut map = ResourceMap::new();

    for header in document.select(&header_selector) {
        let header_text: String = header.text().collect();
        if !YEAR_SEARCH.is_match(&header_text) {
            continue;
        }
        let year = year_from_header(header_text.trim())?;
        let entries = map.entry(year).or_default();

        for sibling in header.next_siblings() {
            let Some(element) = ElementRef::wrap(sibling) else {
                continue;
            };
            let element_text: String = element.text().collect();
            if element.value().name() == "label" && YEAR_SEARCH.is_match(&element_text) {
                break;
            }
            if element.value().name() == "a" {
                if let Some(href) = element.value().attr("href") {
                    entries.insert(element_text, href.to_string());
                }
                continue;
            }
            for anchor in element.select(&anchor_selector) {
                if let Some(href) = anchor.value().attr("href") {
                    let label: String = anchor.text().collect();
                    entries.insert(label, href.to_string());
                }
            }
        }
    }

    Ok(map)
}

/// Extracts the four-digit year from a recognized header.
///
/// The page structure is assumed stable; a recognized header that fails
/// the anchored pattern is a fatal parsing error.
pub(crate) fn year_from_header(header_text: &str) -> Result<String, ScrapeError> {
    YEAR_CAPTURE
        .captures(header_text)
        .and_then(|captures| captures.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(|| ScrapeError::HeaderPattern {
            header: header_text.to_string(),
        })
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    const LISTING: &str = r#"
        <html><body>
          <label>FY 2018</label>
          <div>
            <p><a href="/sites/2018/docs.pdf">Documentation</a></p>
            <p><a href="/sites/2018/csv.zip">CSV</a></p>
          </div>
          <a href="/sites/2018/defs.pdf">Data Element Definitions</a>
          <label>FY 2017</label>
          <div>
            <a href="/sites/2017/docs.pdf">Documentation</a>
          </div>
        </body></html>
    "#;

    #[test]
    fn test_parse_listing_groups_anchors_by_year() {
        let map = parse_listing(LISTING).unwrap();

        let fy2018 = map.get("2018").unwrap();
        assert_eq!(fy2018.get("Documentation").unwrap(), "/sites/2018/docs.pdf");
        assert_eq!(fy2018.get("CSV").unwrap(), "/sites/2018/csv.zip");
        assert_eq!(
            fy2018.get("Data Element Definitions").unwrap(),
            "/sites/2018/defs.pdf"
        );

        let fy2017 = map.get("2017").unwrap();
        assert_eq!(fy2017.len(), 1);
        assert_eq!(fy2017.get("Documentation").unwrap(), "/sites/2017/docs.pdf");
    }

    #[test]
    fn test_parse_listing_stops_at_next_year_header() {
        let map = parse_listing(LISTING).unwrap();
        // FY 2018 must not swallow FY 2017's anchors.
        assert!(!map.get("2018").unwrap().contains_key("2017"));
        assert_eq!(map.get("2018").unwrap().len(), 3);
    }

    #[test]
    fn test_parse_listing_ignores_non_year_labels() {
        let html = "<label>Search</label><a href='/x'>X</a>";
        let map = parse_listing(html).unwrap();
        assert!(map.is_empty());
    }

    #[test]
    fn test_year_from_header() {
        assert_eq!(year_from_header("FY 1234").unwrap(), "1234");
    }

    #[test]
    fn test_year_from_header_given_bad_input() {
        let err = year_from_header("Data for FY 2018").unwrap_err();
        assert!(matches!(err, ScrapeError::HeaderPattern { .. }));
    }
}

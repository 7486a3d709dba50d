//! Fetch & materialize: resolves resource labels for the configured year,
//! fetches them over HTTP, and materializes canonical datafiles.
//!
//! Each resource is skipped when its canonical targets already exist, so a
//! second run over a fully-populated year performs zero network requests.
//! Non-2xx responses are fatal and never retried; a partially-downloaded
//! year is left as-is and surfaced to the caller.

mod error;
mod models;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument};
use url::Url;

use crate::cache::OnDiskCache;
use crate::config::Config;
use crate::scrape::Scrape;

pub use error::DownloadError;
pub use models::{DatafileType, DownloadResource, classify_member};

/// Base URL that relative scraped hrefs are resolved against.
pub const BASE_URL: &str = "https://www.imls.gov";

/// Temporary directory archive members are extracted into before
/// reclassification.
const EXTRACTION_DIR: &str = "csvs_extracted";

/// Downloads and materializes one year's survey resources.
#[derive(Debug)]
pub struct DownloadService<S: Scrape> {
    config: Config,
    scraper: S,
    cache: Arc<OnDiskCache>,
    client: reqwest::Client,
    base_url: String,
}

impl<S: Scrape> DownloadService<S> {
    /// Creates a downloader writing through `cache`.
    #[must_use]
    pub fn new(config: Config, scraper: S, cache: Arc<OnDiskCache>) -> Self {
        Self {
            config,
            scraper,
            cache,
            client: reqwest::Client::new(),
            base_url: BASE_URL.to_string(),
        }
    }

    /// Overrides the base URL relative hrefs resolve against (test servers).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Fetches the year's Documentation PDF, CSV bundle, and
    /// data-element-definitions PDF, skipping anything already
    /// materialized.
    ///
    /// A year absent from the resource map is not an error: it is logged
    /// and the pipeline returns with no artifacts.
    #[instrument(skip(self), fields(year = self.config.year))]
    pub async fn download(&self) -> Result<(), DownloadError> {
        let resource_map = self.scraper.scrape().await?;

        let Some(for_year) = resource_map.get(&self.config.year.to_string()) else {
            info!("there is no data for {}", self.config.year);
            return Ok(());
        };

        for resource in [
            DownloadResource::Documentation,
            DownloadResource::CsvBundle,
            DownloadResource::DataElementDefinitions,
        ] {
            self.try_download_resource(for_year, resource).await?;
        }

        Ok(())
    }

    async fn try_download_resource(
        &self,
        for_year: &std::collections::BTreeMap<String, String>,
        resource: DownloadResource,
    ) -> Result<(), DownloadError> {
        if resource.targets().iter().all(|t| self.cache.exists(t)) {
            debug!(resource = resource.label(), "already materialized, skipping");
            return Ok(());
        }

        let Some(href) = for_year.get(resource.label()) else {
            info!(
                "the resource `{}` does not exist for {}",
                resource.label(),
                self.config.year
            );
            return Ok(());
        };

        let url = self.resolve_url(href)?;
        debug!(%url, "fetching resource");

        let response = self
            .client
            .get(url.clone())
            .send()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        let status = response.status();
        if !status.is_success() {
            return Err(DownloadError::http_status(url.as_str(), status.as_u16()));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| DownloadError::network(url.as_str(), e))?;

        self.cache.put_bytes(&body, resource.filename())?;
        info!(
            resource = resource.label(),
            bytes = body.len(),
            "materialized {}",
            resource.filename()
        );

        if resource == DownloadResource::CsvBundle {
            self.materialize_bundle()?;
        }

        Ok(())
    }

    /// Resolves a scraped href: absolute URLs are used as-is, everything
    /// else is joined onto the base URL.
    fn resolve_url(&self, href: &str) -> Result<Url, DownloadError> {
        if let Ok(url) = Url::parse(href) {
            return Ok(url);
        }
        let base =
            Url::parse(&self.base_url).map_err(|_| DownloadError::invalid_url(&self.base_url))?;
        base.join(href)
            .map_err(|_| DownloadError::invalid_url(href))
    }

    /// Unzips the fetched CSV bundle, renames each member to its canonical
    /// filename via substring classification, and deletes the extraction
    /// directory and the archive.
    fn materialize_bundle(&self) -> Result<(), DownloadError> {
        let archive_path = self.cache.full_path(DownloadResource::CsvBundle.filename());
        let extraction_root = self.cache.full_path(EXTRACTION_DIR);

        let archive_file =
            fs::File::open(&archive_path).map_err(|e| DownloadError::io(&archive_path, e))?;
        let mut archive = zip::ZipArchive::new(archive_file)
            .map_err(|e| DownloadError::archive(&archive_path, e))?;
        archive
            .extract(&extraction_root)
            .map_err(|e| DownloadError::archive(&archive_path, e))?;

        let mut members = Vec::new();
        collect_files(&extraction_root, &mut members)?;

        for member in members {
            let member_name = member
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();
            let canonical = classify_member(&member_name)
                .map_or(member_name.clone(), |kind| kind.filename().to_string());

            let target = self.cache.full_path(&canonical);
            fs::rename(&member, &target).map_err(|e| DownloadError::io(&member, e))?;
            debug!(member = member_name, target = canonical, "reclassified archive member");
        }

        self.cache.remove(EXTRACTION_DIR)?;
        self.cache.remove(DownloadResource::CsvBundle.filename())?;

        Ok(())
    }
}

/// Recursively collects regular files under `dir`.
fn collect_files(dir: &Path, out: &mut Vec<PathBuf>) -> Result<(), DownloadError> {
    let entries = fs::read_dir(dir).map_err(|e| DownloadError::io(dir, e))?;
    for entry in entries {
        let entry = entry.map_err(|e| DownloadError::io(dir, e))?;
        let path = entry.path();
        if path.is_dir() {
            collect_files(&path, out)?;
        } else {
            out.push(path);
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::io::Write;

    use async_trait::async_trait;
    use tempfile::TempDir;
    use zip::write::SimpleFileOptions;

    use super::*;
    use crate::scrape::{ResourceMap, ScrapeError};

    struct StaticScraper(ResourceMap);

    #[async_trait]
    impl Scrape for StaticScraper {
        async fn scrape(&self) -> Result<ResourceMap, ScrapeError> {
            Ok(self.0.clone())
        }
    }

    fn service(dir: &TempDir, map: ResourceMap) -> DownloadService<StaticScraper> {
        let config = Config::new(2017).with_data_dir(dir.path());
        let cache = Arc::new(OnDiskCache::new(dir.path(), &config, false).unwrap());
        DownloadService::new(config, StaticScraper(map), cache)
    }

    fn bundle_bytes(members: &[&str]) -> Vec<u8> {
        let mut cursor = std::io::Cursor::new(Vec::new());
        {
            let mut writer = zip::ZipWriter::new(&mut cursor);
            for member in members {
                writer
                    .start_file(*member, SimpleFileOptions::default())
                    .unwrap();
                writer.write_all(b"STABR,POPU_LSA\nAK,12\n").unwrap();
            }
            writer.finish().unwrap();
        }
        cursor.into_inner()
    }

    #[tokio::test]
    async fn test_download_given_year_not_in_resource_map_is_not_an_error() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, ResourceMap::new());

        service.download().await.unwrap();

        assert!(!service.cache.exists("Documentation.pdf"));
    }

    #[test]
    fn test_materialize_bundle_renames_members_and_cleans_up() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, ResourceMap::new());

        let bytes = bundle_bytes(&[
            "fy2017/pls_fy2017_ae_pud17i.csv",
            "fy2017/pls_fy2017_outlet_pud17i.csv",
            "fy2017/pls_fy2017_state_pud17i.csv",
        ]);
        service.cache.put_bytes(&bytes, "csvs.zip").unwrap();

        service.materialize_bundle().unwrap();

        assert!(service.cache.exists("SystemDataFile.csv"));
        assert!(service.cache.exists("OutletData.csv"));
        assert!(service.cache.exists("StateSummaryAndCharacteristicData.csv"));
        assert!(!service.cache.exists("csvs.zip"));
        assert!(!service.cache.exists(EXTRACTION_DIR));
    }

    #[test]
    fn test_materialize_bundle_keeps_unclassified_member_names() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, ResourceMap::new());

        let bytes = bundle_bytes(&["fy2017/readme.txt"]);
        service.cache.put_bytes(&bytes, "csvs.zip").unwrap();

        service.materialize_bundle().unwrap();

        assert!(service.cache.exists("readme.txt"));
    }

    #[test]
    fn test_resolve_url_joins_relative_hrefs() {
        let dir = TempDir::new().unwrap();
        let service = service(&dir, ResourceMap::new());

        let url = service.resolve_url("sites/default/files/csv.zip").unwrap();
        assert_eq!(url.as_str(), "https://www.imls.gov/sites/default/files/csv.zip");

        let url = service.resolve_url("/sites/default/files/csv.zip").unwrap();
        assert_eq!(url.as_str(), "https://www.imls.gov/sites/default/files/csv.zip");

        let url = service.resolve_url("http://127.0.0.1:9/abs.zip").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:9/abs.zip");
    }
}

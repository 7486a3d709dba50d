//! Run configuration passed explicitly through every service constructor.
//!
//! There is deliberately no process-wide configuration state; each service
//! receives a [`Config`] (cheap to clone) at construction time.

use std::path::PathBuf;

/// Default directory for materialized survey artifacts.
pub const DEFAULT_DATA_DIR: &str = "data";

/// Default directory for derived (extracted) artifacts.
pub const DEFAULT_CACHE_DIR: &str = "cache";

/// Configuration for one pipeline run against a single survey year.
///
/// A run exclusively owns its year-scoped directories; concurrent runs
/// against the same year must be serialized by the caller.
#[derive(Debug, Clone)]
pub struct Config {
    /// Fiscal year of the survey snapshot to acquire.
    pub year: u16,
    /// Root for downloaded artifacts (`<data_dir>/<year>/...`).
    pub data_dir: PathBuf,
    /// Root for derived artifacts such as extracted variable tables.
    pub cache_dir: PathBuf,
    /// Destroy and recreate the derived-artifact root at construction.
    pub overwrite_cache: bool,
    /// Re-scrape the listing page even when `urls.json` is cached.
    pub overwrite_cached_urls: bool,
    /// Rename dataset columns using the extracted variable taxonomy.
    pub rename_columns: bool,
}

impl Config {
    /// Creates a configuration for `year` with default directories and flags.
    #[must_use]
    pub fn new(year: u16) -> Self {
        Self {
            year,
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            cache_dir: PathBuf::from(DEFAULT_CACHE_DIR),
            overwrite_cache: false,
            overwrite_cached_urls: false,
            rename_columns: true,
        }
    }

    /// Sets the downloaded-artifact root.
    #[must_use]
    pub fn with_data_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.data_dir = dir.into();
        self
    }

    /// Sets the derived-artifact root.
    #[must_use]
    pub fn with_cache_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.cache_dir = dir.into();
        self
    }

    /// Destroys any pre-existing derived cache at construction time.
    #[must_use]
    pub fn overwrite_cache(mut self, overwrite: bool) -> Self {
        self.overwrite_cache = overwrite;
        self
    }

    /// Forces a fresh scrape of the listing page.
    #[must_use]
    pub fn overwrite_cached_urls(mut self, overwrite: bool) -> Self {
        self.overwrite_cached_urls = overwrite;
        self
    }

    /// Enables or disables column renaming in the query surface.
    #[must_use]
    pub fn rename_columns(mut self, rename: bool) -> Self {
        self.rename_columns = rename;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::new(2018);
        assert_eq!(config.year, 2018);
        assert_eq!(config.data_dir, PathBuf::from("data"));
        assert_eq!(config.cache_dir, PathBuf::from("cache"));
        assert!(!config.overwrite_cache);
        assert!(!config.overwrite_cached_urls);
        assert!(config.rename_columns);
    }

    #[test]
    fn test_config_builder_overrides() {
        let config = Config::new(2017)
            .with_data_dir("/tmp/pls-data")
            .with_cache_dir("/tmp/pls-cache")
            .overwrite_cache(true)
            .overwrite_cached_urls(true)
            .rename_columns(false);

        assert_eq!(config.data_dir, PathBuf::from("/tmp/pls-data"));
        assert_eq!(config.cache_dir, PathBuf::from("/tmp/pls-cache"));
        assert!(config.overwrite_cache);
        assert!(config.overwrite_cached_urls);
        assert!(!config.rename_columns);
    }
}

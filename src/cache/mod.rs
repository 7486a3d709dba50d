//! Typed key/value persistence keyed by resource path under a year-scoped
//! root.
//!
//! Every pipeline stage writes its output through the cache, which makes
//! each step idempotent and resumable. Content comes in three kinds:
//! opaque bytes, structured documents (JSON), and tabular data (CSV).
//! The deserialization strategy is selected by the typed accessor
//! (`get_text`, `get_json`, `get_table`), so requesting an unsupported
//! content kind is impossible by construction.

mod error;

use std::fs;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::Config;
use crate::table::DataTable;

pub use error::CacheError;

/// On-disk cache rooted at `<base>/<year>`.
///
/// Constructed with an overwrite flag: when set, a pre-existing root is
/// destroyed and recreated empty; otherwise the existing root and its
/// contents are reused across runs. A handful of resources (the scraped
/// resource map) are shared across years and live in the parent root.
#[derive(Debug)]
pub struct OnDiskCache {
    root: PathBuf,
    shared_root: PathBuf,
}

impl OnDiskCache {
    /// Creates a cache under `base/<config.year>`, destroying any existing
    /// root first when `overwrite` is set.
    pub fn new(base: &Path, config: &Config, overwrite: bool) -> Result<Self, CacheError> {
        let shared_root = base.to_path_buf();
        let root = shared_root.join(config.year.to_string());

        if overwrite && root.exists() {
            debug!(root = %root.display(), "overwriting existing cache root");
            fs::remove_dir_all(&root).map_err(|e| CacheError::io(&root, e))?;
        }
        fs::create_dir_all(&root).map_err(|e| CacheError::io(&root, e))?;

        Ok(Self { root, shared_root })
    }

    /// The year-scoped root directory.
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Resolves a resource path against the year-scoped root.
    #[must_use]
    pub fn full_path(&self, resource_path: &str) -> PathBuf {
        self.root.join(resource_path)
    }

    /// True when the resource exists on disk.
    #[must_use]
    pub fn exists(&self, resource_path: &str) -> bool {
        self.full_path(resource_path).exists()
    }

    /// Writes opaque bytes.
    pub fn put_bytes(&self, content: &[u8], resource_path: &str) -> Result<(), CacheError> {
        let path = self.full_path(resource_path);
        fs::write(&path, content).map_err(|e| CacheError::io(&path, e))
    }

    /// Writes a structured document as JSON.
    pub fn put_json(
        &self,
        content: &serde_json::Value,
        resource_path: &str,
    ) -> Result<(), CacheError> {
        write_json(&self.full_path(resource_path), content)
    }

    /// Writes a tabular resource as CSV.
    pub fn put_table(&self, content: &DataTable, resource_path: &str) -> Result<(), CacheError> {
        let path = self.full_path(resource_path);
        content
            .write_csv(&path)
            .map_err(|source| CacheError::MalformedTable { path, source })
    }

    /// Reads a resource as text; `Ok(None)` when not cached.
    pub fn get_text(&self, resource_path: &str) -> Result<Option<String>, CacheError> {
        let path = self.full_path(resource_path);
        if !path.exists() {
            return Ok(None);
        }
        fs::read_to_string(&path)
            .map(Some)
            .map_err(|e| CacheError::io(&path, e))
    }

    /// Reads a resource as a structured document; `Ok(None)` when not
    /// cached, fatal error when cached content is malformed.
    pub fn get_json(&self, resource_path: &str) -> Result<Option<serde_json::Value>, CacheError> {
        read_json(&self.full_path(resource_path))
    }

    /// Reads a resource as a table; `Ok(None)` when not cached.
    pub fn get_table(&self, resource_path: &str) -> Result<Option<DataTable>, CacheError> {
        let path = self.full_path(resource_path);
        if !path.exists() {
            return Ok(None);
        }
        DataTable::read_csv(&path)
            .map(Some)
            .map_err(|source| CacheError::MalformedTable { path, source })
    }

    /// Writes a structured document shared across years (parent root).
    pub fn put_json_shared(
        &self,
        content: &serde_json::Value,
        resource_path: &str,
    ) -> Result<(), CacheError> {
        write_json(&self.shared_root.join(resource_path), content)
    }

    /// Reads a shared structured document; `Ok(None)` when not cached.
    pub fn get_json_shared(
        &self,
        resource_path: &str,
    ) -> Result<Option<serde_json::Value>, CacheError> {
        read_json(&self.shared_root.join(resource_path))
    }

    /// Removes a file, or recursively removes a directory. Removing a
    /// missing path is a no-op.
    pub fn remove(&self, resource_path: &str) -> Result<(), CacheError> {
        let path = self.full_path(resource_path);
        if !path.exists() {
            return Ok(());
        }
        if path.is_dir() {
            fs::remove_dir_all(&path).map_err(|e| CacheError::io(&path, e))
        } else {
            fs::remove_file(&path).map_err(|e| CacheError::io(&path, e))
        }
    }

    /// Renames a resource within the year-scoped root.
    pub fn rename(&self, from: &str, to: &str) -> Result<(), CacheError> {
        let from_path = self.full_path(from);
        let to_path = self.full_path(to);
        fs::rename(&from_path, &to_path).map_err(|e| CacheError::io(&from_path, e))
    }
}

fn write_json(path: &Path, content: &serde_json::Value) -> Result<(), CacheError> {
    let serialized =
        serde_json::to_vec(content).map_err(|source| CacheError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })?;
    fs::write(path, serialized).map_err(|e| CacheError::io(path, e))
}

fn read_json(path: &Path) -> Result<Option<serde_json::Value>, CacheError> {
    if !path.exists() {
        return Ok(None);
    }
    let raw = fs::read(path).map_err(|e| CacheError::io(path, e))?;
    serde_json::from_slice(&raw)
        .map(Some)
        .map_err(|source| CacheError::MalformedDocument {
            path: path.to_path_buf(),
            source,
        })
}

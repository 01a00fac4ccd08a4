//! Persistent release cache
//!
//! One JSON file per project key, holding the last successfully resolved
//! release and the server's `Last-Modified` timestamp at the time it was
//! stored. The timestamp drives conditional requests; the release is what
//! gets served when GitHub reports nothing newer (or nothing at all).
//!
//! Per-key access is not locked: the embedding system guarantees that no two
//! operations touch the same project key concurrently.

use crate::release::DriverRelease;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// On-disk layout of one cache file
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CacheEntry {
    /// Server-reported modification time when the entry was stored
    pub last_modified: DateTime<Utc>,
    /// The resolved release
    pub release: DriverRelease,
}

/// File-backed cache of last resolved releases, keyed by project
#[derive(Debug, Clone)]
pub struct LastUpdateCache {
    root: PathBuf,
}

impl LastUpdateCache {
    /// Creates a cache rooted at `root`
    ///
    /// The directory is created lazily on the first store.
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    /// Cache root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Whether an entry exists for `key`
    pub fn exists(&self, key: &str) -> bool {
        self.entry_path(key).is_file()
    }

    /// Loads the cached release for `key`
    ///
    /// # Errors
    ///
    /// Returns error if no entry exists or the entry cannot be read
    pub fn load(&self, key: &str) -> Result<DriverRelease, CacheError> {
        Ok(self.read_entry(key)?.release)
    }

    /// Reads the stored modification time for `key`
    ///
    /// # Errors
    ///
    /// Returns error if no entry exists or the entry cannot be read
    pub fn last_modification_of(&self, key: &str) -> Result<DateTime<Utc>, CacheError> {
        Ok(self.read_entry(key)?.last_modified)
    }

    /// Stores a release under `key`, overwriting any previous entry
    ///
    /// # Arguments
    ///
    /// * `release` - The resolved release to persist
    /// * `key` - Project key (`organization@project`)
    /// * `last_modified` - Server-reported modification time of the release
    ///
    /// # Errors
    ///
    /// Returns error if the cache directory or entry file cannot be written
    pub fn store(
        &self,
        release: &DriverRelease,
        key: &str,
        last_modified: DateTime<Utc>,
    ) -> Result<(), CacheError> {
        fs::create_dir_all(&self.root).map_err(|source| CacheError::Io {
            operation: format!("create cache directory {}", self.root.display()),
            source,
        })?;

        let entry = CacheEntry {
            last_modified,
            release: release.clone(),
        };
        let json = serde_json::to_string_pretty(&entry)?;

        let path = self.entry_path(key);
        fs::write(&path, json).map_err(|source| CacheError::Io {
            operation: format!("write cache entry {}", path.display()),
            source,
        })?;

        Ok(())
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.root.join(format!("{key}.json"))
    }

    fn read_entry(&self, key: &str) -> Result<CacheEntry, CacheError> {
        let path = self.entry_path(key);
        if !path.is_file() {
            return Err(CacheError::MissingEntry {
                key: key.to_string(),
            });
        }

        let json = fs::read_to_string(&path).map_err(|source| CacheError::Io {
            operation: format!("read cache entry {}", path.display()),
            source,
        })?;
        Ok(serde_json::from_str(&json)?)
    }
}

/// Default per-user cache location (`{user cache dir}/drivermgr`)
///
/// # Errors
///
/// Returns error if the platform reports no user cache directory
pub fn default_cache_dir() -> Result<PathBuf, CacheError> {
    dirs::cache_dir()
        .map(|dir| dir.join("drivermgr"))
        .ok_or(CacheError::NoCacheDir)
}

/// Cache error types
#[derive(Debug, Error)]
pub enum CacheError {
    /// No entry stored under the key
    #[error("No cache entry for key {key:?}")]
    MissingEntry {
        /// The key that was looked up
        key: String,
    },

    /// File system failure
    #[error("I/O error: {operation}: {source}")]
    Io {
        /// What was being attempted
        operation: String,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Entry file holds something other than a cache entry
    #[error("Malformed cache entry: {0}")]
    Malformed(#[from] serde_json::Error),

    /// Platform reports no user cache directory
    #[error("No user cache directory available on this platform")]
    NoCacheDir,
}

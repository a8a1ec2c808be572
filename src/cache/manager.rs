//! Response cache for raw Bandcamp API bodies
//!
//! Provides a `ResponseCache` that stores the bytes of each response in a file
//! named by the MD5 hash of the request URL. Freshness is judged by the file's
//! modification time.

use chrono::{DateTime, Utc};
use directories::ProjectDirs;
use md5::{Digest, Md5};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

/// Result of reading from cache, including metadata about cache freshness
#[derive(Debug)]
pub struct CachedResponse {
    /// The raw response body
    pub body: Vec<u8>,
    /// When the cache file was last written
    pub modified_at: DateTime<Utc>,
    /// Whether the entry is older than the configured max age
    pub is_stale: bool,
}

/// Manages reading and writing cached responses to disk
///
/// Entries are plain files in an XDG-compliant cache directory
/// (`~/.cache/bandcamp/` on Linux). There is no locking: two processes
/// writing the same entry at once may interleave.
#[derive(Debug, Clone)]
pub struct ResponseCache {
    /// Directory where cache files are stored
    cache_dir: PathBuf,
    /// Age after which an entry is stale; zero means never
    max_age: Duration,
}

impl ResponseCache {
    /// Creates a ResponseCache using the XDG-compliant cache directory
    ///
    /// Falls back to `<tmp>/bandcamp/cache` if no home directory can be found.
    pub fn new(max_age: Duration) -> Self {
        let cache_dir = ProjectDirs::from("", "", "bandcamp")
            .map(|dirs| dirs.cache_dir().to_path_buf())
            .unwrap_or_else(|| std::env::temp_dir().join("bandcamp").join("cache"));
        Self { cache_dir, max_age }
    }

    /// Creates a ResponseCache with a custom cache directory
    pub fn with_dir(cache_dir: impl Into<PathBuf>, max_age: Duration) -> Self {
        Self {
            cache_dir: cache_dir.into(),
            max_age,
        }
    }

    /// Directory holding the cache files
    pub fn dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Configured max age
    pub fn max_age(&self) -> Duration {
        self.max_age
    }

    /// Returns the cache key for a request URL: the lowercase hex MD5 digest
    pub fn key_for(url: &str) -> String {
        let digest = Md5::digest(url.as_bytes());
        digest.iter().map(|b| format!("{:02x}", b)).collect()
    }

    /// Returns the path to the cache file for the given URL
    fn cache_path(&self, url: &str) -> PathBuf {
        self.cache_dir.join(Self::key_for(url))
    }

    /// Whether a file last modified at `modified` has outlived the max age
    fn is_stale(&self, modified: SystemTime) -> bool {
        if self.max_age.is_zero() {
            return false;
        }
        // A modification time in the future counts as age zero
        let age = SystemTime::now()
            .duration_since(modified)
            .unwrap_or(Duration::ZERO);
        age > self.max_age
    }

    /// Writes a response body for the given URL, replacing any previous entry
    pub fn write(&self, url: &str, body: &[u8]) -> io::Result<()> {
        fs::create_dir_all(&self.cache_dir)?;
        fs::write(self.cache_path(url), body)
    }

    /// Reads the cached response for a URL
    ///
    /// Returns `None` if no entry exists or it cannot be read. Stale entries are
    /// still returned with `is_stale = true`; the caller decides what to do.
    pub fn read(&self, url: &str) -> Option<CachedResponse> {
        let path = self.cache_path(url);
        let modified = fs::metadata(&path).and_then(|m| m.modified()).ok()?;
        let body = fs::read(&path).ok()?;

        Some(CachedResponse {
            body,
            modified_at: DateTime::<Utc>::from(modified),
            is_stale: self.is_stale(modified),
        })
    }

    /// Deletes obsolete cache files and returns how many were removed
    ///
    /// With `purge` every file is deleted. Otherwise files older than the max
    /// age are deleted, and nothing is when the max age is zero.
    pub fn cleanup(&self, purge: bool) -> io::Result<usize> {
        if !purge && self.max_age.is_zero() {
            return Ok(0);
        }

        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        for entry in entries {
            let entry = entry?;
            let metadata = entry.metadata()?;
            if !metadata.is_file() {
                continue;
            }

            if purge || self.is_stale(metadata.modified()?) {
                fs::remove_file(entry.path())?;
                removed += 1;
            }
        }

        Ok(removed)
    }
}

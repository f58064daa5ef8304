//! Parsed file content cache using moka
//!
//! Entries are keyed by canonical path and format, so the same file included
//! once as JSON and once as text is cached twice. Handles are cheap to clone
//! and share one underlying cache, which may be used from several threads.

use jsoncomp_document::{loader, Format, LoadError, Value};
use moka::sync::Cache;
use std::fmt::{self, Debug, Formatter};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Statistics for cache performance monitoring
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CacheStats {
    /// Number of entries in cache
    pub entry_count: u64,
    /// Lookups answered from the cache
    pub hits: u64,
    /// Lookups that read the file
    pub misses: u64,
}

/// Shared cache of parsed files
#[derive(Clone)]
pub struct FileCache {
    inner: Cache<(PathBuf, Format), Arc<Value>>,
    hits: Arc<AtomicU64>,
    misses: Arc<AtomicU64>,
}

impl FileCache {
    /// Create cache holding at most `max_capacity` files
    #[inline]
    #[must_use]
    pub fn new(max_capacity: u64) -> Self {
        Self {
            inner: Cache::new(max_capacity),
            hits: Arc::new(AtomicU64::new(0)),
            misses: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Get parsed content, reading the file on a miss
    ///
    /// Returns a fresh copy of the content and whether it came from the cache.
    ///
    /// # Errors
    /// Returns [`LoadError`] if the file cannot be read or parsed; failures are
    /// not cached
    pub fn get_or_load(&self, path: &Path, format: Format) -> Result<(Value, bool), LoadError> {
        let key = (canonical(path), format);
        if let Some(content) = self.inner.get(&key) {
            self.hits.fetch_add(1, Ordering::Relaxed);
            tracing::trace!(path = %key.0.display(), %format, "file cache hit");
            return Ok((Value::clone(&content), true));
        }

        let content = loader::read_file(&key.0, format)?;
        self.misses.fetch_add(1, Ordering::Relaxed);
        self.inner.insert(key, Arc::new(content.clone()));
        Ok((content, false))
    }

    /// Check if content of a file is cached in any format
    #[must_use]
    pub fn contains(&self, path: &Path) -> bool {
        let path = canonical(path);
        [Format::Json, Format::Yaml, Format::Text]
            .into_iter()
            .any(|format| self.inner.contains_key(&(path.clone(), format)))
    }

    /// Invalidate a file in every format
    pub fn invalidate(&self, path: &Path) {
        let path = canonical(path);
        for format in [Format::Json, Format::Yaml, Format::Text] {
            self.inner.invalidate(&(path.clone(), format));
        }
    }

    /// Invalidate all entries
    #[inline]
    pub fn invalidate_all(&self) {
        self.inner.invalidate_all();
    }

    /// Get cache statistics
    #[must_use]
    pub fn stats(&self) -> CacheStats {
        self.inner.run_pending_tasks();
        CacheStats {
            entry_count: self.inner.entry_count(),
            hits: self.hits.load(Ordering::Relaxed),
            misses: self.misses.load(Ordering::Relaxed),
        }
    }
}

impl Default for FileCache {
    fn default() -> Self {
        Self::new(1024)
    }
}

impl Debug for FileCache {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileCache")
            .field("stats", &self.stats())
            .finish()
    }
}

fn canonical(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

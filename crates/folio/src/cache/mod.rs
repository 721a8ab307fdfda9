//! Plaintext cache.
//!
//! A cache maps a caller-chosen key to the full concatenated text of a
//! previously extracted document. The extractor only needs the narrow
//! [`PlaintextStore`] contract: `load` fails with [`FolioError::CacheMiss`] when
//! the key is absent, and `save` stores raw bytes.
//!
//! Two stores ship with the crate:
//! - [`FsPlaintextStore`] keeps one `<key>.txt` file per entry, written through a
//!   temp file and a rename so a concurrent reader never sees a torn entry.
//! - [`MemoryPlaintextStore`] keeps entries in a concurrent map for tests and
//!   short-lived processes.

use crate::core::io::write_file_atomic;
use crate::error::{FolioError, Result};
use ahash::AHasher;
use dashmap::DashMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::hash::{Hash, Hasher};
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// Cache key hash format width (32 hex digits for u64 hash)
const CACHE_KEY_HASH_WIDTH: usize = 32;

const ENTRY_EXTENSION: &str = "txt";

/// Key/value store holding previously extracted plaintext.
pub trait PlaintextStore: Send + Sync {
    /// Raw bytes stored under `key`.
    ///
    /// # Errors
    ///
    /// `FolioError::CacheMiss` when nothing is stored under `key`. Any other
    /// error means the store itself is unusable and is propagated by callers.
    fn load(&self, key: &str) -> Result<Vec<u8>>;

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()>;
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CacheStats {
    pub total_files: usize,
    pub total_size_mb: f64,
    pub oldest_file_age_days: f64,
    pub newest_file_age_days: f64,
}

/// Filesystem-backed plaintext store.
pub struct FsPlaintextStore {
    cache_dir: PathBuf,
    max_age_days: Option<f64>,
}

impl FsPlaintextStore {
    pub fn new(cache_dir: impl Into<PathBuf>, max_age_days: Option<f64>) -> Result<Self> {
        let cache_dir = cache_dir.into();
        fs::create_dir_all(&cache_dir)
            .map_err(|e| FolioError::cache_with_source(format!("Failed to create cache directory {}", cache_dir.display()), e))?;

        Ok(Self {
            cache_dir,
            max_age_days,
        })
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    fn entry_path(&self, key: &str) -> Result<PathBuf> {
        if !is_safe_key(key) {
            return Err(FolioError::validation(format!("Invalid cache key '{}'", key)));
        }
        Ok(self.cache_dir.join(format!("{}.{}", key, ENTRY_EXTENSION)))
    }

    fn is_stale(&self, path: &Path) -> bool {
        let Some(max_age_days) = self.max_age_days else {
            return false;
        };
        match age_days(path) {
            Some(age) => age > max_age_days,
            None => false,
        }
    }

    fn entries(&self) -> Result<impl Iterator<Item = (PathBuf, fs::Metadata)>> {
        let read_dir = fs::read_dir(&self.cache_dir)
            .map_err(|e| FolioError::cache_with_source("Failed to read cache directory", e))?;

        Ok(read_dir.flatten().filter_map(|entry| {
            let path = entry.path();
            if path.extension().and_then(|s| s.to_str()) != Some(ENTRY_EXTENSION) {
                return None;
            }
            match entry.metadata() {
                Ok(metadata) if metadata.is_file() => Some((path, metadata)),
                _ => None,
            }
        }))
    }

    /// Remove every entry, returning how many files and megabytes were freed.
    pub fn clear(&self) -> Result<(usize, f64)> {
        if !self.cache_dir.exists() {
            return Ok((0, 0.0));
        }

        let mut removed_count = 0;
        let mut removed_size = 0.0;

        for (path, metadata) in self.entries()? {
            match fs::remove_file(&path) {
                Ok(()) => {
                    removed_count += 1;
                    removed_size += metadata.len() as f64 / (1024.0 * 1024.0);
                }
                Err(e) => tracing::debug!("Failed to remove {:?}: {}", path, e),
            }
        }

        Ok((removed_count, removed_size))
    }

    pub fn get_stats(&self) -> Result<CacheStats> {
        if !self.cache_dir.exists() {
            return Ok(CacheStats::default());
        }

        let mut stats = CacheStats::default();
        let mut oldest: Option<f64> = None;
        let mut newest: Option<f64> = None;
        let mut total_bytes = 0u64;

        for (path, metadata) in self.entries()? {
            stats.total_files += 1;
            total_bytes += metadata.len();
            if let Some(age) = age_days(&path) {
                oldest = Some(oldest.map_or(age, |o| o.max(age)));
                newest = Some(newest.map_or(age, |n| n.min(age)));
            }
        }

        stats.total_size_mb = total_bytes as f64 / (1024.0 * 1024.0);
        stats.oldest_file_age_days = oldest.unwrap_or(0.0);
        stats.newest_file_age_days = newest.unwrap_or(0.0);
        Ok(stats)
    }
}

impl PlaintextStore for FsPlaintextStore {
    fn load(&self, key: &str) -> Result<Vec<u8>> {
        let path = self.entry_path(key)?;

        if self.is_stale(&path) {
            tracing::debug!(key, "Cache entry expired");
            return Err(FolioError::cache_miss(key));
        }

        match fs::read(&path) {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Err(FolioError::cache_miss(key)),
            Err(e) => Err(FolioError::Io(e)),
        }
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        let path = self.entry_path(key)?;
        write_file_atomic(&path, bytes)
            .map_err(|e| FolioError::cache_with_source(format!("Failed to write cache entry '{}'", key), e))
    }
}

/// In-memory plaintext store.
#[derive(Default)]
pub struct MemoryPlaintextStore {
    entries: DashMap<String, Vec<u8>>,
}

impl MemoryPlaintextStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl PlaintextStore for MemoryPlaintextStore {
    fn load(&self, key: &str) -> Result<Vec<u8>> {
        self.entries
            .get(key)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| FolioError::cache_miss(key))
    }

    fn save(&self, key: &str, bytes: &[u8]) -> Result<()> {
        self.entries.insert(key.to_string(), bytes.to_vec());
        Ok(())
    }
}

fn age_days(path: &Path) -> Option<f64> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    let elapsed = SystemTime::now().duration_since(modified).ok()?;
    Some(elapsed.as_secs_f64() / (24.0 * 3600.0))
}

/// Keys become file names, so they may not contain path separators or be a
/// relative path component.
fn is_safe_key(key: &str) -> bool {
    !key.is_empty()
        && key != "."
        && key != ".."
        && !key.contains(['/', '\\', '\0'])
}

/// Generate a deterministic cache key from key/value parts.
///
/// Parts are sorted by key, joined as `k1=v1&k2=v2` and hashed with ahash.
///
/// ```rust
/// use folio::cache::generate_cache_key;
///
/// let key = generate_cache_key(&[("source", "report.pdf"), ("strategy", "standard")]);
/// assert_eq!(key.len(), 32);
/// ```
pub fn generate_cache_key(parts: &[(&str, &str)]) -> String {
    if parts.is_empty() {
        return "empty".to_string();
    }

    let mut sorted_parts: Vec<_> = parts.to_vec();
    sorted_parts.sort_by_key(|(k, _)| *k);

    let mut cache_str = String::new();
    for (i, (key, val)) in sorted_parts.iter().enumerate() {
        if i > 0 {
            cache_str.push('&');
        }
        cache_str.push_str(key);
        cache_str.push('=');
        cache_str.push_str(val);
    }

    let mut hasher = AHasher::default();
    cache_str.hash(&mut hasher);
    format!("{:0width$x}", hasher.finish(), width = CACHE_KEY_HASH_WIDTH)
}

pub fn fast_hash(data: &[u8]) -> u64 {
    let mut hasher = AHasher::default();
    data.hash(&mut hasher);
    hasher.finish()
}

/// Content-derived cache key for raw document bytes.
pub fn cache_key_for_bytes(bytes: &[u8]) -> String {
    format!("{:0width$x}", fast_hash(bytes), width = CACHE_KEY_HASH_WIDTH)
}

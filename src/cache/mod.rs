// Cache store
// Durable name -> record persistence for built pipeline components.
// Every storage fault is absorbed here and downgraded to a miss or a
// negative result, so callers have exactly one failure path: rebuild.


use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

use crate::fingerprint::Fingerprint;

const CACHE_EXTENSION: &str = "json";

/// On-disk record wrapping a cached payload with its validity metadata.
/// Written whole and replaced whole; a record missing any field is
/// treated as corrupt.
#[derive(Debug, Serialize, Deserialize)]
struct CacheRecord {
    payload: serde_json::Value,
    content_hash: Option<String>,
    cache_version: String,
    created_at: String,
    cache_name: String,
}

/// Metadata about a stored cache entry, without its payload.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheMetadata {
    pub cache_name: String,
    pub file_path: PathBuf,
    pub file_size: u64,
    pub modified_time: Option<String>,
    pub cache_version: String,
    pub created_at: String,
    pub content_hash: Option<String>,
}

/// File-backed cache keyed by name, with version and content-hash
/// validation on load.
#[derive(Debug, Clone)]
pub struct CacheStore {
    cache_dir: PathBuf,
    cache_version: String,
}

impl CacheStore {
    /// Open a cache store rooted at `cache_dir`, creating the directory
    /// if it does not exist yet.
    #[inline]
    pub fn new<P: AsRef<Path>>(cache_dir: P, cache_version: &str) -> std::io::Result<Self> {
        let cache_dir = cache_dir.as_ref().to_path_buf();
        if !cache_dir.exists() {
            fs::create_dir_all(&cache_dir)?;
            info!("Created cache directory: {}", cache_dir.display());
        }
        Ok(Self {
            cache_dir,
            cache_version: cache_version.to_string(),
        })
    }

    #[inline]
    pub fn cache_version(&self) -> &str {
        &self.cache_version
    }

    fn cache_path(&self, cache_name: &str) -> PathBuf {
        self.cache_dir
            .join(format!("{cache_name}.{CACHE_EXTENSION}"))
    }

    /// Persist `payload` under `cache_name`, replacing any existing entry.
    ///
    /// The record is serialized in full and moved into place with a
    /// rename, so a concurrent reader sees either the previous record or
    /// the new one, never a torn write. Returns `false` on any failure.
    #[inline]
    pub fn save<T: Serialize>(
        &self,
        cache_name: &str,
        payload: &T,
        content_hash: Option<&Fingerprint>,
    ) -> bool {
        let payload = match serde_json::to_value(payload) {
            Ok(value) => value,
            Err(e) => {
                warn!("Failed to serialize payload for cache {cache_name}: {e}");
                return false;
            }
        };

        let record = CacheRecord {
            payload,
            content_hash: content_hash.map(|h| h.as_str().to_string()),
            cache_version: self.cache_version.clone(),
            created_at: Utc::now().to_rfc3339(),
            cache_name: cache_name.to_string(),
        };

        match self.write_record(cache_name, &record) {
            Ok(path) => {
                info!("Cache saved: {}", path.display());
                true
            }
            Err(e) => {
                warn!("Error saving cache {cache_name}: {e}");
                false
            }
        }
    }

    fn write_record(&self, cache_name: &str, record: &CacheRecord) -> std::io::Result<PathBuf> {
        let content = serde_json::to_string(record)?;
        let final_path = self.cache_path(cache_name);
        let temp_path = final_path.with_extension(format!("{CACHE_EXTENSION}.tmp"));

        fs::write(&temp_path, content)?;
        fs::rename(&temp_path, &final_path)?;

        Ok(final_path)
    }

    /// Load the payload stored under `cache_name`.
    ///
    /// Returns `None` if the entry is absent, unreadable, structurally
    /// malformed, from a different cache version, or carries a content
    /// hash different from `expected_hash`. None of these conditions is
    /// an error to the caller; they all mean "rebuild".
    #[inline]
    pub fn load<T: DeserializeOwned>(
        &self,
        cache_name: &str,
        expected_hash: Option<&Fingerprint>,
    ) -> Option<T> {
        let record = self.read_record(cache_name)?;

        if record.cache_version != self.cache_version {
            info!(
                "Cache version mismatch for {cache_name}: stored {}, expected {}",
                record.cache_version, self.cache_version
            );
            return None;
        }

        if let Some(expected) = expected_hash {
            if record.content_hash.as_deref() != Some(expected.as_str()) {
                info!("Content hash mismatch for {cache_name}");
                return None;
            }
        }

        match serde_json::from_value(record.payload) {
            Ok(payload) => {
                info!("Cache loaded successfully: {cache_name}");
                Some(payload)
            }
            Err(e) => {
                warn!("Cached payload for {cache_name} has unexpected shape: {e}");
                None
            }
        }
    }

    fn read_record(&self, cache_name: &str) -> Option<CacheRecord> {
        let path = self.cache_path(cache_name);

        if !path.exists() {
            debug!("Cache file not found: {}", path.display());
            return None;
        }

        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(e) => {
                warn!("Error reading cache {cache_name}: {e}");
                return None;
            }
        };

        match serde_json::from_str(&content) {
            Ok(record) => Some(record),
            Err(e) => {
                warn!("Invalid cache structure for {cache_name}: {e}");
                None
            }
        }
    }

    #[inline]
    pub fn exists(&self, cache_name: &str) -> bool {
        self.cache_path(cache_name).exists()
    }

    /// Delete the entry named `cache_name`. Idempotent: deleting an
    /// absent entry is a success.
    #[inline]
    pub fn delete(&self, cache_name: &str) -> bool {
        let path = self.cache_path(cache_name);

        if !path.exists() {
            debug!("Cache file not found: {}", path.display());
            return true;
        }

        match fs::remove_file(&path) {
            Ok(()) => {
                info!("Cache deleted: {}", path.display());
                true
            }
            Err(e) => {
                warn!("Error deleting cache {cache_name}: {e}");
                false
            }
        }
    }

    /// Remove every entry in this store's directory. Returns the number
    /// of entries removed.
    #[inline]
    pub fn clear_all(&self) -> usize {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error clearing cache directory: {e}");
                return 0;
            }
        };

        let mut cleared = 0;
        for path in entries.filter_map(std::result::Result::ok).map(|e| e.path()) {
            if path.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION) {
                match fs::remove_file(&path) {
                    Ok(()) => cleared += 1,
                    Err(e) => warn!("Error removing {}: {e}", path.display()),
                }
            }
        }

        info!("Cleared {cleared} cache files");
        cleared
    }

    /// Metadata for one entry without exposing its payload.
    #[inline]
    pub fn describe(&self, cache_name: &str) -> Option<CacheMetadata> {
        let path = self.cache_path(cache_name);
        if !path.exists() {
            return None;
        }

        let stats = match fs::metadata(&path) {
            Ok(stats) => stats,
            Err(e) => {
                warn!("Error getting cache info for {cache_name}: {e}");
                return None;
            }
        };

        let modified_time = stats
            .modified()
            .ok()
            .map(|t| DateTime::<Utc>::from(t).to_rfc3339());

        let record = self.read_record(cache_name)?;

        Some(CacheMetadata {
            cache_name: cache_name.to_string(),
            file_path: path,
            file_size: stats.len(),
            modified_time,
            cache_version: record.cache_version,
            created_at: record.created_at,
            content_hash: record.content_hash,
        })
    }

    /// Metadata for every entry in the store.
    #[inline]
    pub fn list_all(&self) -> Vec<CacheMetadata> {
        let entries = match fs::read_dir(&self.cache_dir) {
            Ok(entries) => entries,
            Err(e) => {
                warn!("Error listing cache directory: {e}");
                return Vec::new();
            }
        };

        let mut names: Vec<String> = entries
            .filter_map(std::result::Result::ok)
            .map(|e| e.path())
            .filter(|p| p.extension().and_then(|e| e.to_str()) == Some(CACHE_EXTENSION))
            .filter_map(|p| p.file_stem().and_then(|s| s.to_str()).map(String::from))
            .collect();
        names.sort();

        names
            .iter()
            .filter_map(|name| self.describe(name))
            .collect()
    }
}

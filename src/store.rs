//! Advisory transaction-count cache
//!
//! A single JSON file holding the last known transaction count. The cache is
//! a hint only: a missing or unreadable file means "no hint", and persisting
//! a new value never fails a refresh.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Serialize, Deserialize)]
struct CachedCount {
    transaction_count: u64,
}

#[derive(Debug, Clone)]
pub struct CountCache {
    path: PathBuf,
}

impl CountCache {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last persisted count, if any
    pub fn load(&self) -> Option<u64> {
        let raw = std::fs::read_to_string(&self.path).ok()?;
        serde_json::from_str::<CachedCount>(&raw)
            .ok()
            .map(|c| c.transaction_count)
    }

    pub fn store(&self, count: u64) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent).map_err(|e| {
                    Error::Config(format!("cannot create {}: {}", parent.display(), e))
                })?;
            }
        }
        let raw = serde_json::to_string(&CachedCount {
            transaction_count: count,
        })
        .map_err(|e| Error::Config(format!("cannot encode count cache: {}", e)))?;
        std::fs::write(&self.path, raw)
            .map_err(|e| Error::Config(format!("cannot write {}: {}", self.path.display(), e)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_store_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CountCache::new(dir.path().join("count.json"));

        assert_eq!(cache.load(), None);
        cache.store(7).unwrap();
        assert_eq!(cache.load(), Some(7));
        cache.store(8).unwrap();
        assert_eq!(cache.load(), Some(8));
    }

    #[test]
    fn test_corrupt_file_is_no_hint() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("count.json");
        std::fs::write(&path, "not json").unwrap();

        let cache = CountCache::new(&path);
        assert_eq!(cache.load(), None);
    }

    #[test]
    fn test_store_creates_parent_dirs() {
        let dir = tempfile::tempdir().unwrap();
        let cache = CountCache::new(dir.path().join("nested/dir/count.json"));
        cache.store(1).unwrap();
        assert_eq!(cache.load(), Some(1));
    }
}

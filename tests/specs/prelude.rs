//! Shared fixtures for specs

#![allow(dead_code)]

pub use cachet_adapters::{FakeBackend, FileBackend, StorageBackend};
pub use cachet_core::{AdvisoryLock, LockError, LockMode, PersistenceParams, RetryPolicy};
pub use cachet_engine::{AccessError, AccessIntent, CacheAccess};
pub use std::time::Duration;

use std::path::PathBuf;
use tempfile::TempDir;

/// A directory holding one cache blob and its lock file
pub struct Workspace {
    dir: TempDir,
}

impl Workspace {
    pub fn new() -> Self {
        Self {
            dir: TempDir::new().unwrap(),
        }
    }

    pub fn cache_path(&self) -> PathBuf {
        self.dir.path().join("cache.bin")
    }

    pub fn lock_path(&self) -> PathBuf {
        self.dir.path().join("cache.lock")
    }

    pub fn params(&self, retry: RetryPolicy) -> PersistenceParams {
        PersistenceParams::builder(self.cache_path(), self.lock_path())
            .retry(retry)
            .build()
            .unwrap()
    }

    pub fn lock(&self, retry: RetryPolicy) -> AdvisoryLock {
        self.params(retry).lock()
    }

    /// Fresh access instance over the plain file backend, as a separate
    /// process would open it
    pub fn file_access(&self, retry: RetryPolicy) -> CacheAccess<FileBackend> {
        CacheAccess::with_params(FileBackend::new(self.cache_path()), &self.params(retry))
    }

    pub fn fake_access(&self, fake: &FakeBackend, retry: RetryPolicy) -> CacheAccess<FakeBackend> {
        CacheAccess::with_params(fake.clone(), &self.params(retry))
    }

    pub fn read_cache(&self) -> String {
        std::fs::read_to_string(self.cache_path()).unwrap_or_default()
    }
}

pub fn retry(delay_ms: u64, attempts: u32) -> RetryPolicy {
    RetryPolicy::new(Duration::from_millis(delay_ms), attempts)
}

/// Check that `content` is a sequence of `<id` / `>id` pairs, each closed
/// before the next opens. Returns the ids in order.
pub fn validate_markers(content: &str) -> Result<Vec<String>, String> {
    let lines: Vec<&str> = content.lines().collect();
    if lines.len() % 2 != 0 {
        return Err(format!("odd number of marker lines: {}", lines.len()));
    }

    lines
        .chunks(2)
        .enumerate()
        .map(|(i, pair)| match (pair[0].strip_prefix('<'), pair[1].strip_prefix('>')) {
            (Some(open), Some(close)) if open == close => Ok(open.to_string()),
            _ => Err(format!("pair {i} is interleaved: {:?} then {:?}", pair[0], pair[1])),
        })
        .collect()
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Lock-protected access to the shared cache blob
//!
//! A caller brackets every use of its in-memory cache with
//! [`CacheAccess::before_access`] and [`AccessWindow::after_access`]:
//!
//! - **Read**: if the backend's modification time still matches the
//!   freshness marker, nothing happens. Otherwise the blob is read under a
//!   shared lock, loaded, and the lock is released before returning.
//! - **Write**: an exclusive lock is taken, the current blob is loaded, and
//!   the lock stays held by the returned window until `after_access` saves
//!   the cache (or the window is dropped, which saves nothing).

use crate::codec::SerializableCache;
use crate::error::AccessError;
use crate::freshness::FreshnessMarker;
use cachet_adapters::StorageBackend;
use cachet_core::{AdvisoryLock, LockGuard, PersistenceParams};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

/// What the caller is about to do with its cache
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AccessIntent {
    Read,
    Write,
}

impl fmt::Display for AccessIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AccessIntent::Read => write!(f, "read"),
            AccessIntent::Write => write!(f, "write"),
        }
    }
}

/// Snapshot of per-instance counters
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AccessStats {
    pub lock_acquisitions: u64,
    pub backend_reads: u64,
    pub backend_writes: u64,
    pub skipped_reads: u64,
}

#[derive(Default)]
struct Counters {
    lock_acquisitions: AtomicU64,
    backend_reads: AtomicU64,
    backend_writes: AtomicU64,
    skipped_reads: AtomicU64,
}

impl Counters {
    fn bump(counter: &AtomicU64) {
        counter.fetch_add(1, Ordering::Relaxed);
    }

    fn snapshot(&self) -> AccessStats {
        AccessStats {
            lock_acquisitions: self.lock_acquisitions.load(Ordering::Relaxed),
            backend_reads: self.backend_reads.load(Ordering::Relaxed),
            backend_writes: self.backend_writes.load(Ordering::Relaxed),
            skipped_reads: self.skipped_reads.load(Ordering::Relaxed),
        }
    }
}

/// Orchestrates locking and I/O for one shared cache
pub struct CacheAccess<B> {
    backend: B,
    lock: AdvisoryLock,
    marker: Mutex<FreshnessMarker>,
    counters: Counters,
}

impl<B: StorageBackend> CacheAccess<B> {
    pub fn new(backend: B, lock: AdvisoryLock) -> Self {
        Self {
            backend,
            lock,
            marker: Mutex::new(FreshnessMarker::new()),
            counters: Counters::default(),
        }
    }

    /// Access guarded by the lock file and retry policy in `params`
    pub fn with_params(backend: B, params: &PersistenceParams) -> Self {
        Self::new(backend, params.lock())
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn lock(&self) -> &AdvisoryLock {
        &self.lock
    }

    pub fn stats(&self) -> AccessStats {
        self.counters.snapshot()
    }

    pub fn marker(&self) -> FreshnessMarker {
        *self.marker.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Prepare `cache` for a read or a read-modify-write.
    ///
    /// For [`AccessIntent::Write`] the returned window holds the exclusive
    /// lock until [`AccessWindow::after_access`] or drop.
    pub fn before_access<C: SerializableCache>(
        &self,
        intent: AccessIntent,
        cache: &mut C,
    ) -> Result<AccessWindow<'_, B>, AccessError> {
        match intent {
            AccessIntent::Read => {
                let loaded = self.load_shared(cache)?;
                Ok(AccessWindow {
                    access: self,
                    intent,
                    guard: None,
                    loaded,
                })
            }
            AccessIntent::Write => {
                let guard = self.lock.acquire_exclusive()?;
                Counters::bump(&self.counters.lock_acquisitions);
                let loaded = self.load(cache)?;
                Ok(AccessWindow {
                    access: self,
                    intent,
                    guard: Some(guard),
                    loaded,
                })
            }
        }
    }

    /// Bring `cache` up to date if the blob changed. Returns whether
    /// anything was loaded.
    pub fn refresh<C: SerializableCache>(&self, cache: &mut C) -> Result<bool, AccessError> {
        let window = self.before_access(AccessIntent::Read, cache)?;
        let loaded = window.loaded();
        window.after_access(cache)?;
        Ok(loaded)
    }

    /// Run `f` on `cache` inside a write window and save the result
    pub fn update<C, F, R>(&self, cache: &mut C, f: F) -> Result<R, AccessError>
    where
        C: SerializableCache,
        F: FnOnce(&mut C) -> R,
    {
        let window = self.before_access(AccessIntent::Write, cache)?;
        let result = f(cache);
        window.after_access(cache)?;
        Ok(result)
    }

    /// Delete the persisted blob
    pub fn clear(&self) -> Result<(), AccessError> {
        let guard = self.lock.acquire_exclusive()?;
        Counters::bump(&self.counters.lock_acquisitions);
        self.backend.delete()?;
        self.set_marker(|m| m.reset());
        tracing::info!(kind = %self.backend.kind(), "cache cleared");
        guard.release()?;
        Ok(())
    }

    fn load_shared<C: SerializableCache>(&self, cache: &mut C) -> Result<bool, AccessError> {
        let observed = self.backend.last_modified()?;
        if self.marker().is_current(observed) {
            Counters::bump(&self.counters.skipped_reads);
            tracing::debug!(?observed, "cache unchanged, skipping read");
            return Ok(false);
        }

        tracing::debug!(
            ?observed,
            last_seen = ?self.marker().last_seen(),
            "cache changed, reading"
        );
        let guard = self.lock.acquire_shared()?;
        Counters::bump(&self.counters.lock_acquisitions);
        let loaded = self.load(cache)?;
        guard.release()?;
        Ok(loaded)
    }

    /// Read the blob into `cache` and record its timestamp. Callers hold a lock.
    fn load<C: SerializableCache>(&self, cache: &mut C) -> Result<bool, AccessError> {
        let modified = self.backend.last_modified()?;
        let blob = self.backend.read()?;
        Counters::bump(&self.counters.backend_reads);

        let loaded = match blob {
            Some(data) if !data.is_empty() => {
                cache.deserialize(&data)?;
                true
            }
            _ => false,
        };
        self.set_marker(|m| m.record(modified));
        Ok(loaded)
    }

    fn save<C: SerializableCache>(&self, cache: &C) -> Result<(), AccessError> {
        let data = cache.serialize()?;
        self.backend.write(&data)?;
        Counters::bump(&self.counters.backend_writes);
        let modified = self.backend.last_modified()?;
        self.set_marker(|m| m.record(modified));
        Ok(())
    }

    fn set_marker(&self, f: impl FnOnce(&mut FreshnessMarker)) {
        let mut marker = self.marker.lock().unwrap_or_else(|e| e.into_inner());
        f(&mut *marker);
    }
}

/// The span between `before_access` and `after_access`.
///
/// A write window owns the exclusive lock. Dropping it without calling
/// [`after_access`](Self::after_access) releases the lock and persists
/// nothing.
#[must_use = "a write window saves nothing unless after_access is called"]
pub struct AccessWindow<'a, B: StorageBackend> {
    access: &'a CacheAccess<B>,
    intent: AccessIntent,
    guard: Option<LockGuard>,
    loaded: bool,
}

impl<B: StorageBackend> AccessWindow<'_, B> {
    pub fn intent(&self) -> AccessIntent {
        self.intent
    }

    /// Whether `before_access` replaced the cache contents
    pub fn loaded(&self) -> bool {
        self.loaded
    }

    /// Whether this window currently holds a lock
    pub fn is_locked(&self) -> bool {
        self.guard.is_some()
    }

    /// Persist `cache` (write intent) and release the lock
    pub fn after_access<C: SerializableCache>(mut self, cache: &C) -> Result<(), AccessError> {
        let Some(guard) = self.guard.take() else {
            return Ok(());
        };
        self.access.save(cache)?;
        guard.release()?;
        Ok(())
    }
}

impl<B: StorageBackend> Drop for AccessWindow<'_, B> {
    fn drop(&mut self) {
        if self.guard.is_some() {
            tracing::debug!(intent = %self.intent, "window closed without saving");
        }
    }
}

impl<B: StorageBackend> fmt::Debug for AccessWindow<'_, B> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AccessWindow")
            .field("intent", &self.intent)
            .field("locked", &self.guard.is_some())
            .field("loaded", &self.loaded)
            .finish()
    }
}

#[cfg(test)]
#[path = "access_tests.rs"]
mod tests;

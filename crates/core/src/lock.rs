// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cross-process advisory file lock
//!
//! An [`AdvisoryLock`] names a lock file and a [`RetryPolicy`]. Each call to
//! [`AdvisoryLock::acquire`] opens the file, takes an OS-level advisory lock
//! over the whole file in the requested [`LockMode`], and returns a
//! [`LockGuard`] that releases it when consumed by [`LockGuard::release`] or
//! dropped.
//!
//! Lifecycle of one acquisition:
//!
//! ```text
//! Unlocked -> Acquiring -> Locked(mode) -> Released
//!                 |  ^
//!                 +--+  (attempt failed, attempts remain)
//!                 |
//!                 +-> Failed (attempts exhausted)
//! ```
//!
//! # Platform semantics
//!
//! Arbitration happens per open file handle, not per `AdvisoryLock` value.
//! On Unix (`flock(2)`) and Windows (`LockFileEx`) two guards opened
//! independently inside one process exclude each other just like guards in
//! different processes. Some filesystems (NFS emulating `flock` with `fcntl`
//! record locks) arbitrate per process instead, so code that needs
//! intra-process exclusion must not depend on it: serialize access within a
//! process before reaching for the lock file.
//!
//! The lock file is never deleted. Its content is the identity of the most
//! recent exclusive holder, for debugging only.

use crate::identity::HolderIdentity;
use fs2::FileExt;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};
use thiserror::Error;

/// Lock mode requested from the OS
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LockMode {
    /// Any number of shared holders, no exclusive holder
    Shared,
    /// Exactly one holder
    Exclusive,
}

impl fmt::Display for LockMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LockMode::Shared => write!(f, "shared"),
            LockMode::Exclusive => write!(f, "exclusive"),
        }
    }
}

/// How long and how often to retry a contended lock
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    /// Pause between failed attempts
    #[serde(with = "humantime_serde")]
    delay: Duration,
    /// Total attempts, including the first
    max_attempts: u32,
}

impl RetryPolicy {
    pub const DEFAULT_DELAY: Duration = Duration::from_millis(100);
    pub const DEFAULT_MAX_ATTEMPTS: u32 = 600;

    /// A zero attempt count is treated as one.
    pub fn new(delay: Duration, max_attempts: u32) -> Self {
        Self {
            delay,
            max_attempts: max_attempts.max(1),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn with_max_attempts(mut self, max_attempts: u32) -> Self {
        self.max_attempts = max_attempts.max(1);
        self
    }

    pub fn delay(&self) -> Duration {
        self.delay
    }

    pub fn max_attempts(&self) -> u32 {
        self.max_attempts.max(1)
    }

    /// Longest time spent sleeping before giving up
    pub fn budget(&self) -> Duration {
        self.delay
            .checked_mul(self.max_attempts() - 1)
            .unwrap_or(Duration::MAX)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(Self::DEFAULT_DELAY, Self::DEFAULT_MAX_ATTEMPTS)
    }
}

/// Errors from lock operations
#[derive(Debug, Error)]
pub enum LockError {
    #[error("{holder} failed to acquire {mode} lock on {} after {attempts} attempts", .path.display())]
    AcquisitionFailed {
        path: PathBuf,
        mode: LockMode,
        holder: HolderIdentity,
        attempts: u32,
        #[source]
        last_cause: Option<io::Error>,
    },
    #[error("failed to release {mode} lock on {}: {source}", .path.display())]
    ReleaseFailed {
        path: PathBuf,
        mode: LockMode,
        #[source]
        source: io::Error,
    },
}

/// Advisory lock over a single lock file
#[derive(Clone, Debug)]
pub struct AdvisoryLock {
    path: PathBuf,
    retry: RetryPolicy,
}

impl AdvisoryLock {
    pub fn new(path: impl Into<PathBuf>, retry: RetryPolicy) -> Self {
        Self {
            path: path.into(),
            retry,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    pub fn acquire_shared(&self) -> Result<LockGuard, LockError> {
        self.acquire(LockMode::Shared)
    }

    pub fn acquire_exclusive(&self) -> Result<LockGuard, LockError> {
        self.acquire(LockMode::Exclusive)
    }

    /// Acquire the lock, blocking the calling thread for at most
    /// [`RetryPolicy::budget`].
    pub fn acquire(&self, mode: LockMode) -> Result<LockGuard, LockError> {
        let holder = HolderIdentity::current();
        let attempts = self.retry.max_attempts();
        let start = Instant::now();
        let mut last_cause = None;

        for attempt in 1..=attempts {
            tracing::debug!(
                path = %self.path.display(),
                %mode,
                %holder,
                attempt,
                "acquiring lock"
            );

            match self.try_acquire(mode) {
                Ok(file) => {
                    if mode == LockMode::Exclusive {
                        if let Err(e) = write_identity(&file, &holder) {
                            tracing::warn!(
                                path = %self.path.display(),
                                error = %e,
                                "failed to record lock holder"
                            );
                        }
                    }

                    if attempt > 1 {
                        tracing::info!(
                            path = %self.path.display(),
                            %mode,
                            %holder,
                            attempt,
                            elapsed_ms = start.elapsed().as_millis() as u64,
                            "lock acquired after contention"
                        );
                    } else {
                        tracing::debug!(%mode, %holder, "lock acquired");
                    }

                    return Ok(LockGuard {
                        path: self.path.clone(),
                        mode,
                        file: Some(file),
                    });
                }
                Err(e) => {
                    tracing::debug!(%mode, %holder, attempt, error = %e, "lock attempt failed");
                    last_cause = Some(e);
                }
            }

            if attempt < attempts {
                std::thread::sleep(self.retry.delay());
            }
        }

        tracing::error!(
            path = %self.path.display(),
            %mode,
            %holder,
            attempts,
            elapsed_ms = start.elapsed().as_millis() as u64,
            "failed to acquire lock"
        );

        Err(LockError::AcquisitionFailed {
            path: self.path.clone(),
            mode,
            holder,
            attempts,
            last_cause,
        })
    }

    /// Identity last written by an exclusive holder, if any
    pub fn holder(&self) -> io::Result<Option<HolderIdentity>> {
        match fs::read_to_string(&self.path) {
            Ok(content) => Ok(HolderIdentity::parse(&content)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// One non-blocking attempt. On error the file is dropped, closing it.
    fn try_acquire(&self, mode: LockMode) -> io::Result<File> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        // Never truncate here: the current holder's identity lives in the file.
        let file = OpenOptions::new()
            .read(true)
            .write(true)
            .create(true)
            .truncate(false)
            .open(&self.path)?;

        match mode {
            LockMode::Shared => FileExt::try_lock_shared(&file)?,
            LockMode::Exclusive => FileExt::try_lock_exclusive(&file)?,
        }

        Ok(file)
    }
}

fn write_identity(mut file: &File, holder: &HolderIdentity) -> io::Result<()> {
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    file.write_all(format!("{}\n", holder).as_bytes())?;
    file.flush()
}

/// A held lock. Released exactly once, by [`LockGuard::release`] or on drop.
#[derive(Debug)]
pub struct LockGuard {
    path: PathBuf,
    mode: LockMode,
    file: Option<File>,
}

impl LockGuard {
    pub fn mode(&self) -> LockMode {
        self.mode
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Release the lock and close the file, reporting unlock failures.
    pub fn release(mut self) -> Result<(), LockError> {
        let Some(file) = self.file.take() else {
            return Ok(());
        };

        tracing::debug!(path = %self.path.display(), mode = %self.mode, "releasing lock");
        FileExt::unlock(&file).map_err(|source| LockError::ReleaseFailed {
            path: self.path.clone(),
            mode: self.mode,
            source,
        })
    }
}

impl Drop for LockGuard {
    fn drop(&mut self) {
        if let Some(file) = self.file.take() {
            // Closing the handle releases the OS lock even if unlock fails.
            if let Err(e) = FileExt::unlock(&file) {
                tracing::warn!(
                    path = %self.path.display(),
                    mode = %self.mode,
                    error = %e,
                    "unlock on drop failed"
                );
            }
        }
    }
}

#[cfg(test)]
#[path = "lock_tests.rs"]
mod tests;

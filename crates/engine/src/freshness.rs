// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Last-seen modification time of the persisted blob

use std::time::SystemTime;

/// Remembers the backend timestamp as of this process's last load or save.
///
/// A match lets a read skip locking and I/O entirely. Writes never consult it.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct FreshnessMarker {
    last_seen: Option<SystemTime>,
}

impl FreshnessMarker {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn last_seen(&self) -> Option<SystemTime> {
        self.last_seen
    }

    /// True only when a timestamp was recorded and `observed` equals it
    pub fn is_current(&self, observed: Option<SystemTime>) -> bool {
        matches!((self.last_seen, observed), (Some(seen), Some(now)) if seen == now)
    }

    pub fn record(&mut self, observed: Option<SystemTime>) {
        self.last_seen = observed;
    }

    pub fn reset(&mut self) {
        self.last_seen = None;
    }
}

#[cfg(test)]
#[path = "freshness_tests.rs"]
mod tests;

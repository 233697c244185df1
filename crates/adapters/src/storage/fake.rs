// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake storage backend for testing
#![cfg_attr(coverage_nightly, coverage(off))]

use super::{BackendError, BackendKind, StorageBackend};
use std::sync::{Arc, Mutex};
use std::time::{Duration, SystemTime, UNIX_EPOCH};

/// Recorded backend call
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendCall {
    Read,
    Write { len: usize },
    Delete,
    LastModified,
}

#[derive(Default)]
struct FakeState {
    data: Option<Vec<u8>>,
    modified: Option<SystemTime>,
    tick: u64,
    fail_reads: bool,
    fail_writes: bool,
}

impl FakeState {
    /// Modification times advance one second per change, so they never tie.
    fn bump(&mut self) {
        self.tick += 1;
        self.modified = Some(UNIX_EPOCH + Duration::from_secs(self.tick));
    }
}

/// In-memory backend with call recording and injectable failures
#[derive(Clone, Default)]
pub struct FakeBackend {
    state: Arc<Mutex<FakeState>>,
    calls: Arc<Mutex<Vec<BackendCall>>>,
}

impl FakeBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend that already holds `data`
    pub fn with_data(data: impl Into<Vec<u8>>) -> Self {
        let fake = Self::new();
        fake.set_external(data);
        fake
    }

    /// Get all recorded calls
    pub fn calls(&self) -> Vec<BackendCall> {
        self.calls.lock().unwrap_or_else(|e| e.into_inner()).clone()
    }

    pub fn reads(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Read))
    }

    pub fn writes(&self) -> usize {
        self.count(|c| matches!(c, BackendCall::Write { .. }))
    }

    /// Currently stored blob, without recording a call
    pub fn data(&self) -> Option<Vec<u8>> {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .data
            .clone()
    }

    /// Replace the blob as another process would
    pub fn set_external(&self, data: impl Into<Vec<u8>>) {
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        state.data = Some(data.into());
        state.bump();
    }

    /// Advance the modification time without changing the blob
    pub fn touch(&self) {
        self.state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .bump();
    }

    pub fn fail_reads(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_reads = fail;
    }

    pub fn fail_writes(&self, fail: bool) {
        self.state.lock().unwrap_or_else(|e| e.into_inner()).fail_writes = fail;
    }

    fn count(&self, pred: impl Fn(&BackendCall) -> bool) -> usize {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|c| pred(c))
            .count()
    }

    fn record(&self, call: BackendCall) {
        self.calls
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(call);
    }
}

fn injected(message: &str) -> BackendError {
    BackendError::Command {
        tool: "fake",
        message: message.to_string(),
    }
}

impl StorageBackend for FakeBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Memory
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        self.record(BackendCall::Read);
        let state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_reads {
            return Err(injected("read failure"));
        }
        Ok(state.data.clone())
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        self.record(BackendCall::Write { len: data.len() });
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_writes {
            return Err(injected("write failure"));
        }
        state.data = Some(data.to_vec());
        state.bump();
        Ok(())
    }

    fn delete(&self) -> Result<(), BackendError> {
        self.record(BackendCall::Delete);
        let mut state = self.state.lock().unwrap_or_else(|e| e.into_inner());
        if state.fail_writes {
            return Err(injected("delete failure"));
        }
        state.data = None;
        state.bump();
        Ok(())
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        self.record(BackendCall::LastModified);
        Ok(self
            .state
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .modified)
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

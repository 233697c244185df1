// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Traced backend wrapper for consistent observability

use crate::storage::{BackendError, BackendKind, StorageBackend};
use std::time::{Instant, SystemTime};

/// Wrapper that adds tracing to any StorageBackend
#[derive(Clone, Debug)]
pub struct TracedBackend<B> {
    inner: B,
}

impl<B> TracedBackend<B> {
    pub fn new(inner: B) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &B {
        &self.inner
    }
}

impl<B: StorageBackend> StorageBackend for TracedBackend<B> {
    fn kind(&self) -> BackendKind {
        self.inner.kind()
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let span = tracing::info_span!("backend.read", kind = %self.inner.kind());
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.read();
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(Some(data)) => tracing::debug!(len = data.len(), elapsed_ms, "read blob"),
            Ok(None) => tracing::debug!(elapsed_ms, "nothing stored"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "read failed"),
        }

        result
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let span = tracing::info_span!("backend.write", kind = %self.inner.kind(), len = data.len());
        let _guard = span.enter();

        let start = Instant::now();
        let result = self.inner.write(data);
        let elapsed_ms = start.elapsed().as_millis() as u64;

        match &result {
            Ok(()) => tracing::info!(elapsed_ms, "blob written"),
            Err(e) => tracing::error!(elapsed_ms, error = %e, "write failed"),
        }

        result
    }

    fn delete(&self) -> Result<(), BackendError> {
        let span = tracing::info_span!("backend.delete", kind = %self.inner.kind());
        let _guard = span.enter();

        let result = self.inner.delete();
        match &result {
            Ok(()) => tracing::info!("blob deleted"),
            Err(e) => tracing::error!(error = %e, "delete failed"),
        }

        result
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        let result = self.inner.last_modified();
        tracing::trace!(
            kind = %self.inner.kind(),
            modified = ?result.as_ref().ok(),
            "checked modification time"
        );
        result
    }
}

#[cfg(test)]
#[path = "traced_tests.rs"]
mod tests;

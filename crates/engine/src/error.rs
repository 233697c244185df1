// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for cache access

use crate::codec::CodecError;
use cachet_adapters::BackendError;
use cachet_core::LockError;
use thiserror::Error;

/// Errors that can occur around a cache access
#[derive(Debug, Error)]
pub enum AccessError {
    #[error("lock error: {0}")]
    Lock(#[from] LockError),
    #[error("backend error: {0}")]
    Backend(#[from] BackendError),
    #[error("codec error: {0}")]
    Codec(#[from] CodecError),
}

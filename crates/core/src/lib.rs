// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! cachet-core: primitives for sharing one persisted cache between processes
//!
//! This crate provides:
//! - A cross-process advisory file lock with shared and exclusive modes
//! - Bounded retry policy for contended locks
//! - Persistence parameters (paths, backend identifiers) with validation

pub mod config;
pub mod identity;
pub mod lock;

pub use config::{
    ConfigError, KeychainParams, KeyringParams, PersistenceParams, PersistenceParamsBuilder,
    MAX_KEYRING_ATTRIBUTES,
};
pub use identity::HolderIdentity;
pub use lock::{AdvisoryLock, LockError, LockGuard, LockMode, RetryPolicy};

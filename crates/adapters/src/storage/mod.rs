// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Storage backends for the shared cache blob

mod file;
mod keychain;
mod keyring;
mod protected;
mod select;

pub use file::FileBackend;
pub use keychain::KeychainBackend;
pub use keyring::KeyringBackend;
pub use protected::ProtectedFileBackend;
pub use select::PlatformBackend;

// Test support - only compiled for tests or when explicitly requested
#[cfg(any(test, feature = "test-support"))]
mod fake;
#[cfg(any(test, feature = "test-support"))]
pub use fake::{BackendCall, FakeBackend};

use std::fmt;
use std::io;
use std::path::PathBuf;
use std::time::SystemTime;
use thiserror::Error;

/// Errors from storage operations
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("IO error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("{tool} failed: {message}")]
    Command { tool: &'static str, message: String },
    #[error("{tool} is not available: {source}")]
    Unavailable {
        tool: &'static str,
        #[source]
        source: io::Error,
    },
    #[error("stored secret is not valid base64: {0}")]
    Encoding(#[from] base64::DecodeError),
    #[error("self-test failed: {0}")]
    VerificationFailed(String),
}

impl BackendError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        BackendError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Which persistence mechanism a backend uses
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BackendKind {
    File,
    ProtectedFile,
    Keychain,
    Keyring,
    Memory,
}

impl fmt::Display for BackendKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            BackendKind::File => "file",
            BackendKind::ProtectedFile => "protected-file",
            BackendKind::Keychain => "keychain",
            BackendKind::Keyring => "keyring",
            BackendKind::Memory => "memory",
        };
        write!(f, "{}", name)
    }
}

/// Raw byte-level persistence of the cache blob.
///
/// Implementations do no locking of their own; callers serialize access
/// with an advisory lock.
pub trait StorageBackend: Send + Sync + 'static {
    fn kind(&self) -> BackendKind;

    /// Current blob, or `None` when nothing has been stored
    fn read(&self) -> Result<Option<Vec<u8>>, BackendError>;

    /// Replace the blob
    fn write(&self, data: &[u8]) -> Result<(), BackendError>;

    /// Remove the blob. Removing a missing blob succeeds.
    fn delete(&self) -> Result<(), BackendError>;

    /// When the blob last changed, or `None` when nothing has been stored.
    /// Every successful `write` or `delete` changes the reported value.
    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError>;
}

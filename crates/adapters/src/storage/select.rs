// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-OS backend selection
//!
//! The backend is chosen once, when the cache is opened, and never switches
//! afterwards.

use super::{
    BackendError, BackendKind, FileBackend, KeychainBackend, KeyringBackend, ProtectedFileBackend,
    StorageBackend,
};
use cachet_core::{ConfigError, PersistenceParams};
use std::time::SystemTime;

/// The backend appropriate for the running platform
#[derive(Clone, Debug)]
pub enum PlatformBackend {
    File(FileBackend),
    ProtectedFile(ProtectedFileBackend),
    Keychain(KeychainBackend),
    Keyring(KeyringBackend),
}

impl PlatformBackend {
    /// Pick the backend for this OS.
    ///
    /// Windows uses a DPAPI-protected file and macOS the login keychain
    /// (keychain parameters are required there). On Linux the secret service
    /// is used when keyring parameters are given and its self-test passes;
    /// otherwise the blob falls back to a plain file. Anything else gets a
    /// plain file.
    pub fn select(params: &PersistenceParams) -> Result<Self, ConfigError> {
        if cfg!(windows) {
            return Ok(PlatformBackend::ProtectedFile(ProtectedFileBackend::new(
                params.cache_path(),
            )));
        }

        if cfg!(target_os = "macos") {
            let keychain = params
                .keychain()
                .ok_or(ConfigError::Missing { field: "keychain" })?;
            return Ok(PlatformBackend::Keychain(KeychainBackend::new(
                params.cache_path(),
                keychain.clone(),
            )));
        }

        if cfg!(target_os = "linux") {
            return Ok(Self::keyring_or_file(params, KeyringBackend::verify));
        }

        Ok(Self::file(params))
    }

    /// Plain file backend at the configured cache path
    pub fn file(params: &PersistenceParams) -> Self {
        PlatformBackend::File(FileBackend::new(params.cache_path()))
    }

    pub(crate) fn keyring_or_file<V>(params: &PersistenceParams, verify: V) -> Self
    where
        V: FnOnce(&KeyringBackend) -> Result<(), BackendError>,
    {
        let Some(keyring) = params.keyring() else {
            tracing::debug!("no keyring configured, using plain file");
            return Self::file(params);
        };

        let backend = KeyringBackend::new(params.cache_path(), keyring.clone());
        match verify(&backend) {
            Ok(()) => PlatformBackend::Keyring(backend),
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    path = %params.cache_path().display(),
                    "keyring unusable, falling back to plain file"
                );
                Self::file(params)
            }
        }
    }

    fn inner(&self) -> &dyn StorageBackend {
        match self {
            PlatformBackend::File(b) => b,
            PlatformBackend::ProtectedFile(b) => b,
            PlatformBackend::Keychain(b) => b,
            PlatformBackend::Keyring(b) => b,
        }
    }
}

impl StorageBackend for PlatformBackend {
    fn kind(&self) -> BackendKind {
        self.inner().kind()
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        self.inner().read()
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        self.inner().write(data)
    }

    fn delete(&self) -> Result<(), BackendError> {
        self.inner().delete()
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        self.inner().last_modified()
    }
}

#[cfg(test)]
#[path = "select_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! macOS keychain backend
//!
//! Stores the blob as a generic-password item keyed by service and account,
//! driven through the `security` tool. The payload is base64 text. The
//! keychain has no modification time we can cheaply poll, so every write
//! and delete also touches the cache file and `last_modified` reports that.

use super::{BackendError, BackendKind, FileBackend, StorageBackend};
use crate::command::{self, ToolOutput};
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cachet_core::KeychainParams;
use std::path::PathBuf;
use std::time::SystemTime;

const TOOL: &str = "security";

/// errSecItemNotFound
const ITEM_NOT_FOUND: i32 = 44;

/// Cache blob stored in the login keychain
#[derive(Clone, Debug)]
pub struct KeychainBackend {
    marker: FileBackend,
    params: KeychainParams,
}

impl KeychainBackend {
    pub fn new(cache_path: impl Into<PathBuf>, params: KeychainParams) -> Self {
        Self {
            marker: FileBackend::new(cache_path),
            params,
        }
    }

    pub fn params(&self) -> &KeychainParams {
        &self.params
    }

    fn item_args(&self, subcommand: &str) -> Vec<String> {
        vec![
            subcommand.to_string(),
            "-s".to_string(),
            self.params.service.clone(),
            "-a".to_string(),
            self.params.account.clone(),
        ]
    }

    pub(crate) fn find_args(&self) -> Vec<String> {
        let mut args = self.item_args("find-generic-password");
        args.push("-w".to_string());
        args
    }

    pub(crate) fn store_args(&self, data: &[u8]) -> Vec<String> {
        let mut args = self.item_args("add-generic-password");
        args.push("-U".to_string());
        args.push("-w".to_string());
        args.push(STANDARD.encode(data));
        args
    }

    pub(crate) fn delete_args(&self) -> Vec<String> {
        self.item_args("delete-generic-password")
    }
}

fn is_not_found(output: &ToolOutput) -> bool {
    output.code == Some(ITEM_NOT_FOUND)
}

impl StorageBackend for KeychainBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Keychain
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        let output = command::run(TOOL, &self.find_args(), None)?;
        if is_not_found(&output) {
            return Ok(None);
        }
        if !output.success() {
            return Err(output.failure(TOOL));
        }
        Ok(Some(STANDARD.decode(output.stdout_text())?))
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let output = command::run(TOOL, &self.store_args(data), None)?;
        if !output.success() {
            return Err(output.failure(TOOL));
        }
        self.marker.touch()
    }

    fn delete(&self) -> Result<(), BackendError> {
        let output = command::run(TOOL, &self.delete_args(), None)?;
        if !output.success() && !is_not_found(&output) {
            return Err(output.failure(TOOL));
        }
        self.marker.touch()
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        self.marker.last_modified()
    }
}

#[cfg(test)]
#[path = "keychain_tests.rs"]
mod tests;

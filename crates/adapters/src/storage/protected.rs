// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Windows file backend encrypted for the current user
//!
//! The blob is protected with DPAPI (current-user scope) before it reaches
//! disk. Encryption runs through PowerShell; payloads cross the pipe as
//! base64 in both directions.

use super::{BackendError, BackendKind, FileBackend, StorageBackend};
use crate::command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

const TOOL: &str = "powershell";

const PROTECT_SCRIPT: &str = "Add-Type -AssemblyName System.Security; \
    $b = [Convert]::FromBase64String([Console]::In.ReadToEnd().Trim()); \
    $p = [System.Security.Cryptography.ProtectedData]::Protect($b, $null, 'CurrentUser'); \
    [Console]::Out.Write([Convert]::ToBase64String($p))";

const UNPROTECT_SCRIPT: &str = "Add-Type -AssemblyName System.Security; \
    $b = [Convert]::FromBase64String([Console]::In.ReadToEnd().Trim()); \
    $p = [System.Security.Cryptography.ProtectedData]::Unprotect($b, $null, 'CurrentUser'); \
    [Console]::Out.Write([Convert]::ToBase64String($p))";

/// Cache blob stored as a DPAPI-encrypted file
#[derive(Clone, Debug)]
pub struct ProtectedFileBackend {
    file: FileBackend,
}

impl ProtectedFileBackend {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            file: FileBackend::new(path),
        }
    }

    pub fn path(&self) -> &Path {
        self.file.path()
    }

    fn transform(script: &str, data: &[u8]) -> Result<Vec<u8>, BackendError> {
        if data.is_empty() {
            return Ok(Vec::new());
        }
        let args = script_args(script);
        let input = STANDARD.encode(data);
        let output = command::run(TOOL, &args, Some(input.as_bytes()))?;
        if !output.success() {
            return Err(output.failure(TOOL));
        }
        Ok(STANDARD.decode(output.stdout_text())?)
    }
}

pub(crate) fn script_args(script: &str) -> Vec<String> {
    vec![
        "-NoProfile".to_string(),
        "-NonInteractive".to_string(),
        "-Command".to_string(),
        script.to_string(),
    ]
}

impl StorageBackend for ProtectedFileBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::ProtectedFile
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        match self.file.read()? {
            Some(encrypted) => Ok(Some(Self::transform(UNPROTECT_SCRIPT, &encrypted)?)),
            None => Ok(None),
        }
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        let encrypted = Self::transform(PROTECT_SCRIPT, data)?;
        self.file.write(&encrypted)
    }

    fn delete(&self) -> Result<(), BackendError> {
        self.file.delete()
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        self.file.last_modified()
    }
}

#[cfg(test)]
#[path = "protected_tests.rs"]
mod tests;

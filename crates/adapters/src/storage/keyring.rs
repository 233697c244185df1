// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Secret Service backend (GNOME Keyring, KWallet)
//!
//! Stores the blob as a secret item driven through `secret-tool`. The item is
//! addressed by the schema name (as the `xdg:schema` attribute) plus up to
//! two configured attribute pairs. Like the keychain backend, writes and
//! deletes touch the cache file so `last_modified` can track them.
//!
//! Without configured attributes the item is addressed by the schema alone,
//! so `delete` clears every item stored under that schema. That includes a
//! self-test item left behind by an interrupted [`KeyringBackend::verify`].
//! Configure at least one attribute pair when the schema is shared.

use super::{BackendError, BackendKind, FileBackend, StorageBackend};
use crate::command;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use cachet_core::KeyringParams;
use std::path::PathBuf;
use std::time::SystemTime;

const TOOL: &str = "secret-tool";
const SCHEMA_ATTRIBUTE: &str = "xdg:schema";
const PROBE_DATA: &[u8] = b"Test Data";

/// Cache blob stored in the desktop secret service
#[derive(Clone, Debug)]
pub struct KeyringBackend {
    marker: FileBackend,
    params: KeyringParams,
}

impl KeyringBackend {
    pub fn new(cache_path: impl Into<PathBuf>, params: KeyringParams) -> Self {
        Self {
            marker: FileBackend::new(cache_path),
            params,
        }
    }

    pub fn params(&self) -> &KeyringParams {
        &self.params
    }

    /// Check that the secret service works by storing, reading back, and
    /// clearing a probe item that does not collide with the real one.
    pub fn verify(&self) -> Result<(), BackendError> {
        let probe = self.probe_attributes();

        self.store(&probe, PROBE_DATA)?;
        let read = self.lookup(&probe)?;
        self.clear(&probe)?;

        match read {
            Some(data) if data == PROBE_DATA => Ok(()),
            Some(_) => Err(BackendError::VerificationFailed(
                "secret read back does not match what was stored".to_string(),
            )),
            None => Err(BackendError::VerificationFailed(
                "stored secret could not be found".to_string(),
            )),
        }
    }

    /// Attribute pairs addressing the cache item
    pub(crate) fn attributes(&self) -> Vec<(String, String)> {
        let mut attributes = vec![(SCHEMA_ATTRIBUTE.to_string(), self.params.schema.clone())];
        attributes.extend(self.params.attributes.iter().cloned());
        attributes
    }

    /// Same keys as the cache item, with test values
    pub(crate) fn probe_attributes(&self) -> Vec<(String, String)> {
        let mut attributes = vec![(SCHEMA_ATTRIBUTE.to_string(), self.params.schema.clone())];
        if self.params.attributes.is_empty() {
            attributes.push(("cachet-probe".to_string(), "testAttr1".to_string()));
        } else {
            attributes.extend(
                self.params
                    .attributes
                    .iter()
                    .enumerate()
                    .map(|(i, (key, _))| (key.clone(), format!("testAttr{}", i + 1))),
            );
        }
        attributes
    }

    pub(crate) fn store_args(&self, attributes: &[(String, String)]) -> Vec<String> {
        let mut args = vec![
            "store".to_string(),
            format!("--label={}", self.params.label),
        ];
        if let Some(collection) = &self.params.collection {
            args.push(format!("--collection={}", collection));
        }
        push_attributes(&mut args, attributes);
        args
    }

    pub(crate) fn lookup_args(&self, attributes: &[(String, String)]) -> Vec<String> {
        let mut args = vec!["lookup".to_string()];
        push_attributes(&mut args, attributes);
        args
    }

    pub(crate) fn clear_args(&self, attributes: &[(String, String)]) -> Vec<String> {
        let mut args = vec!["clear".to_string()];
        push_attributes(&mut args, attributes);
        args
    }

    fn store(&self, attributes: &[(String, String)], data: &[u8]) -> Result<(), BackendError> {
        let secret = STANDARD.encode(data);
        let output = command::run(TOOL, &self.store_args(attributes), Some(secret.as_bytes()))?;
        if !output.success() {
            return Err(output.failure(TOOL));
        }
        Ok(())
    }

    fn lookup(&self, attributes: &[(String, String)]) -> Result<Option<Vec<u8>>, BackendError> {
        let output = command::run(TOOL, &self.lookup_args(attributes), None)?;
        if !output.success() {
            // A quiet non-zero exit means no matching item
            if output.stderr.trim().is_empty() {
                return Ok(None);
            }
            return Err(output.failure(TOOL));
        }
        let secret = output.stdout_text();
        if secret.is_empty() {
            return Ok(None);
        }
        Ok(Some(STANDARD.decode(secret)?))
    }

    fn clear(&self, attributes: &[(String, String)]) -> Result<(), BackendError> {
        let output = command::run(TOOL, &self.clear_args(attributes), None)?;
        if !output.success() && !output.stderr.trim().is_empty() {
            return Err(output.failure(TOOL));
        }
        Ok(())
    }
}

fn push_attributes(args: &mut Vec<String>, attributes: &[(String, String)]) {
    for (key, value) in attributes {
        args.push(key.clone());
        args.push(value.clone());
    }
}

impl StorageBackend for KeyringBackend {
    fn kind(&self) -> BackendKind {
        BackendKind::Keyring
    }

    fn read(&self) -> Result<Option<Vec<u8>>, BackendError> {
        self.lookup(&self.attributes())
    }

    fn write(&self, data: &[u8]) -> Result<(), BackendError> {
        self.store(&self.attributes(), data)?;
        self.marker.touch()
    }

    fn delete(&self) -> Result<(), BackendError> {
        self.clear(&self.attributes())?;
        self.marker.touch()
    }

    fn last_modified(&self) -> Result<Option<SystemTime>, BackendError> {
        self.marker.last_modified()
    }
}

#[cfg(test)]
#[path = "keyring_tests.rs"]
mod tests;

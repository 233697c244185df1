// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Paths and backend identifiers for a shared cache.
//!
//! Parameters are validated once, when built. Every string that is supplied
//! must be non-empty; optional sections that are omitted stay `None`.
//!
//! ```toml
//! cache_path = "/home/u/.cache/app/cache.bin"
//! lock_path = "/home/u/.cache/app/cache.lock"
//!
//! [retry]
//! delay = "150ms"
//! max_attempts = 100
//!
//! [keyring]
//! schema = "com.example.app.cache"
//! label = "App token cache"
//! attributes = [["app", "example"], ["version", "1"]]
//! ```

use crate::lock::{AdvisoryLock, RetryPolicy};
use serde::Deserialize;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Secret-service items are looked up by at most this many attribute pairs
pub const MAX_KEYRING_ATTRIBUTES: usize = 2;

/// Errors from building or loading parameters. Never retried.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is required")]
    Missing { field: &'static str },

    #[error("keyring accepts at most {max} attribute pairs, got {count}")]
    TooManyAttributes { max: usize, count: usize },

    #[error("IO error reading {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Keychain item coordinates (macOS)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeychainParams {
    pub service: String,
    pub account: String,
}

/// Secret-service item coordinates (Linux)
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct KeyringParams {
    /// Collection to store into; the default collection when `None`
    pub collection: Option<String>,
    pub schema: String,
    pub label: String,
    pub attributes: Vec<(String, String)>,
}

/// Validated configuration for one shared cache
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PersistenceParams {
    cache_path: PathBuf,
    lock_path: PathBuf,
    keychain: Option<KeychainParams>,
    keyring: Option<KeyringParams>,
    retry: RetryPolicy,
}

impl PersistenceParams {
    pub fn builder(
        cache_path: impl Into<PathBuf>,
        lock_path: impl Into<PathBuf>,
    ) -> PersistenceParamsBuilder {
        PersistenceParamsBuilder {
            cache_path: cache_path.into(),
            lock_path: lock_path.into(),
            keychain_service: None,
            keychain_account: None,
            keyring_collection: None,
            keyring_schema: None,
            keyring_label: None,
            keyring_attributes: Vec::new(),
            retry: RetryPolicy::default(),
        }
    }

    /// Parse and validate a TOML document
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let raw: RawParams = toml::from_str(content)?;
        raw.into_builder().build()
    }

    /// Load and validate a TOML file
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&content)
    }

    pub fn cache_path(&self) -> &Path {
        &self.cache_path
    }

    pub fn lock_path(&self) -> &Path {
        &self.lock_path
    }

    pub fn keychain(&self) -> Option<&KeychainParams> {
        self.keychain.as_ref()
    }

    pub fn keyring(&self) -> Option<&KeyringParams> {
        self.keyring.as_ref()
    }

    pub fn retry(&self) -> RetryPolicy {
        self.retry
    }

    /// Same parameters with a different retry policy
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Lock over this cache's lock file
    pub fn lock(&self) -> AdvisoryLock {
        AdvisoryLock::new(self.lock_path.clone(), self.retry)
    }
}

/// Builder for [`PersistenceParams`]
#[derive(Clone, Debug)]
pub struct PersistenceParamsBuilder {
    cache_path: PathBuf,
    lock_path: PathBuf,
    keychain_service: Option<String>,
    keychain_account: Option<String>,
    keyring_collection: Option<String>,
    keyring_schema: Option<String>,
    keyring_label: Option<String>,
    keyring_attributes: Vec<(String, String)>,
    retry: RetryPolicy,
}

impl PersistenceParamsBuilder {
    pub fn keychain(mut self, service: impl Into<String>, account: impl Into<String>) -> Self {
        self.keychain_service = Some(service.into());
        self.keychain_account = Some(account.into());
        self
    }

    pub fn keyring(mut self, schema: impl Into<String>, label: impl Into<String>) -> Self {
        self.keyring_schema = Some(schema.into());
        self.keyring_label = Some(label.into());
        self
    }

    pub fn keyring_collection(mut self, collection: impl Into<String>) -> Self {
        self.keyring_collection = Some(collection.into());
        self
    }

    pub fn keyring_attribute(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.keyring_attributes.push((key.into(), value.into()));
        self
    }

    pub fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    pub fn build(self) -> Result<PersistenceParams, ConfigError> {
        require_path("cache_path", &self.cache_path)?;
        require_path("lock_path", &self.lock_path)?;

        let keychain = match (self.keychain_service, self.keychain_account) {
            (None, None) => None,
            (service, account) => Some(KeychainParams {
                service: require("keychain.service", service)?,
                account: require("keychain.account", account)?,
            }),
        };

        let keyring_requested = self.keyring_schema.is_some()
            || self.keyring_label.is_some()
            || self.keyring_collection.is_some()
            || !self.keyring_attributes.is_empty();

        let keyring = if keyring_requested {
            if self.keyring_attributes.len() > MAX_KEYRING_ATTRIBUTES {
                return Err(ConfigError::TooManyAttributes {
                    max: MAX_KEYRING_ATTRIBUTES,
                    count: self.keyring_attributes.len(),
                });
            }
            for (key, value) in &self.keyring_attributes {
                not_empty("keyring.attributes key", key)?;
                not_empty("keyring.attributes value", value)?;
            }
            if let Some(collection) = &self.keyring_collection {
                not_empty("keyring.collection", collection)?;
            }
            Some(KeyringParams {
                collection: self.keyring_collection,
                schema: require("keyring.schema", self.keyring_schema)?,
                label: require("keyring.label", self.keyring_label)?,
                attributes: self.keyring_attributes,
            })
        } else {
            None
        };

        Ok(PersistenceParams {
            cache_path: self.cache_path,
            lock_path: self.lock_path,
            keychain,
            keyring,
            retry: self.retry,
        })
    }
}

fn not_empty(field: &'static str, value: &str) -> Result<(), ConfigError> {
    if value.trim().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}

fn require(field: &'static str, value: Option<String>) -> Result<String, ConfigError> {
    let value = value.ok_or(ConfigError::Missing { field })?;
    not_empty(field, &value)?;
    Ok(value)
}

fn require_path(field: &'static str, path: &Path) -> Result<(), ConfigError> {
    if path.as_os_str().is_empty() {
        return Err(ConfigError::Empty { field });
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawParams {
    cache_path: PathBuf,
    lock_path: PathBuf,
    #[serde(default)]
    retry: RetryPolicy,
    keychain: Option<RawKeychain>,
    keyring: Option<RawKeyring>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKeychain {
    service: Option<String>,
    account: Option<String>,
}

#[derive(Deserialize)]
#[serde(deny_unknown_fields)]
struct RawKeyring {
    collection: Option<String>,
    schema: Option<String>,
    label: Option<String>,
    #[serde(default)]
    attributes: Vec<(String, String)>,
}

impl RawParams {
    fn into_builder(self) -> PersistenceParamsBuilder {
        let mut builder =
            PersistenceParams::builder(self.cache_path, self.lock_path).retry(self.retry);

        if let Some(keychain) = self.keychain {
            builder.keychain_service = keychain.service;
            builder.keychain_account = keychain.account;
        }

        if let Some(keyring) = self.keyring {
            builder.keyring_collection = keyring.collection;
            builder.keyring_schema = keyring.schema;
            builder.keyring_label = keyring.label;
            builder.keyring_attributes = keyring.attributes;
        }

        builder
    }
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

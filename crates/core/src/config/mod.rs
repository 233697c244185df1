// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Persistence configuration

mod params;

pub use params::{
    ConfigError, KeychainParams, KeyringParams, PersistenceParams, PersistenceParamsBuilder,
    MAX_KEYRING_ATTRIBUTES,
};

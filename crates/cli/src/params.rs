// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Cache parameters from flags and config file

use anyhow::{bail, Context, Result};
use cachet_adapters::{PlatformBackend, TracedBackend};
use cachet_engine::CacheAccess;
use cachet_core::PersistenceParams;
use clap::{Args, ValueEnum};
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub type Access = CacheAccess<TracedBackend<PlatformBackend>>;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum BackendChoice {
    /// The platform's secure store, falling back to a plain file
    Auto,
    /// Always a plain file
    File,
}

#[derive(Args, Debug)]
pub struct ParamArgs {
    /// TOML file with cache parameters
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Cache blob path
    #[arg(long, global = true)]
    cache: Option<PathBuf>,

    /// Lock file path (defaults to the cache path plus `.lock`)
    #[arg(long, global = true)]
    lock: Option<PathBuf>,

    /// Wait between lock attempts, e.g. `100ms`
    #[arg(long, global = true, value_parser = crate::parse_duration)]
    retry_delay: Option<Duration>,

    /// Lock attempts before giving up
    #[arg(long, global = true)]
    retry_attempts: Option<u32>,

    /// Where the blob is stored
    #[arg(long, global = true, value_enum, default_value_t = BackendChoice::Auto)]
    backend: BackendChoice,
}

/// Parameters plus the backend to open them with
#[derive(Debug)]
pub struct Settings {
    pub params: PersistenceParams,
    pub backend: BackendChoice,
}

impl Settings {
    pub fn open(&self) -> Result<Access> {
        match self.backend {
            BackendChoice::Auto => cachet_engine::open(&self.params).context("opening cache"),
            BackendChoice::File => Ok(CacheAccess::with_params(
                TracedBackend::new(PlatformBackend::file(&self.params)),
                &self.params,
            )),
        }
    }
}

pub fn resolve(args: &ParamArgs) -> Result<Settings> {
    let params = match &args.config {
        Some(config) => {
            if args.cache.is_some() || args.lock.is_some() {
                bail!("--config cannot be combined with --cache or --lock");
            }
            PersistenceParams::load(config)
                .with_context(|| format!("loading {}", config.display()))?
        }
        None => {
            let cache = match &args.cache {
                Some(cache) => cache.clone(),
                None => crate::default_dir()?.join("cache.bin"),
            };
            let lock = match &args.lock {
                Some(lock) => lock.clone(),
                None => default_lock_path(&cache),
            };
            PersistenceParams::builder(cache, lock).build()?
        }
    };

    let mut retry = params.retry();
    if let Some(delay) = args.retry_delay {
        retry = retry.with_delay(delay);
    }
    if let Some(attempts) = args.retry_attempts {
        retry = retry.with_max_attempts(attempts);
    }

    Ok(Settings {
        params: params.with_retry(retry),
        backend: args.backend,
    })
}

pub(crate) fn default_lock_path(cache: &Path) -> PathBuf {
    let mut name = cache
        .file_name()
        .map(OsString::from)
        .unwrap_or_else(|| OsString::from("cache"));
    name.push(".lock");
    cache.with_file_name(name)
}

#[cfg(test)]
#[path = "params_tests.rs"]
mod tests;

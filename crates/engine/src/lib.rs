// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! Cache access orchestration over a shared, lock-protected blob

mod access;
mod codec;
mod error;
mod freshness;

pub use access::{AccessIntent, AccessStats, AccessWindow, CacheAccess};
pub use codec::{CodecError, SerializableCache};
pub use error::AccessError;
pub use freshness::FreshnessMarker;

use cachet_adapters::{PlatformBackend, StorageBackend, TracedBackend};
use cachet_core::{ConfigError, PersistenceParams};

/// Cache access over the platform's backend, selected once from `params`
pub fn open(
    params: &PersistenceParams,
) -> Result<CacheAccess<TracedBackend<PlatformBackend>>, ConfigError> {
    let backend = PlatformBackend::select(params)?;
    tracing::debug!(
        kind = %backend.kind(),
        cache = %params.cache_path().display(),
        lock = %params.lock_path().display(),
        "opened cache"
    );
    Ok(CacheAccess::with_params(TracedBackend::new(backend), params))
}

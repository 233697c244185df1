// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Seam between the caller's in-memory cache and the persisted blob

use thiserror::Error;

/// Errors converting between a cache and its blob
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("cache blob could not be decoded: {0}")]
    Decode(String),
    #[error("cache could not be encoded: {0}")]
    Encode(String),
}

/// An in-memory cache that can be loaded from and saved to a blob.
///
/// The token format itself belongs to the caller; the access layer only
/// moves bytes.
pub trait SerializableCache {
    /// Replace the cache contents with those decoded from `blob`
    fn deserialize(&mut self, blob: &[u8]) -> Result<(), CodecError>;

    fn serialize(&self) -> Result<Vec<u8>, CodecError>;
}

impl SerializableCache for Vec<u8> {
    fn deserialize(&mut self, blob: &[u8]) -> Result<(), CodecError> {
        self.clear();
        self.extend_from_slice(blob);
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.clone())
    }
}

impl SerializableCache for String {
    fn deserialize(&mut self, blob: &[u8]) -> Result<(), CodecError> {
        let text = std::str::from_utf8(blob).map_err(|e| CodecError::Decode(e.to_string()))?;
        self.clear();
        self.push_str(text);
        Ok(())
    }

    fn serialize(&self) -> Result<Vec<u8>, CodecError> {
        Ok(self.as_bytes().to_vec())
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;

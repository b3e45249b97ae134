// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Codec: value <-> bytes transcoding

use thiserror::Error;

/// Errors from encoding or decoding persisted values
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Value <-> bytes transcoder for persisted roots
///
/// Must handle objects, arrays, strings, numbers, booleans, and null; that
/// is the whole vocabulary the value graph produces.
pub trait Codec: Send + Sync + 'static {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError>;
    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError>;
}

/// Plain JSON codec
#[derive(Debug, Clone, Default)]
pub struct JsonCodec;

impl JsonCodec {
    pub fn new() -> Self {
        Self
    }
}

impl Codec for JsonCodec {
    fn encode(&self, value: &serde_json::Value) -> Result<Vec<u8>, CodecError> {
        Ok(serde_json::to_vec(value)?)
    }

    fn decode(&self, bytes: &[u8]) -> Result<serde_json::Value, CodecError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[cfg(test)]
#[path = "codec_tests.rs"]
mod tests;

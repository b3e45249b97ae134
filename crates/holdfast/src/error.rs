// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for root construction and persistence

use holdfast_core::{ContractViolation, ValidationError};
use holdfast_store::{CodecError, StoreError};
use std::path::PathBuf;
use thiserror::Error;

/// Errors that can fail `create`
#[derive(Debug, Error)]
pub enum CreateError {
    #[error("invalid arguments: {0}")]
    Validation(#[from] ValidationError),
    #[error("load failed: {0}")]
    Load(#[source] StoreError),
    #[error("parse failed: {0}")]
    Parse(#[source] CodecError),
    #[error("persisted value at {0} is not an object or array")]
    NotAContainer(PathBuf),
    #[error("contract violation: {0}")]
    Contract(#[from] ContractViolation),
}

/// A flush attempt failed
///
/// Write errors are inherently asynchronous: the mutation that triggered the
/// flush already reported success, so these arrive through the `on_saved`
/// callback (or escalate as an unhandled fault when none is configured).
#[derive(Debug, Error)]
pub enum WriteError {
    #[error("encode failed: {0}")]
    Encode(#[from] CodecError),
    #[error("write failed: {0}")]
    Store(#[from] StoreError),
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Synchronous mutation errors

use thiserror::Error;

/// The caller attempted a mutation the container contract cannot honor
///
/// These surface synchronously at the offending call site and the mutation
/// does not apply; the graph and its roots stay fully usable.
#[derive(Debug, Error)]
pub enum ContractViolation {
    #[error("container is frozen and cannot be instrumented")]
    Frozen,
    #[error("operation requires an object container")]
    NotAnObject,
    #[error("operation requires an array container")]
    NotAnArray,
    #[error("index {index} out of bounds (len {len})")]
    IndexOutOfBounds { index: usize, len: usize },
}

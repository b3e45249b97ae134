// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! holdfast-core: data model and state machines for live persisted values
//!
//! This crate provides:
//! - The shared [`Node`]/[`Value`] container graph with explicit observable
//!   mutation operations
//! - Per-root instrumentation tagging ([`wrap`]) with bounded-depth tracking
//! - The pure per-root flush scheduling state machine
//! - Root configuration and argument validation
//!
//! No I/O happens here; the `holdfast` crate wires these pieces to a backing
//! store and a codec.

pub mod error;
pub mod node;
pub mod options;
pub mod schedule;
pub mod value;

// Re-exports
pub use error::ContractViolation;
pub use node::{wrap, DirtySink, Node, NodeKind};
pub use options::{Options, SaveHook, ValidationError};
pub use schedule::{CompleteAction, DirtyAction, FlushPolicy, FlushState};
pub use value::Value;

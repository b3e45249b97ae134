// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! holdfast-store: external collaborators for persisted roots
//!
//! The backing store moves bytes at a path; the codec transcodes values to
//! and from bytes. Both are trait seams so tests (and alternative storage)
//! can be injected without touching the core.

pub mod codec;
pub mod store;

#[cfg(any(test, feature = "test-support"))]
pub mod fake;

pub use codec::{Codec, CodecError, JsonCodec};
pub use store::{BackingStore, FsStore, StoreError};

#[cfg(any(test, feature = "test-support"))]
pub use fake::FakeStore;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

// Allow panic!/unwrap/expect in test code
#![cfg_attr(test, allow(clippy::panic))]
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

//! holdfast: live persisted values
//!
//! A persisted root is an in-memory value graph whose mutations are
//! synchronized to a backing store automatically; there is no save call.
//! Construction loads (or defaults) the value, instruments it, and hands
//! back a [`Persisted`] handle:
//!
//! ```no_run
//! use holdfast::{create, Options};
//!
//! # async fn demo() -> Result<(), holdfast::CreateError> {
//! let root = create("state.json", Options::new()).await?;
//! root.value().set("counter", 1)?;
//! // Written to state.json once the burst of mutations quiesces.
//! # Ok(())
//! # }
//! ```
//!
//! Mutations through any container handle inside the graph, including
//! containers shared with other roots, schedule a coalesced write per
//! owning root. Write failures are reported through `Options::on_saved`,
//! or escalate as an unhandled fault when no callback is configured.

mod error;
mod flusher;
mod root;

pub use error::{CreateError, WriteError};
pub use root::Persisted;

// Re-export the surface callers need to work with the value graph.
pub use holdfast_core::{
    ContractViolation, FlushPolicy, Node, NodeKind, Options, SaveHook, ValidationError, Value,
};
pub use holdfast_store::{BackingStore, Codec, FsStore, JsonCodec};

use holdfast_core::{wrap, DirtySink, FlushState};
use root::{RootShared, Sched};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use tracing::debug;

/// Create a live persisted value backed by the filesystem, JSON-encoded
///
/// Reads `path` once: missing file resolves to the configured default value
/// (an empty object when unset), any other read or decode failure fails
/// construction. Argument validation happens first, before any I/O.
pub async fn create(
    path: impl Into<PathBuf>,
    options: Options,
) -> Result<Persisted, CreateError> {
    create_with(
        Arc::new(FsStore::new()),
        Arc::new(JsonCodec::new()),
        path,
        options,
    )
    .await
}

/// Create a live persisted value with injected store and codec
pub async fn create_with(
    store: Arc<dyn BackingStore>,
    codec: Arc<dyn Codec>,
    path: impl Into<PathBuf>,
    options: Options,
) -> Result<Persisted, CreateError> {
    let path = path.into();
    options.validate(&path)?;

    let json = match store.read(&path).await {
        Ok(bytes) => {
            debug!(path = %path.display(), "loaded persisted value");
            codec.decode(&bytes).map_err(CreateError::Parse)?
        }
        Err(err) if err.is_not_found() => {
            debug!(path = %path.display(), "no persisted value, using default");
            options
                .default_value
                .clone()
                .unwrap_or_else(|| serde_json::Value::Object(serde_json::Map::new()))
        }
        Err(err) => return Err(CreateError::Load(err)),
    };

    // Deep-owned: the graph is built fresh from JSON, independent of the
    // caller's copy of the default value.
    let value = Node::from_json(&json).ok_or_else(|| CreateError::NotAContainer(path.clone()))?;

    let shared = Arc::new(RootShared {
        path,
        depth: options.depth,
        policy: options.policy(),
        on_saved: options.on_saved.clone(),
        value,
        store,
        codec,
        rt: tokio::runtime::Handle::current(),
        sched: Mutex::new(Sched {
            state: FlushState::Idle,
            deadline: None,
        }),
    });

    let sink: Arc<dyn DirtySink> = shared.clone();
    wrap(&sink, 1, &Value::from(&shared.value))?;

    Ok(Persisted { shared })
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The persisted root: configuration, dirty-signal handling, and the flush
//! driver task
//!
//! Every root owns one value graph and one four-state flush machine. Dirty
//! signals arrive synchronously from mutations anywhere in the graph; the
//! root translates them into at most one driver task, which waits out the
//! scheduling window, flushes, and re-flushes exactly once per burst of
//! mutations that landed while a write was in flight.

use crate::flusher;
use holdfast_core::{
    CompleteAction, DirtyAction, DirtySink, FlushPolicy, FlushState, Node, SaveHook,
};
use holdfast_store::{BackingStore, Codec};
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::time::Instant;
use tracing::debug;

pub(crate) struct Sched {
    pub(crate) state: FlushState,
    /// Debounce deadline; `None` under the immediate policy
    pub(crate) deadline: Option<Instant>,
}

/// Shared state of one persisted root
pub(crate) struct RootShared {
    pub(crate) path: PathBuf,
    pub(crate) depth: u32,
    pub(crate) policy: FlushPolicy,
    pub(crate) on_saved: Option<SaveHook>,
    pub(crate) value: Node,
    pub(crate) store: Arc<dyn BackingStore>,
    pub(crate) codec: Arc<dyn Codec>,
    /// Runtime captured at construction, so signals from synchronous
    /// mutation contexts can spawn the driver
    pub(crate) rt: tokio::runtime::Handle,
    pub(crate) sched: Mutex<Sched>,
}

impl RootShared {
    pub(crate) fn lock_sched(&self) -> MutexGuard<'_, Sched> {
        self.sched.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn window_deadline(&self) -> Option<Instant> {
        match self.policy {
            FlushPolicy::Immediate => None,
            FlushPolicy::Debounce(delay) => Some(Instant::now() + delay),
        }
    }
}

impl DirtySink for RootShared {
    fn depth(&self) -> u32 {
        self.depth
    }

    fn mark_dirty(self: Arc<Self>) {
        let mut sched = self.lock_sched();
        match sched.state.mark_dirty() {
            DirtyAction::Schedule => {
                sched.deadline = self.window_deadline();
                drop(sched);
                debug!(path = %self.path.display(), "flush scheduled");
                let root = Arc::clone(&self);
                self.rt.spawn(drive(root));
            }
            DirtyAction::Restart => {
                // New mutation within the window; the quiet period starts over.
                sched.deadline = self.window_deadline();
            }
            DirtyAction::Coalesced => {}
        }
    }
}

/// Flush driver: one per scheduling window, spawned on the Idle -> Scheduled
/// transition and gone once the root converges back to Idle
async fn drive(root: Arc<RootShared>) {
    // Wait out the window. A debounce deadline moves on every fresh
    // mutation, so sleep until it stops moving.
    loop {
        let deadline = root.lock_sched().deadline;
        match deadline {
            None => {
                tokio::task::yield_now().await;
                break;
            }
            Some(deadline) => {
                tokio::time::sleep_until(deadline).await;
                if root.lock_sched().deadline == Some(deadline) {
                    break;
                }
            }
        }
    }

    root.lock_sched().state.begin_flush();
    loop {
        debug!(path = %root.path.display(), "flush started");
        let outcome = flusher::flush(&root).await;
        // Transition before reporting: a mutation that lands inside the
        // callback must schedule a fresh window, not be folded into this one.
        let action = root.lock_sched().state.complete_flush();
        flusher::report(&root, outcome);
        if action == CompleteAction::Done {
            break;
        }
    }
}

/// Handle to a live persisted value
///
/// The wrapped root value stays reachable (and its pending flushes keep
/// running) for as long as any clone of this handle exists. Mutations made
/// through [`Persisted::value`] and any container handles cloned out of it
/// are persisted automatically.
#[derive(Clone)]
pub struct Persisted {
    pub(crate) shared: Arc<RootShared>,
}

impl Persisted {
    /// The live root value
    pub fn value(&self) -> &Node {
        &self.shared.value
    }

    /// The backing store path this root persists to
    pub fn path(&self) -> &Path {
        &self.shared.path
    }

    /// True when no flush is scheduled or in flight
    pub fn is_idle(&self) -> bool {
        self.shared.lock_sched().state.is_idle()
    }
}

impl std::fmt::Debug for Persisted {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Persisted")
            .field("path", &self.shared.path)
            .field("state", &self.shared.lock_sched().state)
            .finish()
    }
}

#[cfg(test)]
#[path = "root_tests.rs"]
mod tests;

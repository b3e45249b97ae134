// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Per-root flush scheduling state machine
//!
//! Pure transitions, no timers: the owning root drives this machine from its
//! dirty signals and flush completions, and interprets the returned actions.
//! Invariant: at most one flush is in flight per root, and a burst of
//! mutations within one scheduling window collapses into a single write.

use std::time::Duration;

/// When a scheduled flush is allowed to fire
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushPolicy {
    /// Flush as soon as the current cooperative work unit yields
    Immediate,
    /// Flush after a quiet period of this length with no further mutation
    Debounce(Duration),
}

/// Flush state of one root
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushState {
    /// Nothing pending
    Idle,
    /// A flush is scheduled but has not started
    Scheduled,
    /// A flush is in flight
    Saving,
    /// A flush is in flight and a mutation arrived meanwhile
    SavingDirty,
}

/// What the root must do after a dirty signal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DirtyAction {
    /// Start a flush driver for the new scheduling window
    Schedule,
    /// Restart the debounce window of the already-scheduled flush
    Restart,
    /// Already covered by a scheduled or follow-up flush
    Coalesced,
}

/// What the root must do after a flush attempt completes
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompleteAction {
    /// Converged; the driver exits
    Done,
    /// A mutation arrived mid-flight; flush once more, immediately
    FlushAgain,
}

impl FlushState {
    /// A mutation was applied somewhere in the root's graph
    pub fn mark_dirty(&mut self) -> DirtyAction {
        match self {
            FlushState::Idle => {
                *self = FlushState::Scheduled;
                DirtyAction::Schedule
            }
            FlushState::Scheduled => DirtyAction::Restart,
            FlushState::Saving => {
                *self = FlushState::SavingDirty;
                DirtyAction::Coalesced
            }
            FlushState::SavingDirty => DirtyAction::Coalesced,
        }
    }

    /// The scheduling window elapsed and the flush is starting
    pub fn begin_flush(&mut self) {
        debug_assert_eq!(*self, FlushState::Scheduled);
        *self = FlushState::Saving;
    }

    /// One flush attempt finished (successfully or not)
    pub fn complete_flush(&mut self) -> CompleteAction {
        match self {
            FlushState::SavingDirty => {
                *self = FlushState::Saving;
                CompleteAction::FlushAgain
            }
            _ => {
                *self = FlushState::Idle;
                CompleteAction::Done
            }
        }
    }

    pub fn is_idle(&self) -> bool {
        matches!(self, FlushState::Idle)
    }
}

#[cfg(test)]
#[path = "schedule_tests.rs"]
mod tests;

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Flushing: snapshot, encode, single write, outcome reporting

use crate::error::WriteError;
use crate::root::RootShared;
use tracing::{debug, error, warn};

/// Serialize the root's current value and issue exactly one write
pub(crate) async fn flush(root: &RootShared) -> Result<(), WriteError> {
    let snapshot = root.value.to_json();
    let bytes = root.codec.encode(&snapshot)?;
    root.store.write(&root.path, &bytes).await?;
    Ok(())
}

/// Report one flush attempt's outcome
///
/// Success and failure both go to the completion callback when one is
/// configured. A failure with no callback cannot be swallowed: the mutation
/// that triggered this flush already returned success to its caller, so the
/// error escalates as an unhandled fault in the driver task.
pub(crate) fn report(root: &RootShared, outcome: Result<(), WriteError>) {
    match outcome {
        Ok(()) => {
            debug!(path = %root.path.display(), "flush complete");
            if let Some(hook) = &root.on_saved {
                hook(None, &root.value);
            }
        }
        Err(err) => match &root.on_saved {
            Some(hook) => {
                warn!(path = %root.path.display(), error = %err, "flush failed");
                hook(Some(&err), &root.value);
            }
            None => escalate(root, &err),
        },
    }
}

#[allow(clippy::panic)]
fn escalate(root: &RootShared, err: &WriteError) -> ! {
    error!(path = %root.path.display(), error = %err, "unhandled write failure");
    panic!("unhandled write failure for {}: {err}", root.path.display());
}

#[cfg(test)]
#[path = "flusher_tests.rs"]
mod tests;

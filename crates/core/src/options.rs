// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Root configuration and argument validation

use crate::node::Node;
use crate::schedule::FlushPolicy;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

/// Completion callback, invoked once per flush attempt with the outcome and
/// the current root value
pub type SaveHook =
    Arc<dyn Fn(Option<&(dyn std::error::Error + Send + Sync + 'static)>, &Node) + Send + Sync>;

/// Configuration for one persisted root
#[derive(Clone, Default, Serialize, Deserialize)]
pub struct Options {
    /// Instrumentation depth bound below the root value (0 = unlimited)
    #[serde(default)]
    pub depth: u32,
    /// Debounce window; absent means flush on the next cooperative yield
    #[serde(default, with = "humantime_serde")]
    pub delay: Option<Duration>,
    /// Value used when the backing store reports the path missing.
    /// Deep-owned at construction; defaults to an empty object.
    #[serde(default)]
    pub default_value: Option<serde_json::Value>,
    /// Completion callback for flush attempts
    #[serde(skip)]
    pub on_saved: Option<SaveHook>,
}

/// Bad construction arguments, rejected before any I/O
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    #[error("path must be a non-empty string")]
    EmptyPath,
    #[error("default value must be an object or array")]
    DefaultNotContainer,
}

impl Options {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_depth(mut self, depth: u32) -> Self {
        self.depth = depth;
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn with_default(mut self, default_value: serde_json::Value) -> Self {
        self.default_value = Some(default_value);
        self
    }

    pub fn with_on_saved(mut self, hook: SaveHook) -> Self {
        self.on_saved = Some(hook);
        self
    }

    /// The flush timing policy these options select
    pub fn policy(&self) -> FlushPolicy {
        match self.delay {
            Some(delay) => FlushPolicy::Debounce(delay),
            None => FlushPolicy::Immediate,
        }
    }

    /// Validate construction arguments
    ///
    /// Synchronous and immediate: a root is never constructed, and no read
    /// is issued, when this fails.
    pub fn validate(&self, path: &Path) -> Result<(), ValidationError> {
        if path.as_os_str().is_empty() {
            return Err(ValidationError::EmptyPath);
        }
        if let Some(default) = &self.default_value {
            if !default.is_object() && !default.is_array() {
                return Err(ValidationError::DefaultNotContainer);
            }
        }
        Ok(())
    }
}

impl std::fmt::Debug for Options {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Options")
            .field("depth", &self.depth)
            .field("delay", &self.delay)
            .field("default_value", &self.default_value)
            .field("on_saved", &self.on_saved.is_some())
            .finish()
    }
}

#[cfg(test)]
#[path = "options_tests.rs"]
mod tests;

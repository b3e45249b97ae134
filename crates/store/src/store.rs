// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Backing store: byte-level read/write keyed by path

use async_trait::async_trait;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::trace;

/// Errors from backing store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(PathBuf),
    #[error("io error: {0}")]
    Io(#[from] io::Error),
}

impl StoreError {
    pub fn is_not_found(&self) -> bool {
        matches!(self, StoreError::NotFound(_))
    }
}

/// External byte-level read/write service keyed by path
///
/// Callers guarantee single-flight per path: the store never sees concurrent
/// writes to the same path from this system.
#[async_trait]
pub trait BackingStore: Send + Sync + 'static {
    /// Read the bytes at `path`; `StoreError::NotFound` when absent
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError>;

    /// Replace the bytes at `path`
    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError>;
}

/// Filesystem-backed store
#[derive(Debug, Clone, Default)]
pub struct FsStore;

impl FsStore {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait]
impl BackingStore for FsStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        match tokio::fs::read(path).await {
            Ok(bytes) => {
                trace!(path = %path.display(), bytes = bytes.len(), "read");
                Ok(bytes)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(StoreError::NotFound(path.to_path_buf()))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        tokio::fs::write(path, bytes).await?;
        trace!(path = %path.display(), bytes = bytes.len(), "wrote");
        Ok(())
    }
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;

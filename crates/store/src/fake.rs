// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Fake backing store for tests
//!
//! Keeps files in memory, records every call, and can be scripted to fail
//! reads or writes with a chosen error kind or to hold writes open for a
//! while so tests can interleave mutations with an in-flight flush.

use crate::store::{BackingStore, StoreError};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

#[derive(Default)]
struct FakeStoreInner {
    files: HashMap<PathBuf, Vec<u8>>,
    read_error: Option<io::ErrorKind>,
    write_error: Option<io::ErrorKind>,
    write_delay: Option<Duration>,
    reads: Vec<PathBuf>,
    writes: Vec<(PathBuf, Vec<u8>)>,
}

/// In-memory scriptable backing store
#[derive(Clone, Default)]
pub struct FakeStore {
    inner: Arc<Mutex<FakeStoreInner>>,
}

impl FakeStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, FakeStoreInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Pre-populate a file
    pub fn seed(&self, path: impl Into<PathBuf>, bytes: impl Into<Vec<u8>>) {
        self.lock().files.insert(path.into(), bytes.into());
    }

    /// Make every read fail with `kind` (instead of NotFound/contents)
    pub fn fail_reads_with(&self, kind: io::ErrorKind) {
        self.lock().read_error = Some(kind);
    }

    /// Make every write fail with `kind`
    pub fn fail_writes_with(&self, kind: io::ErrorKind) {
        self.lock().write_error = Some(kind);
    }

    /// Stop failing writes
    pub fn clear_write_failure(&self) {
        self.lock().write_error = None;
    }

    /// Hold each write open for `delay` before completing it
    pub fn set_write_delay(&self, delay: Duration) {
        self.lock().write_delay = Some(delay);
    }

    /// All write attempts so far, in order, with their payloads
    pub fn writes(&self) -> Vec<(PathBuf, Vec<u8>)> {
        self.lock().writes.clone()
    }

    /// Number of write attempts against `path`
    pub fn write_count(&self, path: &Path) -> usize {
        self.lock().writes.iter().filter(|(p, _)| p == path).count()
    }

    /// Paths read so far, in order
    pub fn reads(&self) -> Vec<PathBuf> {
        self.lock().reads.clone()
    }

    /// Current contents of `path`, if any
    pub fn contents(&self, path: &Path) -> Option<Vec<u8>> {
        self.lock().files.get(path).cloned()
    }
}

#[async_trait]
impl BackingStore for FakeStore {
    async fn read(&self, path: &Path) -> Result<Vec<u8>, StoreError> {
        let mut inner = self.lock();
        inner.reads.push(path.to_path_buf());
        if let Some(kind) = inner.read_error {
            return Err(io::Error::from(kind).into());
        }
        match inner.files.get(path) {
            Some(bytes) => Ok(bytes.clone()),
            None => Err(StoreError::NotFound(path.to_path_buf())),
        }
    }

    async fn write(&self, path: &Path, bytes: &[u8]) -> Result<(), StoreError> {
        let delay = self.lock().write_delay;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let mut inner = self.lock();
        inner.writes.push((path.to_path_buf(), bytes.to_vec()));
        if let Some(kind) = inner.write_error {
            return Err(io::Error::from(kind).into());
        }
        inner.files.insert(path.to_path_buf(), bytes.to_vec());
        Ok(())
    }
}

#[cfg(test)]
#[path = "fake_tests.rs"]
mod tests;

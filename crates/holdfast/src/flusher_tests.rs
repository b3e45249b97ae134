// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{create_with, Options, SaveHook};
use holdfast_store::{BackingStore, Codec, FakeStore, JsonCodec, StoreError};
use serde_json::json;
use std::io;
use std::path::Path;
use std::sync::Arc;

async fn hookless_root(store: &FakeStore) -> crate::Persisted {
    let dyn_store: Arc<dyn BackingStore> = Arc::new(store.clone());
    let codec: Arc<dyn Codec> = Arc::new(JsonCodec::new());
    create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap()
}

#[tokio::test]
async fn flush_writes_the_encoded_snapshot() {
    let store = FakeStore::new();
    store.seed("state.json", serde_json::to_vec(&json!({"x": 1})).unwrap());
    let root = hookless_root(&store).await;

    flush(&root.shared).await.unwrap();
    assert_eq!(store.write_count(Path::new("state.json")), 1);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"x": 1})).unwrap()
    );
}

#[tokio::test]
async fn report_success_invokes_hook_with_no_error() {
    let store = FakeStore::new();
    let dyn_store: Arc<dyn BackingStore> = Arc::new(store.clone());
    let codec: Arc<dyn Codec> = Arc::new(JsonCodec::new());
    let (tx, mut rx) = tokio::sync::mpsc::unbounded_channel();
    let hook: SaveHook = Arc::new(move |err, value| {
        let _ = tx.send((err.is_none(), value.to_json()));
    });
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    report(&root.shared, Ok(()));
    let (ok, value) = rx.recv().await.unwrap();
    assert!(ok);
    assert_eq!(value, json!({}));
}

#[tokio::test]
#[should_panic(expected = "unhandled write failure")]
async fn report_failure_without_hook_escalates() {
    let store = FakeStore::new();
    let root = hookless_root(&store).await;
    let err = WriteError::Store(StoreError::Io(io::Error::from(
        io::ErrorKind::PermissionDenied,
    )));
    report(&root.shared, Err(err));
}

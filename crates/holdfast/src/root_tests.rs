// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use crate::{create_with, CreateError, Options, SaveHook};
use holdfast_store::{FakeStore, JsonCodec};
use serde_json::json;
use std::io;
use std::time::Duration;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver};

fn collaborators() -> (FakeStore, Arc<dyn BackingStore>, Arc<dyn Codec>) {
    let store = FakeStore::new();
    let dyn_store: Arc<dyn BackingStore> = Arc::new(store.clone());
    let codec: Arc<dyn Codec> = Arc::new(JsonCodec::new());
    (store, dyn_store, codec)
}

/// Hook that forwards each flush outcome (as an error message, if any)
fn saved_hook() -> (SaveHook, UnboundedReceiver<Option<String>>) {
    let (tx, rx) = unbounded_channel();
    let hook: SaveHook = Arc::new(move |err, _value| {
        let _ = tx.send(err.map(|e| e.to_string()));
    });
    (hook, rx)
}

#[tokio::test]
async fn missing_file_resolves_to_default() {
    let (store, dyn_store, codec) = collaborators();
    let options = Options::new().with_default(json!({"test": 42}));
    let root = create_with(dyn_store, codec, "state.json", options)
        .await
        .unwrap();

    assert_eq!(root.value().to_json(), json!({"test": 42}));
    // Loading never writes.
    assert!(store.writes().is_empty());
    assert!(root.is_idle());
}

#[tokio::test]
async fn missing_file_without_default_resolves_to_empty_object() {
    let (_store, dyn_store, codec) = collaborators();
    let root = create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap();
    assert_eq!(root.value().to_json(), json!({}));
}

#[tokio::test]
async fn existing_file_is_loaded() {
    let (store, dyn_store, codec) = collaborators();
    store.seed("state.json", b"{\"x\":[1,2]}".to_vec());
    let root = create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap();
    assert_eq!(root.value().to_json(), json!({"x": [1, 2]}));
}

#[tokio::test]
async fn read_failure_fails_construction() {
    let (store, dyn_store, codec) = collaborators();
    store.fail_reads_with(io::ErrorKind::PermissionDenied);
    let err = create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::Load(_)));
}

#[tokio::test]
async fn corrupt_bytes_fail_construction() {
    let (store, dyn_store, codec) = collaborators();
    store.seed("state.json", b"{corrupt".to_vec());
    let err = create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::Parse(_)));
}

#[tokio::test]
async fn scalar_persisted_value_is_rejected() {
    let (store, dyn_store, codec) = collaborators();
    store.seed("state.json", b"42".to_vec());
    let err = create_with(dyn_store, codec, "state.json", Options::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::NotAContainer(_)));
}

#[tokio::test]
async fn validation_failure_precedes_io() {
    let (store, dyn_store, codec) = collaborators();
    let err = create_with(dyn_store, codec, "", Options::new())
        .await
        .unwrap_err();
    assert!(matches!(err, CreateError::Validation(_)));
    assert!(store.reads().is_empty());
}

#[tokio::test]
async fn burst_of_mutations_writes_once() {
    let (store, dyn_store, codec) = collaborators();
    let (hook, mut rx) = saved_hook();
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    root.value().set("a", 1).unwrap();
    root.value().set("b", 2).unwrap();
    root.value().remove("a").unwrap();

    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(store.write_count(Path::new("state.json")), 1);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"b": 2})).unwrap()
    );
    assert!(root.is_idle());
}

#[tokio::test(start_paused = true)]
async fn mutation_in_flight_triggers_exactly_one_follow_up() {
    let (store, dyn_store, codec) = collaborators();
    store.set_write_delay(Duration::from_millis(50));
    let (hook, mut rx) = saved_hook();
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    root.value().set("x", 1).unwrap();
    // Let the driver start its write, then mutate mid-flight.
    tokio::time::sleep(Duration::from_millis(1)).await;
    root.value().set("y", 2).unwrap();
    root.value().set("y", 3).unwrap();

    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(store.write_count(Path::new("state.json")), 2);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"x": 1, "y": 3})).unwrap()
    );
    assert!(root.is_idle());
}

#[tokio::test(start_paused = true)]
async fn debounce_waits_for_a_quiet_period() {
    let (store, dyn_store, codec) = collaborators();
    let (hook, mut rx) = saved_hook();
    let options = Options::new()
        .with_delay(Duration::from_millis(100))
        .with_on_saved(hook);
    let root = create_with(dyn_store, codec, "state.json", options)
        .await
        .unwrap();

    root.value().set("a", 1).unwrap();
    tokio::time::advance(Duration::from_millis(50)).await;
    assert_eq!(store.write_count(Path::new("state.json")), 0);

    // A fresh mutation restarts the window.
    root.value().set("b", 2).unwrap();
    tokio::time::advance(Duration::from_millis(99)).await;
    assert_eq!(store.write_count(Path::new("state.json")), 0);

    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(store.write_count(Path::new("state.json")), 1);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"a": 1, "b": 2})).unwrap()
    );
}

#[tokio::test]
async fn failed_write_reports_error_and_root_survives() {
    let (store, dyn_store, codec) = collaborators();
    store.fail_writes_with(io::ErrorKind::PermissionDenied);
    let (hook, mut rx) = saved_hook();
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    root.value().set("x", 1).unwrap();
    let reported = rx.recv().await.unwrap();
    assert!(reported.unwrap().contains("write failed"));

    // The root keeps accepting mutations and scheduling flushes.
    store.clear_write_failure();
    root.value().set("x", 2).unwrap();
    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"x": 2})).unwrap()
    );
}

#[tokio::test]
async fn dropped_handle_completes_pending_flush() {
    let (store, dyn_store, codec) = collaborators();
    let (hook, mut rx) = saved_hook();
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    root.value().set("x", 1).unwrap();
    drop(root);

    assert_eq!(rx.recv().await.unwrap(), None);
    assert_eq!(store.write_count(Path::new("state.json")), 1);
}

#[tokio::test]
async fn mutation_inside_callback_schedules_a_fresh_flush() {
    let (store, dyn_store, codec) = collaborators();
    let (tx, mut rx) = unbounded_channel();
    let hook: SaveHook = Arc::new(move |err, value| {
        assert!(err.is_none());
        if !value.contains_key("from_hook") {
            value.set("from_hook", true).unwrap();
        }
        let _ = tx.send(());
    });
    let root = create_with(
        dyn_store,
        codec,
        "state.json",
        Options::new().with_on_saved(hook),
    )
    .await
    .unwrap();

    root.value().set("x", 1).unwrap();
    rx.recv().await.unwrap();
    rx.recv().await.unwrap();

    assert_eq!(store.write_count(Path::new("state.json")), 2);
    assert_eq!(
        store.contents(Path::new("state.json")).unwrap(),
        serde_json::to_vec(&json!({"from_hook": true, "x": 1})).unwrap()
    );
}

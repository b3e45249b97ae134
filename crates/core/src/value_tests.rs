// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

use super::*;
use serde_json::json;

#[test]
fn json_conversion_preserves_structure() {
    let json = json!({
        "string": "text",
        "number": 42,
        "float": 1.5,
        "bool": true,
        "null": null,
        "nested": {"array": [1, [2], {"three": 3}]}
    });
    assert_eq!(Value::from_json(&json).to_json(), json);
}

#[test]
fn from_json_deep_owns_containers() {
    let json = json!({"inner": {"x": 1}});
    let a = Value::from_json(&json);
    let b = Value::from_json(&json);
    let node_a = a.as_container().unwrap();
    let node_b = b.as_container().unwrap();
    assert!(!node_a.ptr_eq(node_b));

    node_a.set_raw("y".to_string(), Value::from(2));
    assert_eq!(node_b.to_json(), json);
}

#[test]
fn scalar_conversions() {
    assert!(matches!(Value::from(true), Value::Bool(true)));
    assert!(matches!(Value::from("s"), Value::String(_)));
    assert_eq!(Value::from(42i64).to_json(), json!(42));
    assert_eq!(Value::from(1.5).to_json(), json!(1.5));
    // Non-finite floats degrade to null, like serde_json.
    assert!(matches!(Value::from(f64::NAN), Value::Null));
}

#[test]
fn container_conversion_shares_the_node() {
    let node = crate::node::Node::object();
    let value = Value::from(&node);
    assert!(value.as_container().unwrap().ptr_eq(&node));
}

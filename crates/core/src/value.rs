// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! The JSON-like value model for persisted graphs
//!
//! Scalars are plain data; containers are shared [`Node`] handles so that a
//! single container can live inside several persisted roots at once.

use crate::node::Node;
use serde_json::Number;

/// A value stored inside a persisted graph
#[derive(Debug, Clone)]
pub enum Value {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    /// An object or array container, held by handle
    Container(Node),
}

impl Value {
    /// Returns the container handle, if this value is one
    pub fn as_container(&self) -> Option<&Node> {
        match self {
            Value::Container(node) => Some(node),
            _ => None,
        }
    }

    pub fn is_container(&self) -> bool {
        matches!(self, Value::Container(_))
    }

    /// Build a value graph from plain JSON
    ///
    /// Containers become fresh, untagged, unfrozen nodes, so the result is
    /// deep-owned and independent of any other graph.
    pub fn from_json(json: &serde_json::Value) -> Value {
        match json {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::Bool(b) => Value::Bool(*b),
            serde_json::Value::Number(n) => Value::Number(n.clone()),
            serde_json::Value::String(s) => Value::String(s.clone()),
            serde_json::Value::Array(items) => {
                let node = Node::array();
                for item in items {
                    node.push_raw(Value::from_json(item));
                }
                Value::Container(node)
            }
            serde_json::Value::Object(map) => {
                let node = Node::object();
                for (key, item) in map {
                    node.set_raw(key.clone(), Value::from_json(item));
                }
                Value::Container(node)
            }
        }
    }

    /// Snapshot this value as plain JSON, deep-copying containers
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            Value::Null => serde_json::Value::Null,
            Value::Bool(b) => serde_json::Value::Bool(*b),
            Value::Number(n) => serde_json::Value::Number(n.clone()),
            Value::String(s) => serde_json::Value::String(s.clone()),
            Value::Container(node) => node.to_json(),
        }
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<u64> for Value {
    fn from(n: u64) -> Self {
        Value::Number(Number::from(n))
    }
}

impl From<f64> for Value {
    /// Non-finite floats map to `Null`, matching serde_json
    fn from(n: f64) -> Self {
        Number::from_f64(n).map_or(Value::Null, Value::Number)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<Node> for Value {
    fn from(node: Node) -> Self {
        Value::Container(node)
    }
}

impl From<&Node> for Value {
    fn from(node: &Node) -> Self {
        Value::Container(node.clone())
    }
}

#[cfg(test)]
#[path = "value_tests.rs"]
mod tests;

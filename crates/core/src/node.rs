// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! Observable container nodes
//!
//! A [`Node`] is a shared handle to an object or array container. Every
//! mutation goes through the handle, which applies the change to the
//! underlying storage and signals each root the container belongs to. This
//! replaces ambient syntactic interception with an explicit API while keeping
//! the same triggering semantics: callers never use a different surface for
//! tracked vs. untracked containers.
//!
//! Membership in a root is recorded by tags. A tag pairs a weak reference to
//! the root's dirty sink with the node's nest level below that root, so one
//! container shared by several roots carries one tag per owner and dirties
//! all of them independently.

use crate::error::ContractViolation;
use crate::value::Value;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard, Weak};

/// Receiver for dirty signals, implemented by each persisted root
pub trait DirtySink: Send + Sync {
    /// Depth bound for instrumentation below this root (0 = unlimited)
    fn depth(&self) -> u32;

    /// Record that the root's value graph changed and needs persisting
    fn mark_dirty(self: Arc<Self>);
}

/// Container kind of a node
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
}

/// Membership tag: this node is managed for `sink` at `level`
struct Tag {
    sink: Weak<dyn DirtySink>,
    level: u32,
}

/// A live tag with the sink upgraded for the duration of one mutation
struct LiveTag {
    sink: Arc<dyn DirtySink>,
    level: u32,
}

enum Container {
    Object(BTreeMap<String, Value>),
    Array(Vec<Value>),
}

struct NodeInner {
    container: Container,
    tags: Vec<Tag>,
    frozen: bool,
}

impl NodeInner {
    fn kind(&self) -> NodeKind {
        match self.container {
            Container::Object(_) => NodeKind::Object,
            Container::Array(_) => NodeKind::Array,
        }
    }

    fn children(&self) -> Vec<Value> {
        match &self.container {
            Container::Object(map) => map.values().cloned().collect(),
            Container::Array(items) => items.clone(),
        }
    }
}

/// Shared handle to a container
#[derive(Clone)]
pub struct Node {
    inner: Arc<Mutex<NodeInner>>,
}

// Pointer comparison on trait objects must ignore vtable identity, which can
// differ across codegen units for the same concrete type.
fn sink_addr(ptr: *const dyn DirtySink) -> *const () {
    ptr as *const ()
}

impl Node {
    fn new(container: Container) -> Self {
        Self {
            inner: Arc::new(Mutex::new(NodeInner {
                container,
                tags: Vec::new(),
                frozen: false,
            })),
        }
    }

    /// Create an empty object container
    pub fn object() -> Self {
        Self::new(Container::Object(BTreeMap::new()))
    }

    /// Create an empty array container
    pub fn array() -> Self {
        Self::new(Container::Array(Vec::new()))
    }

    /// Build a fresh container graph from plain JSON
    ///
    /// Fails if `json` is not an object or array.
    pub fn from_json(json: &serde_json::Value) -> Option<Node> {
        match Value::from_json(json) {
            Value::Container(node) => Some(node),
            _ => None,
        }
    }

    fn lock(&self) -> MutexGuard<'_, NodeInner> {
        self.inner.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Two handles refer to the same container
    pub fn ptr_eq(&self, other: &Node) -> bool {
        Arc::ptr_eq(&self.inner, &other.inner)
    }

    pub fn kind(&self) -> NodeKind {
        self.lock().kind()
    }

    /// Mark this container as closed to instrumentation and mutation
    ///
    /// Adopting a frozen container into a managed graph, or mutating one,
    /// is a [`ContractViolation`] at the offending call site.
    pub fn freeze(&self) {
        self.lock().frozen = true;
    }

    pub fn is_frozen(&self) -> bool {
        self.lock().frozen
    }

    /// Number of members
    pub fn len(&self) -> usize {
        match &self.lock().container {
            Container::Object(map) => map.len(),
            Container::Array(items) => items.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    // ------------------------------------------------------------------
    // Reads (never signal)
    // ------------------------------------------------------------------

    /// Get an object member
    pub fn get(&self, key: &str) -> Option<Value> {
        match &self.lock().container {
            Container::Object(map) => map.get(key).cloned(),
            Container::Array(_) => None,
        }
    }

    /// Get an array member
    pub fn get_index(&self, index: usize) -> Option<Value> {
        match &self.lock().container {
            Container::Array(items) => items.get(index).cloned(),
            Container::Object(_) => None,
        }
    }

    pub fn contains_key(&self, key: &str) -> bool {
        match &self.lock().container {
            Container::Object(map) => map.contains_key(key),
            Container::Array(_) => false,
        }
    }

    /// Object keys, in map order
    pub fn keys(&self) -> Vec<String> {
        match &self.lock().container {
            Container::Object(map) => map.keys().cloned().collect(),
            Container::Array(_) => Vec::new(),
        }
    }

    /// Object entries as (key, value) pairs
    pub fn entries(&self) -> Vec<(String, Value)> {
        match &self.lock().container {
            Container::Object(map) => map.iter().map(|(k, v)| (k.clone(), v.clone())).collect(),
            Container::Array(_) => Vec::new(),
        }
    }

    /// Array members, in order
    pub fn items(&self) -> Vec<Value> {
        match &self.lock().container {
            Container::Array(items) => items.clone(),
            Container::Object(_) => Vec::new(),
        }
    }

    /// Snapshot as plain JSON, deep-copying the graph
    pub fn to_json(&self) -> serde_json::Value {
        match &self.lock().container {
            Container::Object(map) => serde_json::Value::Object(
                map.iter().map(|(k, v)| (k.clone(), v.to_json())).collect(),
            ),
            Container::Array(items) => {
                serde_json::Value::Array(items.iter().map(Value::to_json).collect())
            }
        }
    }

    // ------------------------------------------------------------------
    // Object mutations
    // ------------------------------------------------------------------

    /// Set an object member, replacing any existing value
    pub fn set(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ContractViolation> {
        let key = key.into();
        let value = value.into();
        self.mutate(NodeKind::Object, Some(&value), |_| Ok(()), |container| {
            if let Container::Object(map) = container {
                map.insert(key, value.clone());
            }
            Ok(())
        })
    }

    /// Attach an object member explicitly
    ///
    /// Equivalent to [`Node::set`]; kept as a distinct operation because
    /// attachment and plain assignment are separate mutation surfaces.
    pub fn define(&self, key: impl Into<String>, value: impl Into<Value>) -> Result<(), ContractViolation> {
        self.set(key, value)
    }

    /// Remove an object member, returning it if present
    pub fn remove(&self, key: &str) -> Result<Option<Value>, ContractViolation> {
        self.mutate(NodeKind::Object, None, |_| Ok(()), |container| {
            match container {
                Container::Object(map) => Ok(map.remove(key)),
                Container::Array(_) => Err(ContractViolation::NotAnObject),
            }
        })
    }

    // ------------------------------------------------------------------
    // Array mutations
    // ------------------------------------------------------------------

    /// Replace the member at `index`
    pub fn set_index(&self, index: usize, value: impl Into<Value>) -> Result<(), ContractViolation> {
        let value = value.into();
        self.mutate(
            NodeKind::Array,
            Some(&value),
            |container| index_check(container, index, false),
            |container| {
                index_check(container, index, false)?;
                if let Container::Array(items) = container {
                    if let Some(slot) = items.get_mut(index) {
                        *slot = value.clone();
                    }
                }
                Ok(())
            },
        )
    }

    /// Insert a member at `index`, shifting the tail
    pub fn insert(&self, index: usize, value: impl Into<Value>) -> Result<(), ContractViolation> {
        let value = value.into();
        self.mutate(
            NodeKind::Array,
            Some(&value),
            |container| index_check(container, index, true),
            |container| {
                index_check(container, index, true)?;
                if let Container::Array(items) = container {
                    items.insert(index, value.clone());
                }
                Ok(())
            },
        )
    }

    /// Append a member
    pub fn push(&self, value: impl Into<Value>) -> Result<(), ContractViolation> {
        let value = value.into();
        self.mutate(NodeKind::Array, Some(&value), |_| Ok(()), |container| {
            if let Container::Array(items) = container {
                items.push(value.clone());
            }
            Ok(())
        })
    }

    /// Remove and return the last member
    pub fn pop(&self) -> Result<Option<Value>, ContractViolation> {
        self.mutate(NodeKind::Array, None, |_| Ok(()), |container| {
            match container {
                Container::Array(items) => Ok(items.pop()),
                Container::Object(_) => Err(ContractViolation::NotAnArray),
            }
        })
    }

    /// Remove and return the member at `index`, shifting the tail
    pub fn remove_index(&self, index: usize) -> Result<Value, ContractViolation> {
        self.mutate(NodeKind::Array, None, |_| Ok(()), |container| {
            match container {
                Container::Array(items) => {
                    let len = items.len();
                    if index < len {
                        Ok(items.remove(index))
                    } else {
                        Err(ContractViolation::IndexOutOfBounds { index, len })
                    }
                }
                Container::Object(_) => Err(ContractViolation::NotAnArray),
            }
        })
    }

    /// Shorten the array to `len` members
    pub fn truncate(&self, len: usize) -> Result<(), ContractViolation> {
        self.mutate(NodeKind::Array, None, |_| Ok(()), |container| {
            if let Container::Array(items) = container {
                items.truncate(len);
            }
            Ok(())
        })
    }

    /// Grow or shrink the array to `len`, filling new slots with null
    pub fn resize(&self, len: usize) -> Result<(), ContractViolation> {
        self.mutate(NodeKind::Array, None, |_| Ok(()), |container| {
            if let Container::Array(items) = container {
                items.resize(len, Value::Null);
            }
            Ok(())
        })
    }

    /// Remove all members
    pub fn clear(&self) -> Result<(), ContractViolation> {
        self.mutate(NodeKind::Array, None, |_| Ok(()), |container| {
            if let Container::Array(items) = container {
                items.clear();
            }
            Ok(())
        })
    }

    // ------------------------------------------------------------------
    // Raw writes, used while building fresh graphs (no tags, no signals)
    // ------------------------------------------------------------------

    pub(crate) fn set_raw(&self, key: String, value: Value) {
        if let Container::Object(map) = &mut self.lock().container {
            map.insert(key, value);
        }
    }

    pub(crate) fn push_raw(&self, value: Value) {
        if let Container::Array(items) = &mut self.lock().container {
            items.push(value);
        }
    }

    // ------------------------------------------------------------------
    // Interception plumbing
    // ------------------------------------------------------------------

    /// One intercepted mutation: verify the container accepts it, wrap any
    /// incoming value for every owning root, apply, then signal each owner
    /// exactly once. `check` runs under the same lock that collects the tags,
    /// before any wrapping, so a rejected mutation leaves no trace on the
    /// incoming value. The node lock is never held across wrapping or
    /// signaling, so locks are only ever taken parent-before-child; `apply`
    /// re-validates under its own lock acquisition.
    fn mutate<T, C, F>(
        &self,
        kind: NodeKind,
        incoming: Option<&Value>,
        check: C,
        apply: F,
    ) -> Result<T, ContractViolation>
    where
        C: FnOnce(&Container) -> Result<(), ContractViolation>,
        F: FnOnce(&mut Container) -> Result<T, ContractViolation>,
    {
        let tags = self.live_tags(kind, check)?;

        if let Some(value) = incoming {
            // A wrapping failure aborts the mutation before anything is stored.
            for tag in &tags {
                wrap(&tag.sink, tag.level + 1, value)?;
            }
        }

        let out = apply(&mut self.lock().container)?;

        for sink in dedup_sinks(tags) {
            sink.mark_dirty();
        }
        Ok(out)
    }

    /// Check mutability, kind, and the operation's own preconditions, then
    /// prune dead tags and upgrade the rest
    fn live_tags<C>(&self, kind: NodeKind, check: C) -> Result<Vec<LiveTag>, ContractViolation>
    where
        C: FnOnce(&Container) -> Result<(), ContractViolation>,
    {
        let mut inner = self.lock();
        if inner.frozen {
            return Err(ContractViolation::Frozen);
        }
        if inner.kind() != kind {
            return Err(match kind {
                NodeKind::Object => ContractViolation::NotAnObject,
                NodeKind::Array => ContractViolation::NotAnArray,
            });
        }
        check(&inner.container)?;
        inner.tags.retain(|tag| tag.sink.strong_count() > 0);
        Ok(inner
            .tags
            .iter()
            .filter_map(|tag| {
                tag.sink.upgrade().map(|sink| LiveTag {
                    sink,
                    level: tag.level,
                })
            })
            .collect())
    }

    /// Instrument this container for `sink` at nest level `nest`
    fn wrap_container(&self, sink: &Arc<dyn DirtySink>, nest: u32) -> Result<(), ContractViolation> {
        let children = {
            let inner = self.lock();
            if inner.frozen {
                return Err(ContractViolation::Frozen);
            }
            if inner
                .tags
                .iter()
                .any(|tag| tag.level <= nest && sink_addr(tag.sink.as_ptr()) == sink_addr(Arc::as_ptr(sink)))
            {
                // Already managed for this root at this level or shallower.
                // Keying on the shallowest level also terminates cyclic graphs.
                return Ok(());
            }
            inner.children()
        };

        // Bottom-up: descendants are instrumented before the parent is tagged.
        // These writes never signal; only caller mutations do.
        for child in &children {
            wrap(sink, nest + 1, child)?;
        }

        let mut inner = self.lock();
        if !inner
            .tags
            .iter()
            .any(|tag| tag.level <= nest && sink_addr(tag.sink.as_ptr()) == sink_addr(Arc::as_ptr(sink)))
        {
            inner.tags.push(Tag {
                sink: Arc::downgrade(sink),
                level: nest,
            });
        }
        Ok(())
    }

    #[cfg(test)]
    pub(crate) fn tag_count(&self) -> usize {
        self.lock().tags.len()
    }
}

impl std::fmt::Debug for Node {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "Node({})", self.to_json())
    }
}

/// Instrument `value` for `sink` at nest level `nest`
///
/// Scalars pass through untouched. Containers beyond the sink's depth bound
/// are stored verbatim: their internal mutations stay invisible. Everything
/// else is tagged recursively, children first, and the call is idempotent
/// per (sink, nest) pair.
pub fn wrap(sink: &Arc<dyn DirtySink>, nest: u32, value: &Value) -> Result<(), ContractViolation> {
    let Value::Container(node) = value else {
        return Ok(());
    };
    let depth = sink.depth();
    if depth > 0 && nest > depth {
        return Ok(());
    }
    node.wrap_container(sink, nest)
}

/// Bounds precondition for index-addressed array operations; `inserting`
/// admits the one-past-the-end position
fn index_check(container: &Container, index: usize, inserting: bool) -> Result<(), ContractViolation> {
    if let Container::Array(items) = container {
        let len = items.len();
        let in_bounds = if inserting { index <= len } else { index < len };
        if !in_bounds {
            return Err(ContractViolation::IndexOutOfBounds { index, len });
        }
    }
    Ok(())
}

fn dedup_sinks(tags: Vec<LiveTag>) -> Vec<Arc<dyn DirtySink>> {
    let mut sinks: Vec<Arc<dyn DirtySink>> = Vec::with_capacity(tags.len());
    for tag in tags {
        let addr = sink_addr(Arc::as_ptr(&tag.sink));
        if !sinks.iter().any(|s| sink_addr(Arc::as_ptr(s)) == addr) {
            sinks.push(tag.sink);
        }
    }
    sinks
}

#[cfg(test)]
#[path = "node_tests.rs"]
mod tests;

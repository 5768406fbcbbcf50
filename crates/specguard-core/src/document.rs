//! Document model shared by the resolver, keyword engine and walker
//!
//! A [`Document`] is an immutable tree plus the origin it was loaded from.
//! Nodes are addressed by `(origin, pointer)` pairs through [`Resolved`]
//! handles, so no part of a document is ever copied or rewritten while it is
//! being validated.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::resolver::pointer;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use url::Url;

/// Origin assigned to documents validated without an explicit location
pub const INLINE_ORIGIN: &str = "specguard://inline/openapi.json";

/// Deepest nesting of mappings and sequences a document may have
pub const MAX_NESTING_DEPTH: usize = 256;

/// Levels of nested mappings and sequences in `value`; a scalar has none
pub fn nesting_depth(value: &Value) -> usize {
    let mut deepest = 0;
    let mut pending = vec![(value, 0)];
    while let Some((node, depth)) = pending.pop() {
        match node {
            Value::Array(items) => pending.extend(items.iter().map(|item| (item, depth + 1))),
            Value::Object(map) => pending.extend(map.values().map(|item| (item, depth + 1))),
            _ => continue,
        }
        deepest = deepest.max(depth + 1);
    }
    deepest
}

/// A loaded document and the origin it was loaded from
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    origin: Url,
    root: Value,
}

impl Document {
    /// Create a document; any fragment on `origin` is dropped
    pub fn new(mut origin: Url, root: Value) -> Self {
        origin.set_fragment(None);
        Self { origin, root }
    }

    /// Create a document with the synthetic inline origin
    pub fn inline(root: Value) -> Self {
        Self::new(inline_origin(), root)
    }

    pub fn origin(&self) -> &Url {
        &self.origin
    }

    pub fn root(&self) -> &Value {
        &self.root
    }
}

/// The synthetic origin used for in-memory documents
pub fn inline_origin() -> Url {
    Url::parse(INLINE_ORIGIN).expect("inline origin is a valid URL")
}

/// One step of a location path: a mapping key or a sequence index
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PathSegment {
    Index(usize),
    Key(String),
}

impl PathSegment {
    pub fn as_key(&self) -> Option<&str> {
        match self {
            PathSegment::Key(key) => Some(key),
            PathSegment::Index(_) => None,
        }
    }
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PathSegment::Index(index) => write!(f, "{}", index),
            PathSegment::Key(key) => f.write_str(key),
        }
    }
}

impl From<&str> for PathSegment {
    fn from(key: &str) -> Self {
        PathSegment::Key(key.to_string())
    }
}

impl From<String> for PathSegment {
    fn from(key: String) -> Self {
        PathSegment::Key(key)
    }
}

impl From<&String> for PathSegment {
    fn from(key: &String) -> Self {
        PathSegment::Key(key.clone())
    }
}

impl From<usize> for PathSegment {
    fn from(index: usize) -> Self {
        PathSegment::Index(index)
    }
}

/// Append one segment to a path, returning the extended copy
pub fn child_path(path: &[PathSegment], segment: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut extended = Vec::with_capacity(path.len() + 1);
    extended.extend_from_slice(path);
    extended.push(segment.into());
    extended
}

/// Identity of a node across documents: origin without fragment plus pointer
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RefKey {
    pub origin: Url,
    pub pointer: String,
}

impl fmt::Display for RefKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}#{}", self.origin, self.pointer)
    }
}

/// Handle to a node inside a shared document
#[derive(Debug, Clone)]
pub struct Resolved {
    document: Arc<Document>,
    pointer: String,
}

static MISSING: Value = Value::Null;

impl Resolved {
    pub fn new(document: Arc<Document>, pointer: impl Into<String>) -> Self {
        Self {
            document,
            pointer: pointer.into(),
        }
    }

    /// Handle to the root node of a document
    pub fn root(document: Arc<Document>) -> Self {
        Self::new(document, String::new())
    }

    pub fn document(&self) -> &Arc<Document> {
        &self.document
    }

    pub fn origin(&self) -> &Url {
        self.document.origin()
    }

    pub fn pointer(&self) -> &str {
        &self.pointer
    }

    /// The addressed node, or `null` when the pointer no longer matches
    pub fn node(&self) -> &Value {
        pointer::walk(self.document.root(), &self.pointer).unwrap_or(&MISSING)
    }

    /// Handle to a child of this node; the child need not exist
    pub fn child(&self, segment: impl Into<PathSegment>) -> Resolved {
        Resolved {
            document: Arc::clone(&self.document),
            pointer: pointer::join(&self.pointer, &segment.into()),
        }
    }

    /// Handle to a child that exists
    pub fn get(&self, key: &str) -> Option<Resolved> {
        self.node().get(key).map(|_| self.child(key))
    }

    pub fn key(&self) -> RefKey {
        RefKey {
            origin: self.document.origin().clone(),
            pointer: self.pointer.clone(),
        }
    }
}

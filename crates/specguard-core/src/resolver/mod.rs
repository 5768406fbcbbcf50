//! Reference resolution
//!
//! This module handles:
//! - `$ref` resolution within a document and across documents
//! - Document arena and per-run resolution cache
//! - Circular reference detection
//!
//! Documents are never rewritten. A resolved reference is a [`Resolved`]
//! handle into the target document, and everything learned during a run lives
//! in the [`ResolutionContext`] side table.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod error;
pub mod pointer;

pub use error::ResolveError;

use crate::document::{nesting_depth, Document, RefKey, Resolved, MAX_NESTING_DEPTH};
use crate::loader::DocumentProvider;
use percent_encoding::percent_decode_str;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{debug, trace};
use url::Url;

/// Default bound on the length of a reference chain
pub const DEFAULT_MAX_DEPTH: usize = 64;

/// The `$ref` target of a node, when the node is a reference
pub fn reference_of(node: &Value) -> Option<&str> {
    node.as_object()?.get("$ref")?.as_str()
}

/// Outcome of resolving a node
#[derive(Debug, Clone)]
pub struct Resolution {
    /// The first non-reference node reached
    pub target: Resolved,
    /// Every `(origin, pointer)` passed through, in order; empty for plain nodes
    pub chain: Vec<RefKey>,
}

/// Per-run resolution state
pub struct ResolutionContext<'p> {
    provider: &'p dyn DocumentProvider,
    documents: HashMap<Url, Arc<Document>>,
    failed: HashMap<Url, String>,
    cache: HashMap<RefKey, Resolved>,
    max_depth: usize,
}

impl<'p> ResolutionContext<'p> {
    pub fn new(provider: &'p dyn DocumentProvider) -> Self {
        Self {
            provider,
            documents: HashMap::new(),
            failed: HashMap::new(),
            cache: HashMap::new(),
            max_depth: DEFAULT_MAX_DEPTH,
        }
    }

    /// Bound the number of hops a single reference chain may take
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth.max(1);
        self
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Make a document available without asking the provider
    pub fn register(&mut self, document: Arc<Document>) {
        self.documents.insert(document.origin().clone(), document);
    }

    /// Document loaded under `origin` during this run, if any
    pub fn document(&self, origin: &Url) -> Option<&Arc<Document>> {
        self.documents.get(origin)
    }

    /// Number of documents loaded or registered so far
    pub fn document_count(&self) -> usize {
        self.documents.len()
    }

    /// Number of memoized reference targets
    pub fn cached(&self) -> usize {
        self.cache.len()
    }

    /// Resolve `at`: plain nodes come back unchanged, references are followed
    /// until a non-reference node is reached
    pub fn resolve(&mut self, at: &Resolved) -> Result<Resolution, ResolveError> {
        match reference_of(at.node()) {
            Some(reference) => {
                let reference = reference.to_string();
                self.resolve_reference(at, &reference)
            }
            None => Ok(Resolution {
                target: at.clone(),
                chain: Vec::new(),
            }),
        }
    }

    /// Resolve a reference string relative to the document holding `base`
    pub fn resolve_reference(
        &mut self,
        base: &Resolved,
        reference: &str,
    ) -> Result<Resolution, ResolveError> {
        let mut chain: Vec<RefKey> = Vec::new();
        let mut current_base = base.clone();
        let mut current = reference.to_string();

        loop {
            let key = locate(current_base.origin(), &current)?;

            if chain.contains(&key) {
                chain.push(key);
                return Err(ResolveError::circular(reference, chain));
            }
            if chain.len() >= self.max_depth {
                return Err(ResolveError::unresolvable(
                    reference,
                    format!("reference chain exceeds maximum depth of {}", self.max_depth),
                ));
            }

            if let Some(hit) = self.cache.get(&key) {
                trace!(target_key = %key, "reference cache hit");
                let target = hit.clone();
                chain.push(key);
                self.memoize(&chain, &target);
                return Ok(Resolution { target, chain });
            }

            let target = self.target(&current_base, &key, reference)?;
            chain.push(key);

            match reference_of(target.node()).map(str::to_owned) {
                Some(next) => {
                    current = next;
                    current_base = target;
                }
                None => {
                    self.memoize(&chain, &target);
                    return Ok(Resolution { target, chain });
                }
            }
        }
    }

    /// Follow a single `$ref` hop; a reference found at the target is left alone
    pub fn resolve_step(&mut self, base: &Resolved, reference: &str) -> Result<Resolved, ResolveError> {
        let key = locate(base.origin(), reference)?;
        self.target(base, &key, reference)
    }

    fn target(&mut self, base: &Resolved, key: &RefKey, reference: &str) -> Result<Resolved, ResolveError> {
        let document = if &key.origin == base.origin() {
            Arc::clone(base.document())
        } else {
            self.load(&key.origin, reference)?
        };
        pointer::walk(document.root(), &key.pointer)
            .map_err(|e| ResolveError::unresolvable(reference, e.to_string()))?;
        Ok(Resolved::new(document, key.pointer.clone()))
    }

    fn memoize(&mut self, chain: &[RefKey], target: &Resolved) {
        for key in chain {
            self.cache.insert(key.clone(), target.clone());
        }
    }

    fn load(&mut self, origin: &Url, reference: &str) -> Result<Arc<Document>, ResolveError> {
        if let Some(document) = self.documents.get(origin) {
            return Ok(Arc::clone(document));
        }
        if let Some(reason) = self.failed.get(origin) {
            return Err(ResolveError::unresolvable(reference, reason.clone()));
        }

        debug!(origin = %origin, "fetching referenced document");
        let fetched = self.provider.fetch(origin).map_err(|error| error.to_string()).and_then(|root| {
            let depth = nesting_depth(&root);
            if depth > MAX_NESTING_DEPTH {
                return Err(format!(
                    "document '{}' nests {} levels deep; at most {} are supported",
                    origin, depth, MAX_NESTING_DEPTH
                ));
            }
            Ok(root)
        });
        match fetched {
            Ok(root) => {
                let document = Arc::new(Document::new(origin.clone(), root));
                self.documents.insert(origin.clone(), Arc::clone(&document));
                Ok(document)
            }
            Err(reason) => {
                debug!(origin = %origin, reason = %reason, "document fetch failed");
                self.failed.insert(origin.clone(), reason.clone());
                Err(ResolveError::unresolvable(reference, reason))
            }
        }
    }
}

/// Split a reference into the target document origin and a decoded pointer
fn locate(base: &Url, reference: &str) -> Result<RefKey, ResolveError> {
    let mut target = base.join(reference).map_err(|e| {
        ResolveError::unresolvable(reference, format!("cannot be resolved against '{}': {}", base, e))
    })?;

    let pointer = match target.fragment() {
        None => String::new(),
        Some(fragment) => percent_decode_str(fragment)
            .decode_utf8()
            .map_err(|e| ResolveError::unresolvable(reference, format!("invalid fragment: {}", e)))?
            .into_owned(),
    };
    if !pointer.is_empty() && !pointer.starts_with('/') {
        return Err(ResolveError::unresolvable(
            reference,
            format!("plain-name fragment '{}' is not supported", pointer),
        ));
    }

    target.set_fragment(None);
    Ok(RefKey {
        origin: target,
        pointer,
    })
}

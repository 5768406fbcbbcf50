//! Reference resolution errors
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::document::RefKey;
use thiserror::Error;

/// Why a `$ref` could not be turned into a node
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    /// Missing document or pointer target, malformed reference, fetch failure
    #[error("Unresolvable reference '{reference}': {reason}")]
    Unresolvable { reference: String, reason: String },

    /// The reference chain revisits a location it already passed through
    #[error("Circular reference '{reference}': {}", render_chain(.chain))]
    Circular {
        reference: String,
        chain: Vec<RefKey>,
    },
}

fn render_chain(chain: &[RefKey]) -> String {
    chain
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" -> ")
}

impl ResolveError {
    pub fn unresolvable(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Unresolvable {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    pub fn circular(reference: impl Into<String>, chain: Vec<RefKey>) -> Self {
        Self::Circular {
            reference: reference.into(),
            chain,
        }
    }

    pub fn reference(&self) -> &str {
        match self {
            Self::Unresolvable { reference, .. } | Self::Circular { reference, .. } => reference,
        }
    }

    /// The underlying fetch, parse or pointer failure of an unresolvable reference
    pub fn reason(&self) -> Option<&str> {
        match self {
            Self::Unresolvable { reason, .. } => Some(reason),
            Self::Circular { .. } => None,
        }
    }

    pub fn is_circular(&self) -> bool {
        matches!(self, Self::Circular { .. })
    }
}

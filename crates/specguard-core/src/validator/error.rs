//! Validation error types and the error aggregate
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::document::PathSegment;
use crate::loader::{LoaderError, ProviderError};
use crate::resolver::{pointer, ResolveError};
use crate::versioning::VersionDetectionError;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fmt;
use thiserror::Error;

/// What produced a [`ValidationError`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// A meta-schema or schema keyword
    #[default]
    Keyword,
    /// A semantic rule, by id
    Rule(String),
    UnresolvableReference,
    CircularReference,
    /// A condition that stops traversal altogether
    Fatal,
}

/// A single violation with its document location
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub struct ValidationError {
    /// Human-readable error message
    pub message: String,
    /// Location in the validated document, from its root
    pub path: Vec<PathSegment>,
    /// Location in the schema or rule set that produced the error
    pub schema_path: Vec<PathSegment>,
    #[serde(skip)]
    pub kind: ErrorKind,
    /// Underlying error, when this one wraps another
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cause: Option<Box<ValidationError>>,
    /// Per-branch errors of a failed composition keyword
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub context: Vec<ValidationError>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Validation error at '#{}': {}", self.pointer(), self.message)
    }
}

impl ValidationError {
    /// Create a new keyword error
    pub fn new<M>(message: M, path: Vec<PathSegment>, schema_path: Vec<PathSegment>) -> Self
    where
        M: Into<String>,
    {
        Self {
            message: message.into(),
            path,
            schema_path,
            kind: ErrorKind::Keyword,
            cause: None,
            context: Vec::new(),
        }
    }

    /// Create an error raised by a semantic rule; the rule id leads the schema path
    pub fn rule<M>(id: &str, message: M, path: Vec<PathSegment>, detail: &[&str]) -> Self
    where
        M: Into<String>,
    {
        let mut schema_path = Vec::with_capacity(detail.len() + 1);
        schema_path.push(PathSegment::from(id));
        schema_path.extend(detail.iter().map(|segment| PathSegment::from(*segment)));
        Self::new(message, path, schema_path).with_kind(ErrorKind::Rule(id.to_string()))
    }

    /// Record a failed `$ref` at the referencing location
    ///
    /// An unresolvable reference keeps the fetch, parse or pointer failure
    /// as its cause.
    pub fn reference(error: &ResolveError, path: Vec<PathSegment>, mut schema_path: Vec<PathSegment>) -> Self {
        schema_path.push(PathSegment::from("$ref"));
        match error.reason() {
            Some(reason) => {
                let cause = Self::new(reason, path.clone(), schema_path.clone());
                Self::new(error.to_string(), path, schema_path)
                    .with_kind(ErrorKind::UnresolvableReference)
                    .with_cause(cause)
            }
            None => Self::new(error.to_string(), path, schema_path).with_kind(ErrorKind::CircularReference),
        }
    }

    /// A condition that prevents traversal of the document
    pub fn fatal<M: Into<String>>(message: M) -> Self {
        Self::new(message, Vec::new(), Vec::new()).with_kind(ErrorKind::Fatal)
    }

    pub fn with_kind(mut self, kind: ErrorKind) -> Self {
        self.kind = kind;
        self
    }

    pub fn with_cause(mut self, cause: ValidationError) -> Self {
        self.cause = Some(Box::new(cause));
        self
    }

    pub fn with_context(mut self, context: Vec<ValidationError>) -> Self {
        self.context = context;
        self
    }

    /// The document location rendered as a JSON pointer
    pub fn pointer(&self) -> String {
        pointer::from_path(&self.path)
    }

    /// The schema location rendered as a JSON pointer
    pub fn schema_pointer(&self) -> String {
        pointer::from_path(&self.schema_path)
    }

    /// Id of the semantic rule that raised this error, if any
    pub fn rule_id(&self) -> Option<&str> {
        match &self.kind {
            ErrorKind::Rule(id) => Some(id),
            _ => None,
        }
    }
}

/// Ordered, de-duplicated collection of errors gathered during one run
#[derive(Debug, Default)]
pub struct ErrorAggregate {
    errors: Vec<ValidationError>,
    seen: HashSet<(Vec<PathSegment>, Vec<PathSegment>, String)>,
}

impl ErrorAggregate {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an error; returns false when an identical one was already recorded
    pub fn push(&mut self, error: ValidationError) -> bool {
        let key = (error.path.clone(), error.schema_path.clone(), error.message.clone());
        if !self.seen.insert(key) {
            return false;
        }
        self.errors.push(error);
        true
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }

    /// Convert to result - Ok if no errors, Err if any errors exist
    pub fn into_result(self) -> Result<(), AggregateValidationError> {
        if self.is_empty() {
            Ok(())
        } else {
            Err(AggregateValidationError {
                errors: self.errors,
            })
        }
    }

    pub fn into_errors(self) -> Vec<ValidationError> {
        self.errors
    }
}

impl Extend<ValidationError> for ErrorAggregate {
    fn extend<I: IntoIterator<Item = ValidationError>>(&mut self, iter: I) {
        for error in iter {
            self.push(error);
        }
    }
}

/// Every violation found in an invalid document, in traversal order
#[derive(Debug, Clone, PartialEq, Error, Serialize, Deserialize)]
pub struct AggregateValidationError {
    pub errors: Vec<ValidationError>,
}

impl fmt::Display for AggregateValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let noun = if self.errors.len() == 1 { "error" } else { "errors" };
        write!(f, "Document is invalid ({} {}):", self.errors.len(), noun)?;
        for (i, error) in self.errors.iter().enumerate() {
            write!(f, "\n{}. {}", i + 1, error)?;
        }
        Ok(())
    }
}

impl AggregateValidationError {
    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ValidationError> {
        self.errors.iter()
    }
}

impl From<ValidationError> for AggregateValidationError {
    fn from(error: ValidationError) -> Self {
        Self {
            errors: vec![error],
        }
    }
}

/// Failure of a top-level validation call
#[derive(Debug, Error)]
pub enum ValidateError {
    /// The version could not be detected; nothing was validated
    #[error(transparent)]
    Version(#[from] VersionDetectionError),

    /// The document was validated and found invalid
    #[error(transparent)]
    Invalid(#[from] AggregateValidationError),

    /// The root document could not be fetched
    #[error(transparent)]
    Fetch(#[from] ProviderError),

    /// The root document could not be read or parsed
    #[error(transparent)]
    Load(#[from] LoaderError),
}

impl ValidateError {
    /// The collected errors, when the document was validated and found invalid
    pub fn errors(&self) -> Option<&[ValidationError]> {
        match self {
            Self::Invalid(aggregate) => Some(&aggregate.errors),
            _ => None,
        }
    }
}

//! Specguard Core - OpenAPI 3.0 and 3.1 document validation
//!
//! This crate validates API description documents against the structural
//! and semantic rules of their declared OpenAPI version and reports every
//! violation found, not just the first one.
//!
//! ## Features
//!
//! - **Version Detection**: the `openapi` field selects the 3.0 or 3.1 rule set
//! - **Reference Resolution**: local and cross-document `$ref`, with cycle
//!   detection and a per-run cache; documents are never rewritten
//! - **Keyword Validation**: a JSON Schema engine covering the draft-04
//!   dialect of OpenAPI 3.0 and the 2020-12 dialect of OpenAPI 3.1
//! - **Semantic Rules**: path parameters, server variables, discriminator
//!   mappings, `readOnly`/`writeOnly` usage and more
//! - **Detailed Error Reporting**: each error carries its document path and
//!   the schema path or rule that produced it
//!
//! ## Quick Start
//!
//! ```rust
//! use serde_json::json;
//! use specguard_core::{validate, ValidateError};
//!
//! let document = json!({
//!     "openapi": "3.0.3",
//!     "info": {"title": "Pets", "version": "1.0.0"},
//!     "servers": [{"url": "https://{region}.example.com"}],
//!     "paths": {}
//! });
//!
//! match validate(&document, None) {
//!     Ok(()) => println!("valid"),
//!     Err(ValidateError::Invalid(invalid)) => {
//!         for error in &invalid.errors {
//!             println!("{}", error);
//!         }
//!     }
//!     Err(other) => println!("cannot validate: {}", other),
//! }
//! ```
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod document;
pub mod keywords;
pub mod loader;
pub mod resolver;
pub mod rules;
pub mod validator;
pub mod versioning;

// Re-export commonly used types
pub use document::{Document, PathSegment, RefKey, Resolved, INLINE_ORIGIN};
pub use keywords::{check_keywords, Dialect, KeywordValidator};
pub use loader::{
    ChainProvider, DocumentParser, DocumentProvider, FileProvider, Format, InMemoryProvider, LoaderError,
    ProviderError,
};
pub use resolver::{ResolutionContext, Resolution, ResolveError};
pub use rules::{Scope, SemanticRule};
pub use validator::{
    validate, AggregateValidationError, ErrorAggregate, ErrorKind, Report, ValidateError, ValidationError,
    Validator, ValidatorConfig,
};
pub use versioning::{detect, OpenApiVersion, VersionDetectionError, VersionSpec};

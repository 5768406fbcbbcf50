//! OpenAPI version handling
//!
//! This module provides:
//! - Semantic version parsing and version ranges
//! - Detection of a document's OpenAPI version
//! - The static per-version bundles (dialect, meta-schema, semantic rules)
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod detector;
pub mod spec;
pub mod version;

pub use detector::{detect, supported_ranges, VersionDetectionError};
pub use spec::{NodeKind, OpenApiVersion, VersionSpec, V30_SPEC, V31_SPEC};
pub use version::{SchemaVersion, VersionError, VersionRange};

//! Version detection from the top-level `openapi` field
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::versioning::spec::{VersionSpec, V30_SPEC, V31_SPEC};
use crate::versioning::version::{SchemaVersion, VersionRange};
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

/// Version lines this build can validate, in order of preference
static REGISTRY: [(VersionRange, &VersionSpec); 2] = [
    (VersionRange::Series { major: 3, minor: 0 }, &V30_SPEC),
    (VersionRange::Series { major: 3, minor: 1 }, &V31_SPEC),
];

/// Why a document's version could not be determined
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum VersionDetectionError {
    #[error("Document has no 'openapi' field; cannot determine its OpenAPI version")]
    Missing,

    #[error("The 'openapi' field must be a string, found {found}")]
    NotAString { found: String },

    #[error("Malformed OpenAPI version '{version}': {reason}")]
    Malformed { version: String, reason: String },

    #[error("Unsupported OpenAPI version '{version}': {reason}")]
    Unsupported { version: String, reason: String },
}

/// Ranges accepted by [`detect`]
pub fn supported_ranges() -> impl Iterator<Item = &'static VersionRange> {
    REGISTRY.iter().map(|(range, _)| range)
}

fn supported_list() -> String {
    supported_ranges().map(ToString::to_string).collect::<Vec<_>>().join(", ")
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Select the validation bundle for `document`
pub fn detect(document: &Value) -> Result<&'static VersionSpec, VersionDetectionError> {
    let Some(root) = document.as_object() else {
        return Err(VersionDetectionError::Missing);
    };

    let version = match root.get("openapi") {
        Some(Value::String(version)) => version,
        Some(other) => {
            return Err(VersionDetectionError::NotAString {
                found: type_name(other).to_string(),
            })
        }
        None => {
            return Err(match root.get("swagger") {
                Some(swagger) => VersionDetectionError::Unsupported {
                    version: swagger.as_str().map_or_else(|| swagger.to_string(), str::to_string),
                    reason: "Swagger 2.0 documents are not supported".to_string(),
                },
                None => VersionDetectionError::Missing,
            })
        }
    };

    let parsed = SchemaVersion::parse(version).map_err(|e| VersionDetectionError::Malformed {
        version: version.clone(),
        reason: e.to_string(),
    })?;

    let spec = REGISTRY
        .iter()
        .find(|(range, _)| range.matches(&parsed))
        .map(|(_, spec)| *spec)
        .ok_or_else(|| VersionDetectionError::Unsupported {
            version: version.clone(),
            reason: format!("supported versions are {}", supported_list()),
        })?;

    debug!(version = %parsed, spec = spec.name, "detected OpenAPI version");
    Ok(spec)
}

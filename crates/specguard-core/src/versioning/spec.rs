//! Per-version validation bundles
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::document::{Document, Resolved};
use crate::keywords::Dialect;
use crate::rules::{SemanticRule, V30_RULES, V31_RULES};
use crate::versioning::version::{SchemaVersion, VersionError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::str::FromStr;
use std::sync::{Arc, OnceLock};
use url::Url;

/// Supported OpenAPI minor lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum OpenApiVersion {
    #[serde(rename = "3.0")]
    V30,
    #[serde(rename = "3.1")]
    V31,
}

impl OpenApiVersion {
    pub const ALL: [OpenApiVersion; 2] = [OpenApiVersion::V30, OpenApiVersion::V31];

    /// The static bundle for this version
    pub fn spec(self) -> &'static VersionSpec {
        match self {
            OpenApiVersion::V30 => &V30_SPEC,
            OpenApiVersion::V31 => &V31_SPEC,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            OpenApiVersion::V30 => "3.0",
            OpenApiVersion::V31 => "3.1",
        }
    }
}

impl fmt::Display for OpenApiVersion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts `3.0`, `3.0.x` or a full version such as `3.0.3`
impl FromStr for OpenApiVersion {
    type Err = VersionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let line = s.strip_suffix(".x").unwrap_or(s);
        let (major, minor) = match line.split('.').count() {
            2 => line
                .split_once('.')
                .map(|(major, minor)| (major.to_string(), minor.to_string()))
                .unwrap_or_default(),
            3 => {
                let version = SchemaVersion::parse(line)?;
                (version.major.to_string(), version.minor.to_string())
            }
            _ => (String::new(), String::new()),
        };
        match (major.as_str(), minor.as_str()) {
            ("3", "0") => Ok(OpenApiVersion::V30),
            ("3", "1") => Ok(OpenApiVersion::V31),
            _ => Err(VersionError::InvalidFormat(format!(
                "'{}' is not a supported OpenAPI version (expected 3.0 or 3.1)",
                s
            ))),
        }
    }
}

/// Kinds of OpenAPI objects with their own meta-schema definition
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Schema,
    Parameter,
    RequestBody,
    Response,
    Header,
    Example,
    Link,
    Callback,
    PathItem,
    SecurityScheme,
}

impl NodeKind {
    pub fn name(self) -> &'static str {
        match self {
            NodeKind::Schema => "schema",
            NodeKind::Parameter => "parameter",
            NodeKind::RequestBody => "request body",
            NodeKind::Response => "response",
            NodeKind::Header => "header",
            NodeKind::Example => "example",
            NodeKind::Link => "link",
            NodeKind::Callback => "callback",
            NodeKind::PathItem => "path item",
            NodeKind::SecurityScheme => "security scheme",
        }
    }
}

/// Everything needed to validate documents of one OpenAPI version
pub struct VersionSpec {
    pub version: OpenApiVersion,
    /// Human-readable name, e.g. "OpenAPI 3.1"
    pub name: &'static str,
    /// Dialect of both the meta-schema and the document's schema objects
    pub dialect: Dialect,
    /// Whether the top-level `webhooks` map is part of the version
    pub webhooks: bool,
    pub rules: &'static [&'static dyn SemanticRule],
    meta_schema_id: &'static str,
    meta_schema_source: &'static str,
    definitions: &'static [(NodeKind, &'static str)],
    meta_schema: OnceLock<Arc<Document>>,
}

impl fmt::Debug for VersionSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VersionSpec")
            .field("version", &self.version)
            .field("name", &self.name)
            .field("dialect", &self.dialect)
            .field("rules", &self.rules.iter().map(|rule| rule.id()).collect::<Vec<_>>())
            .field("meta_schema_id", &self.meta_schema_id)
            .finish()
    }
}

// Each version has exactly one static spec, so the version identifies it
impl PartialEq for VersionSpec {
    fn eq(&self, other: &Self) -> bool {
        self.version == other.version
    }
}

impl Eq for VersionSpec {}

impl VersionSpec {
    /// The embedded meta-schema, parsed on first use
    pub fn meta_schema(&self) -> Arc<Document> {
        let document = self.meta_schema.get_or_init(|| {
            let root: Value = serde_json::from_str(self.meta_schema_source)
                .expect("embedded meta-schema is valid JSON");
            let origin = Url::parse(self.meta_schema_id).expect("embedded meta-schema id is a URL");
            Arc::new(Document::new(origin, root))
        });
        Arc::clone(document)
    }

    /// Meta-schema root, used for the structural pass over a whole document
    pub fn meta_root(&self) -> Resolved {
        Resolved::root(self.meta_schema())
    }

    /// Meta-schema definition for one kind of OpenAPI object
    pub fn definition(&self, kind: NodeKind) -> Option<Resolved> {
        self.definitions
            .iter()
            .find(|(candidate, _)| *candidate == kind)
            .map(|(_, pointer)| Resolved::new(self.meta_schema(), *pointer))
    }

    pub fn meta_schema_id(&self) -> &'static str {
        self.meta_schema_id
    }

    /// Whether a rule with this id is part of the version
    pub fn has_rule(&self, id: &str) -> bool {
        self.rules.iter().any(|rule| rule.id() == id)
    }
}

pub static V30_SPEC: VersionSpec = VersionSpec {
    version: OpenApiVersion::V30,
    name: "OpenAPI 3.0",
    dialect: Dialect::Draft4Oas30,
    webhooks: false,
    rules: V30_RULES,
    meta_schema_id: "https://spec.openapis.org/oas/3.0/schema/2021-09-28",
    meta_schema_source: include_str!("../../../../schemas/openapi-3.0.schema.json"),
    definitions: &[
        (NodeKind::Schema, "/definitions/Schema"),
        (NodeKind::Parameter, "/definitions/Parameter"),
        (NodeKind::RequestBody, "/definitions/RequestBody"),
        (NodeKind::Response, "/definitions/Response"),
        (NodeKind::Header, "/definitions/Header"),
        (NodeKind::Example, "/definitions/Example"),
        (NodeKind::Link, "/definitions/Link"),
        (NodeKind::Callback, "/definitions/Callback"),
        (NodeKind::PathItem, "/definitions/PathItem"),
        (NodeKind::SecurityScheme, "/definitions/SecurityScheme"),
    ],
    meta_schema: OnceLock::new(),
};

pub static V31_SPEC: VersionSpec = VersionSpec {
    version: OpenApiVersion::V31,
    name: "OpenAPI 3.1",
    dialect: Dialect::Draft2020,
    webhooks: true,
    rules: V31_RULES,
    meta_schema_id: "https://spec.openapis.org/oas/3.1/schema/2022-10-07",
    meta_schema_source: include_str!("../../../../schemas/openapi-3.1.schema.json"),
    definitions: &[
        (NodeKind::Schema, "/$defs/schema"),
        (NodeKind::Parameter, "/$defs/parameter"),
        (NodeKind::RequestBody, "/$defs/request-body"),
        (NodeKind::Response, "/$defs/response"),
        (NodeKind::Header, "/$defs/header"),
        (NodeKind::Example, "/$defs/example"),
        (NodeKind::Link, "/$defs/link"),
        (NodeKind::Callback, "/$defs/callbacks"),
        (NodeKind::PathItem, "/$defs/path-item"),
        (NodeKind::SecurityScheme, "/$defs/security-scheme"),
    ],
    meta_schema: OnceLock::new(),
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolver::pointer;

    #[test]
    fn test_embedded_meta_schemas_parse() {
        for version in OpenApiVersion::ALL {
            let spec = version.spec();
            let meta = spec.meta_schema();
            assert!(meta.root().is_object(), "{} meta-schema", spec.name);
            assert_eq!(meta.origin().as_str(), spec.meta_schema_id());
        }
    }

    #[test]
    fn test_every_definition_exists() {
        for version in OpenApiVersion::ALL {
            let spec = version.spec();
            for (kind, location) in spec.definitions {
                assert!(
                    pointer::walk(spec.meta_schema().root(), location).is_ok(),
                    "{} has no {} definition at {}",
                    spec.name,
                    kind.name(),
                    location
                );
            }
        }
    }

    #[test]
    fn test_parse_version_argument() {
        assert_eq!("3.0".parse::<OpenApiVersion>().unwrap(), OpenApiVersion::V30);
        assert_eq!("3.1.x".parse::<OpenApiVersion>().unwrap(), OpenApiVersion::V31);
        assert_eq!("3.0.3".parse::<OpenApiVersion>().unwrap(), OpenApiVersion::V30);
        assert!("2.0".parse::<OpenApiVersion>().is_err());
        assert!("3.2".parse::<OpenApiVersion>().is_err());
        assert!("three".parse::<OpenApiVersion>().is_err());
    }

    #[test]
    fn test_rule_sets_are_gated_by_version() {
        assert!(!V30_SPEC.has_rule("license-identifier"));
        assert!(V31_SPEC.has_rule("license-identifier"));
        assert!(V30_SPEC.has_rule("read-write-only"));
        assert!(V31_SPEC.has_rule("read-write-only"));
    }

    #[test]
    fn test_version_serialization() {
        assert_eq!(serde_json::to_string(&OpenApiVersion::V31).unwrap(), "\"3.1\"");
        let parsed: OpenApiVersion = serde_json::from_str("\"3.0\"").unwrap();
        assert_eq!(parsed, OpenApiVersion::V30);
    }
}

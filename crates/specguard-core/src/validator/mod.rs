//! Document validation
//!
//! A [`Validator`] runs the complete pipeline over one document:
//!
//! - **Version detection**: select the 3.0 or 3.1 bundle, or use the
//!   configured override
//! - **Structural pass**: keyword validation of the whole document against
//!   the version's meta-schema
//! - **Semantic walk**: every OpenAPI object is visited, references are
//!   followed and the version's rules run at each site
//!
//! Every violation lands in one [`ErrorAggregate`]; an invalid document
//! yields a single [`AggregateValidationError`] listing all of them.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod error;
mod walker;

pub use error::{AggregateValidationError, ErrorAggregate, ErrorKind, ValidateError, ValidationError};

use crate::document::{inline_origin, nesting_depth, Document, Resolved, MAX_NESTING_DEPTH};
use crate::loader::{file_origin, DocumentParser, DocumentProvider, FileProvider};
use crate::resolver::{ResolutionContext, DEFAULT_MAX_DEPTH};
use crate::rules::SchemaDefault;
use crate::versioning::{detect, OpenApiVersion, VersionDetectionError, VersionSpec};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info, info_span};
use url::Url;
use walker::Walker;

/// Validation settings
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidatorConfig {
    /// Validate as this version instead of reading the `openapi` field
    pub version: Option<OpenApiVersion>,
    /// Longest reference chain followed before giving up
    pub max_resolution_depth: usize,
    /// Check schema `default` values against their schema
    pub check_defaults: bool,
    /// Ids of semantic rules that are not run
    pub disabled_rules: Vec<String>,
}

impl Default for ValidatorConfig {
    fn default() -> Self {
        Self {
            version: None,
            max_resolution_depth: DEFAULT_MAX_DEPTH,
            check_defaults: true,
            disabled_rules: Vec::new(),
        }
    }
}

impl ValidatorConfig {
    pub fn with_version(mut self, version: OpenApiVersion) -> Self {
        self.version = Some(version);
        self
    }

    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    pub fn without_default_checks(mut self) -> Self {
        self.check_defaults = false;
        self
    }

    pub fn without_rule(mut self, id: impl Into<String>) -> Self {
        self.disabled_rules.push(id.into());
        self
    }

    /// Whether the semantic rule `id` runs under this configuration
    pub fn rule_enabled(&self, id: &str) -> bool {
        if id == SchemaDefault::ID && !self.check_defaults {
            return false;
        }
        !self.disabled_rules.iter().any(|disabled| disabled == id)
    }
}

/// Outcome of validating a document whose version could be determined
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    /// Version the document was validated as; absent when the root was not
    /// a mapping
    pub version: Option<OpenApiVersion>,
    pub errors: Vec<ValidationError>,
}

impl Report {
    pub fn is_valid(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn into_result(self) -> Result<(), AggregateValidationError> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(AggregateValidationError { errors: self.errors })
        }
    }
}

/// OpenAPI document validator
///
/// # Examples
///
/// ```rust
/// use serde_json::json;
/// use specguard_core::Validator;
///
/// let document = json!({
///     "openapi": "3.1.0",
///     "info": {"title": "Pets", "version": "1.0.0"},
///     "paths": {}
/// });
///
/// assert!(Validator::new().validate(&document, None).is_ok());
/// ```
pub struct Validator {
    config: ValidatorConfig,
    provider: Box<dyn DocumentProvider>,
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator").field("config", &self.config).finish_non_exhaustive()
    }
}

impl Default for Validator {
    fn default() -> Self {
        Self::new()
    }
}

impl Validator {
    /// Validator with default settings, reading referenced documents from disk
    pub fn new() -> Self {
        Self::with_config(ValidatorConfig::default())
    }

    pub fn with_config(config: ValidatorConfig) -> Self {
        Self {
            config,
            provider: Box::new(FileProvider::new()),
        }
    }

    /// Fetch referenced documents through `provider`
    pub fn with_provider(mut self, provider: impl DocumentProvider + 'static) -> Self {
        self.provider = Box::new(provider);
        self
    }

    pub fn config(&self) -> &ValidatorConfig {
        &self.config
    }

    /// Validate a parsed document; `origin` is the base for relative references
    pub fn validate(&self, document: &Value, origin: Option<&Url>) -> Result<(), ValidateError> {
        Ok(self.report(document, origin)?.into_result()?)
    }

    /// Fetch a document through the provider and validate it
    pub fn validate_url(&self, origin: &Url) -> Result<(), ValidateError> {
        Ok(self.report_url(origin)?.into_result()?)
    }

    /// Fetch a document through the provider and return the full report
    pub fn report_url(&self, origin: &Url) -> Result<Report, ValidateError> {
        let root = self.provider.fetch(origin)?;
        let document = Arc::new(Document::new(origin.clone(), root));
        Ok(self.run(document)?)
    }

    /// Parse a local YAML or JSON file and validate it
    pub fn validate_file(&self, path: &Path) -> Result<(), ValidateError> {
        let origin = file_origin(path)?;
        let root = DocumentParser::new().parse_file(path)?;
        Ok(self.run(Arc::new(Document::new(origin, root)))?.into_result()?)
    }

    /// Every error found in `document`; a version detection failure becomes
    /// a single fatal error
    pub fn collect_errors(&self, document: &Value, origin: Option<&Url>) -> Vec<ValidationError> {
        match self.report(document, origin) {
            Ok(report) => report.errors,
            Err(error) => vec![ValidationError::fatal(error.to_string())],
        }
    }

    /// Validate and return the full report instead of a result
    pub fn report(&self, document: &Value, origin: Option<&Url>) -> Result<Report, VersionDetectionError> {
        let origin = origin.cloned().unwrap_or_else(inline_origin);
        self.run(Arc::new(Document::new(origin, document.clone())))
    }

    fn run(&self, document: Arc<Document>) -> Result<Report, VersionDetectionError> {
        let span = info_span!("validate", origin = %document.origin());
        let _guard = span.enter();

        let root = document.root();
        let invalid_root = !root.is_object() && (self.config.version.is_some() || !root.is_null());
        if invalid_root {
            let error = ValidationError::fatal(format!(
                "Document root must be a mapping, found {}",
                crate::keywords::describe(root)
            ));
            info!(errors = 1, "document root is not a mapping");
            return Ok(Report {
                version: self.config.version,
                errors: vec![error],
            });
        }

        let spec: &'static VersionSpec = match self.config.version {
            Some(version) => version.spec(),
            None => detect(root)?,
        };
        debug!(spec = spec.name, dialect = %spec.dialect, "validating");

        let depth = nesting_depth(root);
        if depth > MAX_NESTING_DEPTH {
            info!(depth, "document nests too deeply");
            return Ok(Report {
                version: Some(spec.version),
                errors: vec![ValidationError::fatal(format!(
                    "Document nests {} levels deep; at most {} are supported",
                    depth, MAX_NESTING_DEPTH
                ))],
            });
        }

        let mut resolution =
            ResolutionContext::new(self.provider.as_ref()).with_max_depth(self.config.max_resolution_depth);
        resolution.register(Arc::clone(&document));
        resolution.register(spec.meta_schema());

        let root = Resolved::root(Arc::clone(&document));
        let mut walker = Walker::new(spec, &self.config, resolution, document.origin().clone());
        walker.structural(&root);
        walker.walk(&root);
        let errors = walker.finish().into_errors();

        info!(version = %spec.version, errors = errors.len(), "validation finished");
        Ok(Report {
            version: Some(spec.version),
            errors,
        })
    }
}

/// Validate `document` with default settings
pub fn validate(document: &Value, origin: Option<&Url>) -> Result<(), ValidateError> {
    Validator::new().validate(document, origin)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_config_builders() {
        let config = ValidatorConfig::default()
            .with_version(OpenApiVersion::V30)
            .with_max_resolution_depth(8)
            .without_default_checks()
            .without_rule("duplicate-paths");

        assert_eq!(config.version, Some(OpenApiVersion::V30));
        assert_eq!(config.max_resolution_depth, 8);
        assert!(!config.rule_enabled("schema-default"));
        assert!(!config.rule_enabled("duplicate-paths"));
        assert!(config.rule_enabled("path-parameters"));
    }

    #[test]
    fn test_config_deserializes_with_defaults() {
        let config: ValidatorConfig = serde_json::from_value(json!({"version": "3.1"})).unwrap();
        assert_eq!(config.version, Some(OpenApiVersion::V31));
        assert_eq!(config.max_resolution_depth, DEFAULT_MAX_DEPTH);
        assert!(config.check_defaults);
    }

    #[test]
    fn test_non_mapping_root_is_fatal() {
        let errors = Validator::new().collect_errors(&json!(["openapi"]), None);
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::Fatal);
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn test_null_root_fails_detection() {
        let error = Validator::new().validate(&Value::Null, None).unwrap_err();
        assert!(matches!(error, ValidateError::Version(VersionDetectionError::Missing)));
    }

    #[test]
    fn test_null_root_with_version_override_is_fatal() {
        let validator = Validator::with_config(ValidatorConfig::default().with_version(OpenApiVersion::V31));
        let errors = validator.collect_errors(&Value::Null, None);
        assert_eq!(errors[0].kind, ErrorKind::Fatal);
    }

    #[test]
    fn test_deeply_nested_document_is_fatal() {
        let mut schema = json!({"type": "string"});
        for _ in 0..1000 {
            schema = json!({"type": "array", "items": schema});
        }
        let document = json!({
            "openapi": "3.1.0",
            "info": {"title": "t", "version": "1"},
            "components": {"schemas": {"Deep": schema}}
        });

        let report = Validator::new().report(&document, None).unwrap();
        assert_eq!(report.version, Some(OpenApiVersion::V31));
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.errors[0].kind, ErrorKind::Fatal);
        assert_eq!(
            report.errors[0].message,
            "Document nests 1004 levels deep; at most 256 are supported"
        );
    }

    #[test]
    fn test_report_carries_version() {
        let document = json!({"openapi": "3.0.3", "info": {"title": "t", "version": "1"}, "paths": {}});
        let report = Validator::new().report(&document, None).unwrap();
        assert_eq!(report.version, Some(OpenApiVersion::V30));
        assert!(report.is_valid());
    }
}

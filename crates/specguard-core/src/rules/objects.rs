//! Mutually exclusive fields of parameter, header, media type and license
//! objects
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use super::{Node, RuleContext, Scope, SemanticRule, Site};
use crate::validator::ValidationError;

/// `example` with `examples`, and `schema` with `content`
pub struct ExclusiveKeywords;

impl ExclusiveKeywords {
    const ID: &'static str = "exclusive-keywords";
}

impl SemanticRule for ExclusiveKeywords {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Parameter, Scope::MediaType]
    }

    fn check(&self, node: &Node<'_>, _cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(map) = node.object() else {
            return Vec::new();
        };
        let mut errors = Vec::new();

        if map.contains_key("example") && map.contains_key("examples") {
            errors.push(ValidationError::rule(
                Self::ID,
                "'example' and 'examples' are mutually exclusive",
                node.path_to(["example"]),
                &["example"],
            ));
        }

        if let Site::Parameter { header } = node.site {
            let noun = if header { "Header" } else { "Parameter" };
            match (map.contains_key("schema"), map.contains_key("content")) {
                (true, true) => errors.push(ValidationError::rule(
                    Self::ID,
                    format!("{} must define either 'schema' or 'content', not both", noun),
                    node.path.to_vec(),
                    &["schema"],
                )),
                (false, false) => errors.push(ValidationError::rule(
                    Self::ID,
                    format!("{} must define either 'schema' or 'content'", noun),
                    node.path.to_vec(),
                    &["schema"],
                )),
                _ => {}
            }
        }
        errors
    }
}

/// A license names its terms through `identifier` or `url`, not both
pub struct LicenseIdentifier;

impl LicenseIdentifier {
    const ID: &'static str = "license-identifier";
}

impl SemanticRule for LicenseIdentifier {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Info]
    }

    fn check(&self, node: &Node<'_>, _cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(license) = node.value().get("license") else {
            return Vec::new();
        };
        if license.get("identifier").is_some() && license.get("url").is_some() {
            return vec![ValidationError::rule(
                Self::ID,
                "License must not define both 'identifier' and 'url'",
                node.path_to(["license"]),
                &[],
            )];
        }
        Vec::new()
    }
}

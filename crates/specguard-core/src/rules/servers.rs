//! Server URL variables
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use super::{template_variables, Node, RuleContext, Scope, SemanticRule};
use crate::keywords::{describe, numeric::json_equal};
use crate::validator::ValidationError;
use serde_json::Value;

/// Every `{variable}` of a server URL is declared, and each declared
/// default is one of its enum values
pub struct ServerVariables;

impl ServerVariables {
    const ID: &'static str = "server-variables";
}

impl SemanticRule for ServerVariables {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Server]
    }

    fn check(&self, node: &Node<'_>, _cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(url) = node.value().get("url").and_then(Value::as_str) else {
            return Vec::new();
        };
        let variables = node.value().get("variables").and_then(Value::as_object);

        let mut errors = Vec::new();
        for name in template_variables(url) {
            if !variables.is_some_and(|declared| declared.contains_key(name)) {
                errors.push(ValidationError::rule(
                    Self::ID,
                    format!("Server URL variable '{}' is not declared in 'variables'", name),
                    node.path_to(["url"]),
                    &["url"],
                ));
            }
        }

        for (name, variable) in variables.into_iter().flatten() {
            let (Some(options), Some(default)) = (
                variable.get("enum").and_then(Value::as_array),
                variable.get("default"),
            ) else {
                continue;
            };
            if !options.iter().any(|option| json_equal(option, default)) {
                errors.push(ValidationError::rule(
                    Self::ID,
                    format!(
                        "Default {} of server variable '{}' is not one of its enum values",
                        describe(default),
                        name
                    ),
                    node.path_to(["variables", name.as_str(), "default"]),
                    &["enum"],
                ));
            }
        }
        errors
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rules::testing::{messages, pointers, run_rule};
    use crate::rules::Site;
    use crate::versioning::OpenApiVersion;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_undeclared_variable() {
        let document = json!({"servers": [{"url": "https://{region}.example.com/{version}", "variables": {
            "version": {"default": "v1"}
        }}]});
        let errors = run_rule(&ServerVariables, OpenApiVersion::V30, document, "/servers/0", Site::Server);
        assert_eq!(
            messages(&errors),
            vec!["Server URL variable 'region' is not declared in 'variables'"]
        );
        assert_eq!(pointers(&errors), vec!["/servers/0/url"]);
        assert_eq!(errors[0].schema_pointer(), "/server-variables/url");
    }

    #[test]
    fn test_default_outside_enum() {
        let document = json!({"servers": [{"url": "https://{env}.example.com", "variables": {
            "env": {"default": "qa", "enum": ["dev", "prod"]}
        }}]});
        let errors = run_rule(&ServerVariables, OpenApiVersion::V31, document, "/servers/0", Site::Server);
        assert_eq!(
            messages(&errors),
            vec!["Default 'qa' of server variable 'env' is not one of its enum values"]
        );
        assert_eq!(pointers(&errors), vec!["/servers/0/variables/env/default"]);
    }

    #[test]
    fn test_valid_server() {
        let document = json!({"servers": [{"url": "https://{env}.example.com", "variables": {
            "env": {"default": "prod", "enum": ["dev", "prod"]}
        }}]});
        assert!(run_rule(&ServerVariables, OpenApiVersion::V30, document, "/servers/0", Site::Server).is_empty());
    }
}

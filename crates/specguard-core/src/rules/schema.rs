//! Rules on schema objects and the schemas of media types
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use super::{effective_schema, Node, RuleContext, Scope, SemanticRule, Site, Usage};
use crate::document::{child_path, PathSegment};
use crate::keywords::Dialect;
use crate::resolver::reference_of;
use crate::validator::{ErrorKind, ValidationError};
use serde_json::Value;

fn flag(value: &Value, name: &str) -> bool {
    value.get(name) == Some(&Value::Bool(true))
}

/// `readOnly` and `writeOnly` consistency
///
/// A schema cannot carry both flags. Below a request body no schema may
/// require a `readOnly` property; below a response no schema may require a
/// `writeOnly` property. `allOf` members are covered by the schema that
/// combines them.
pub struct ReadWriteOnly;

impl ReadWriteOnly {
    const ID: &'static str = "read-write-only";

    fn required_violations(node: &Node<'_>, cx: &mut RuleContext<'_, '_>, usage: Usage) -> Vec<ValidationError> {
        let (forbidden, location) = match usage {
            Usage::Request => ("readOnly", "a request body"),
            Usage::Response => ("writeOnly", "a response"),
            Usage::Neutral => return Vec::new(),
        };

        let effective = effective_schema(cx, node.at);
        let mut errors = Vec::new();
        for name in &effective.required {
            let Some(property) = effective.property(name) else {
                continue;
            };
            let marked = flag(property.node(), forbidden)
                || cx.resolve(property).is_some_and(|target| flag(target.node(), forbidden));
            if marked {
                errors.push(ValidationError::rule(
                    Self::ID,
                    format!(
                        "Property '{}' is {} and cannot be required in {}",
                        name, forbidden, location
                    ),
                    node.path.to_vec(),
                    &[forbidden],
                ));
            }
        }
        errors
    }
}

impl SemanticRule for ReadWriteOnly {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Schema, Scope::ReferencedSchema]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        match node.site {
            Site::Schema { all_of_member, usage } => {
                if flag(node.value(), "readOnly") && flag(node.value(), "writeOnly") {
                    return vec![ValidationError::rule(
                        Self::ID,
                        "Schema cannot be both readOnly and writeOnly",
                        node.path.to_vec(),
                        &[],
                    )];
                }
                if all_of_member {
                    return Vec::new();
                }
                Self::required_violations(node, cx, usage)
            }
            Site::ReferencedSchema {
                all_of_member: false,
                usage,
            } => Self::required_violations(node, cx, usage),
            _ => Vec::new(),
        }
    }
}

/// Every name listed in `required` is declared in `properties`
///
/// Properties contributed by `allOf` members count. Schemas that are
/// themselves `allOf` members, or that admit undeclared properties through
/// `additionalProperties`, `patternProperties` or alternatives, are skipped.
pub struct RequiredProperties;

impl RequiredProperties {
    const ID: &'static str = "required-properties";
}

impl SemanticRule for RequiredProperties {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Schema]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Site::Schema { all_of_member: false, .. } = node.site else {
            return Vec::new();
        };
        let Some(map) = node.object() else {
            return Vec::new();
        };
        let Some(required) = map.get("required").and_then(Value::as_array) else {
            return Vec::new();
        };
        if matches!(map.get("additionalProperties"), Some(Value::Object(_) | Value::Bool(true)))
            || ["patternProperties", "anyOf", "oneOf"].iter().any(|k| map.contains_key(*k))
        {
            return Vec::new();
        }

        let effective = effective_schema(cx, node.at);
        let mut missing: Vec<&str> = Vec::new();
        for name in required.iter().filter_map(Value::as_str) {
            if !effective.declares(name) && !missing.contains(&name) {
                missing.push(name);
            }
        }
        if missing.is_empty() {
            return Vec::new();
        }

        vec![ValidationError::rule(
            Self::ID,
            format!("Required list has not defined properties: {}", missing.join(", ")),
            node.path_to(["required"]),
            &[],
        )]
    }
}

/// A schema's `default` is valid against the schema itself
pub struct SchemaDefault;

impl SchemaDefault {
    pub const ID: &'static str = "schema-default";
}

impl SemanticRule for SchemaDefault {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Schema]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(default) = node.value().get("default") else {
            return Vec::new();
        };
        // In 3.0 `$ref` replaces its siblings, `default` included
        if cx.dialect() == Dialect::Draft4Oas30 && reference_of(node.value()).is_some() {
            return Vec::new();
        }
        if default.is_null() && cx.dialect() == Dialect::Draft4Oas30 && flag(node.value(), "nullable") {
            return Vec::new();
        }

        let path = child_path(node.path, "default");
        cx.keywords
            .check(cx.resolution, default, node.at, &path)
            .into_iter()
            .map(|error| {
                let mut schema_path = vec![PathSegment::from(Self::ID)];
                schema_path.extend(error.schema_path);
                ValidationError {
                    schema_path,
                    kind: ErrorKind::Rule(Self::ID.to_string()),
                    ..error
                }
            })
            .collect()
    }
}

/// Discriminator mapping values resolve, and to one of the alternatives
pub struct DiscriminatorMapping;

impl DiscriminatorMapping {
    const ID: &'static str = "discriminator-mapping";
}

impl SemanticRule for DiscriminatorMapping {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Schema]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(map) = node.object() else {
            return Vec::new();
        };
        let Some(mapping) = map
            .get("discriminator")
            .and_then(|discriminator| discriminator.get("mapping"))
            .and_then(Value::as_object)
        else {
            return Vec::new();
        };

        let mut alternatives = Vec::new();
        let mut has_alternatives = false;
        for keyword in ["oneOf", "anyOf"] {
            let Some(members) = map.get(keyword).and_then(Value::as_array) else {
                continue;
            };
            has_alternatives = true;
            for index in 0..members.len() {
                let member = node.at.child(keyword).child(index);
                if let Some(target) = cx.resolve(&member) {
                    alternatives.push(target.key());
                }
            }
        }

        let mut errors = Vec::new();
        for (name, value) in mapping {
            let Some(target) = value.as_str() else {
                continue;
            };
            // A bare schema name stands for a component schema
            let reference = if target.contains('/') || target.contains('#') {
                target.to_string()
            } else {
                format!("#/components/schemas/{}", target)
            };
            let path = node.path_to(["discriminator", "mapping", name.as_str()]);

            match cx.resolution.resolve_reference(node.at, &reference) {
                Err(error) => errors.push(ValidationError::rule(
                    Self::ID,
                    format!("Discriminator mapping '{}' does not resolve: {}", name, error),
                    path,
                    &["mapping"],
                )),
                Ok(resolution) if has_alternatives && !alternatives.contains(&resolution.target.key()) => {
                    errors.push(ValidationError::rule(
                        Self::ID,
                        format!(
                            "Discriminator mapping '{}' points to '{}', which is not one of the oneOf/anyOf schemas",
                            name, target
                        ),
                        path,
                        &["mapping"],
                    ))
                }
                Ok(_) => {}
            }
        }
        errors
    }
}

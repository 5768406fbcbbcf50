//! Rules on paths, operations and their parameters
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use super::{template_variables, Node, RuleContext, Scope, SemanticRule, Site, METHODS};
use crate::document::{PathSegment, Resolved};
use crate::validator::ValidationError;
use serde_json::Value;
use std::collections::HashMap;

/// A parameter of a `parameters` list, after following its reference
struct Declared {
    index: usize,
    name: String,
    location: String,
}

fn declared_parameters(cx: &mut RuleContext<'_, '_>, owner: &Resolved) -> Vec<Declared> {
    let Some(list) = owner.get("parameters") else {
        return Vec::new();
    };
    let count = list.node().as_array().map_or(0, Vec::len);
    let mut declared = Vec::with_capacity(count);
    for index in 0..count {
        let Some(parameter) = cx.resolve(&list.child(index)) else {
            continue;
        };
        let node = parameter.node();
        if let (Some(name), Some(location)) = (
            node.get("name").and_then(Value::as_str),
            node.get("in").and_then(Value::as_str),
        ) {
            declared.push(Declared {
                index,
                name: name.to_string(),
                location: location.to_string(),
            });
        }
    }
    declared
}

/// Operations of a path item in method order
fn operations(item: &Resolved) -> Vec<(&'static str, Resolved)> {
    METHODS
        .iter()
        .filter_map(|method| item.get(method).map(|operation| (*method, operation)))
        .collect()
}

/// Path template variables and `in: path` parameters match up
pub struct PathParameters;

impl PathParameters {
    const ID: &'static str = "path-parameters";
}

impl SemanticRule for PathParameters {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::PathItem]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Site::PathItem { template: Some(template) } = node.site else {
            return Vec::new();
        };
        let variables = template_variables(template);
        let shared: Vec<Declared> = declared_parameters(cx, node.at)
            .into_iter()
            .filter(|parameter| parameter.location == "path")
            .collect();

        let mut errors = Vec::new();
        for parameter in &shared {
            if !variables.contains(&parameter.name.as_str()) {
                errors.push(ValidationError::rule(
                    Self::ID,
                    format!(
                        "Path parameter '{}' is not present in path template '{}'",
                        parameter.name, template
                    ),
                    node.path_to([PathSegment::from("parameters"), PathSegment::from(parameter.index)]),
                    &["unused"],
                ));
            }
        }

        for (method, operation) in operations(node.at) {
            let own: Vec<Declared> = declared_parameters(cx, &operation)
                .into_iter()
                .filter(|parameter| parameter.location == "path")
                .collect();

            for variable in &variables {
                let defined = shared.iter().chain(&own).any(|parameter| parameter.name == *variable);
                if !defined {
                    errors.push(ValidationError::rule(
                        Self::ID,
                        format!(
                            "Path template variable '{}' has no matching path parameter in operation '{}'",
                            variable, method
                        ),
                        node.path_to([method]),
                        &["missing"],
                    ));
                }
            }
            for parameter in &own {
                if !variables.contains(&parameter.name.as_str()) {
                    errors.push(ValidationError::rule(
                        Self::ID,
                        format!(
                            "Path parameter '{}' is not present in path template '{}'",
                            parameter.name, template
                        ),
                        node.path_to([
                            PathSegment::from(method),
                            PathSegment::from("parameters"),
                            PathSegment::from(parameter.index),
                        ]),
                        &["unused"],
                    ));
                }
            }
        }
        errors
    }
}

/// Each `(name, in)` pair appears once per parameter list
pub struct DuplicateParameters;

impl DuplicateParameters {
    const ID: &'static str = "duplicate-parameters";

    fn check_list(
        &self,
        cx: &mut RuleContext<'_, '_>,
        owner: &Resolved,
        base: Vec<PathSegment>,
        errors: &mut Vec<ValidationError>,
    ) {
        let mut seen: Vec<(String, String)> = Vec::new();
        for parameter in declared_parameters(cx, owner) {
            let key = (parameter.name, parameter.location);
            if seen.contains(&key) {
                let mut path = base.clone();
                path.push(PathSegment::from("parameters"));
                path.push(PathSegment::from(parameter.index));
                errors.push(ValidationError::rule(
                    Self::ID,
                    format!("Duplicate parameter '{}' in '{}'", key.0, key.1),
                    path,
                    &[],
                ));
            } else {
                seen.push(key);
            }
        }
    }
}

impl SemanticRule for DuplicateParameters {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::PathItem]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.check_list(cx, node.at, node.path.to_vec(), &mut errors);
        for (method, operation) in operations(node.at) {
            self.check_list(cx, &operation, node.path_to([method]), &mut errors);
        }
        errors
    }
}

/// `operationId` values are unique across the document
pub struct OperationIdUnique;

impl OperationIdUnique {
    const ID: &'static str = "operation-id-unique";
}

impl SemanticRule for OperationIdUnique {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Document]
    }

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let mut first_use: HashMap<String, Vec<PathSegment>> = HashMap::new();
        let mut errors = Vec::new();

        for container in ["paths", "webhooks"] {
            let Some(items) = node.at.get(container) else {
                continue;
            };
            let keys: Vec<String> = items
                .node()
                .as_object()
                .map(|map| map.keys().cloned().collect())
                .unwrap_or_default();
            for key in keys {
                let Some(item) = cx.resolve(&items.child(key.as_str())) else {
                    continue;
                };
                for (method, operation) in operations(&item) {
                    let Some(id) = operation.node().get("operationId").and_then(Value::as_str) else {
                        continue;
                    };
                    let path = node.path_to([container, key.as_str(), method, "operationId"]);
                    match first_use.get(id) {
                        Some(first) => errors.push(ValidationError::rule(
                            Self::ID,
                            format!(
                                "Duplicate operationId '{}', first used at '#{}'",
                                id,
                                crate::resolver::pointer::from_path(first)
                            ),
                            path,
                            &[],
                        )),
                        None => {
                            first_use.insert(id.to_string(), path);
                        }
                    }
                }
            }
        }
        errors
    }
}

/// Replace every `{name}` of a path template with `{}`
fn normalize_template(template: &str) -> String {
    let mut normalized = String::with_capacity(template.len());
    let mut in_variable = false;
    for c in template.chars() {
        match c {
            '{' => {
                in_variable = true;
                normalized.push('{');
            }
            '}' if in_variable => {
                in_variable = false;
                normalized.push('}');
            }
            _ if in_variable => {}
            _ => normalized.push(c),
        }
    }
    normalized
}

/// Two templates differing only in variable names describe the same path
pub struct DuplicatePaths;

impl DuplicatePaths {
    const ID: &'static str = "duplicate-paths";
}

impl SemanticRule for DuplicatePaths {
    fn id(&self) -> &'static str {
        Self::ID
    }

    fn scopes(&self) -> &'static [Scope] {
        &[Scope::Document]
    }

    fn check(&self, node: &Node<'_>, _cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError> {
        let Some(paths) = node.value().get("paths").and_then(Value::as_object) else {
            return Vec::new();
        };
        let mut seen: HashMap<String, &str> = HashMap::new();
        let mut errors = Vec::new();
        for template in paths.keys() {
            let normalized = normalize_template(template);
            match seen.get(&normalized) {
                Some(first) => errors.push(ValidationError::rule(
                    Self::ID,
                    format!("Path '{}' is equivalent to '{}'", template, first),
                    node.path_to(["paths", template.as_str()]),
                    &[],
                )),
                None => {
                    seen.insert(normalized, template);
                }
            }
        }
        errors
    }
}

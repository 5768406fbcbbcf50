//! JSON Schema keyword validation
//!
//! One engine serves both supported dialects:
//!
//! - **Draft4Oas30**: the draft-04 flavour used by OpenAPI 3.0 schema objects
//!   and by the 3.0 meta-schema (boolean `exclusiveMinimum`/`exclusiveMaximum`,
//!   tuple `items`, `nullable`, `$ref` replacing its siblings)
//! - **Draft2020**: the 2020-12 vocabulary used by OpenAPI 3.1 (numeric
//!   exclusive bounds, `prefixItems`, `const`, `if`/`then`/`else`, `$ref`
//!   applied alongside its siblings)
//!
//! Errors are accumulated, never raised: every keyword of every reachable
//! subschema contributes its own [`ValidationError`].
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod format;
pub mod numeric;

use crate::document::{PathSegment, RefKey, Resolved};
use crate::resolver::{reference_of, ResolutionContext, ResolveError};
use crate::validator::ValidationError;
use numeric::{compare, is_multiple_of, json_equal};
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;

/// Longest rendering of an instance inside an error message
const MAX_RENDERED_LEN: usize = 80;

/// Keyword semantics in effect
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Dialect {
    Draft4Oas30,
    Draft2020,
}

impl Dialect {
    /// Whether `$ref` hides the keywords next to it
    pub fn ref_overrides_siblings(self) -> bool {
        matches!(self, Dialect::Draft4Oas30)
    }

    pub fn name(self) -> &'static str {
        match self {
            Dialect::Draft4Oas30 => "draft-04 (OpenAPI 3.0)",
            Dialect::Draft2020 => "2020-12",
        }
    }
}

impl fmt::Display for Dialect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Render an instance for an error message
pub fn describe(value: &Value) -> String {
    let rendered = match value {
        Value::String(s) => format!("'{}'", s),
        other => other.to_string(),
    };
    if rendered.chars().count() <= MAX_RENDERED_LEN {
        return rendered;
    }
    let mut truncated: String = rendered.chars().take(MAX_RENDERED_LEN).collect();
    truncated.push_str("...");
    truncated
}

fn quoted_list<'a>(names: impl IntoIterator<Item = &'a str>) -> String {
    names
        .into_iter()
        .map(|name| format!("'{}'", name))
        .collect::<Vec<_>>()
        .join(", ")
}

/// Instance and schema locations of the keyword being evaluated
#[derive(Debug, Default)]
struct Location {
    instance: Vec<PathSegment>,
    schema: Vec<PathSegment>,
}

impl Location {
    fn error(&self, keyword: &str, message: String) -> ValidationError {
        let mut schema_path = self.schema.clone();
        schema_path.push(PathSegment::from(keyword));
        ValidationError::new(message, self.instance.clone(), schema_path)
    }
}

/// Validates instances against schemas held in documents
///
/// Keeps compiled `pattern`/`patternProperties` regexes for reuse, so one
/// validator should serve a whole run.
#[derive(Debug)]
pub struct KeywordValidator {
    dialect: Dialect,
    patterns: HashMap<String, Option<Regex>>,
    active: Vec<(RefKey, usize)>,
}

impl KeywordValidator {
    pub fn new(dialect: Dialect) -> Self {
        Self {
            dialect,
            patterns: HashMap::new(),
            active: Vec::new(),
        }
    }

    pub fn dialect(&self) -> Dialect {
        self.dialect
    }

    /// Validate `instance` against `schema`; error paths start at `instance_path`
    pub fn check(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        instance_path: &[PathSegment],
    ) -> Vec<ValidationError> {
        let mut location = Location {
            instance: instance_path.to_vec(),
            schema: Vec::new(),
        };
        let mut errors = Vec::new();
        self.validate(cx, instance, schema, &mut location, &mut errors);
        errors
    }

    pub fn is_valid(&mut self, cx: &mut ResolutionContext<'_>, instance: &Value, schema: &Resolved) -> bool {
        self.check(cx, instance, schema, &[]).is_empty()
    }

    fn regex(&mut self, pattern: &str) -> Option<Regex> {
        if let Some(compiled) = self.patterns.get(pattern) {
            return compiled.clone();
        }
        let compiled = Regex::new(pattern).ok();
        self.patterns.insert(pattern.to_string(), compiled.clone());
        compiled
    }

    /// Follow the `$ref` of `schema`: the whole chain in draft-04, one hop in
    /// 2020-12 where the target's own siblings still apply
    fn follow(&mut self, cx: &mut ResolutionContext<'_>, schema: &Resolved, reference: &str) -> Result<Resolved, ResolveError> {
        match self.dialect {
            Dialect::Draft4Oas30 => cx.resolve(schema).map(|resolution| resolution.target),
            Dialect::Draft2020 => cx.resolve_step(schema, reference),
        }
    }

    /// Validate against a schema reached through `$ref`, once per instance
    fn enter(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let marker = (schema.key(), instance as *const Value as usize);
        if self.active.contains(&marker) {
            return;
        }
        self.active.push(marker);
        self.validate(cx, instance, schema, location, out);
        self.active.pop();
    }

    /// Validate against `parent/keyword[/segment]`
    #[allow(clippy::too_many_arguments)]
    fn apply(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        parent: &Resolved,
        keyword: &str,
        segment: Option<PathSegment>,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let depth = location.schema.len();
        let mut schema = parent.child(keyword);
        location.schema.push(PathSegment::from(keyword));
        if let Some(segment) = segment {
            schema = schema.child(segment.clone());
            location.schema.push(segment);
        }
        self.validate(cx, instance, &schema, location, out);
        location.schema.truncate(depth);
    }

    /// Like [`apply`](Self::apply) but collecting into a fresh list
    fn branch(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        parent: &Resolved,
        keyword: &str,
        segment: Option<PathSegment>,
        location: &mut Location,
    ) -> Vec<ValidationError> {
        let mut errors = Vec::new();
        self.apply(cx, instance, parent, keyword, segment, location, &mut errors);
        errors
    }

    fn validate(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let map = match schema.node() {
            Value::Bool(true) => return,
            Value::Bool(false) => {
                let error = ValidationError::new(
                    format!("False schema does not allow {}", describe(instance)),
                    location.instance.clone(),
                    location.schema.clone(),
                );
                out.push(error);
                return;
            }
            Value::Object(map) => map,
            _ => return,
        };

        if let Some(reference) = reference_of(schema.node()) {
            match self.follow(cx, schema, reference) {
                Ok(target) => {
                    location.schema.push(PathSegment::from("$ref"));
                    self.enter(cx, instance, &target, location, out);
                    location.schema.pop();
                }
                Err(error) => out.push(ValidationError::reference(
                    &error,
                    location.instance.clone(),
                    location.schema.clone(),
                )),
            }
            if self.dialect.ref_overrides_siblings() {
                return;
            }
        }

        let nullable = self.dialect == Dialect::Draft4Oas30 && map.get("nullable") == Some(&Value::Bool(true));
        let modern = self.dialect == Dialect::Draft2020;

        for (keyword, value) in map {
            match keyword.as_str() {
                "type" => self.check_type(instance, value, nullable, location, out),
                "enum" => {
                    if let Value::Array(options) = value {
                        if !options.iter().any(|option| json_equal(option, instance)) {
                            out.push(location.error(
                                "enum",
                                format!("{} is not one of {}", describe(instance), describe(value)),
                            ));
                        }
                    }
                }
                "const" if modern => {
                    if !json_equal(value, instance) {
                        out.push(location.error("const", format!("{} was expected", describe(value))));
                    }
                }
                "required" => self.check_required(instance, value, location, out),
                "properties" => self.check_properties(cx, instance, schema, value, location, out),
                "patternProperties" => self.check_pattern_properties(cx, instance, schema, value, location, out),
                "additionalProperties" => self.check_additional_properties(cx, instance, schema, map, location, out),
                "propertyNames" if modern => {
                    if let Value::Object(object) = instance {
                        for name in object.keys() {
                            let name = Value::String(name.clone());
                            self.apply(cx, &name, schema, "propertyNames", None, location, out);
                        }
                    }
                }
                "minProperties" | "maxProperties" => self.check_property_count(instance, keyword, value, location, out),
                "dependentRequired" if modern => self.check_dependent_required(instance, value, location, out),
                "dependentSchemas" if modern => {
                    if let (Value::Object(object), Value::Object(dependents)) = (instance, value) {
                        for name in dependents.keys() {
                            if object.contains_key(name) {
                                self.apply(cx, instance, schema, "dependentSchemas", Some(name.into()), location, out);
                            }
                        }
                    }
                }
                "items" => self.check_items(cx, instance, schema, map, value, location, out),
                "prefixItems" if modern => {
                    if let (Value::Array(items), Value::Array(prefix)) = (instance, value) {
                        for (index, item) in items.iter().enumerate().take(prefix.len()) {
                            location.instance.push(PathSegment::from(index));
                            self.apply(cx, item, schema, "prefixItems", Some(index.into()), location, out);
                            location.instance.pop();
                        }
                    }
                }
                "additionalItems" if !modern => self.check_additional_items(cx, instance, schema, map, value, location, out),
                "minItems" | "maxItems" => {
                    if let (Value::Array(items), Some(limit)) = (instance, value.as_u64()) {
                        let len = items.len() as u64;
                        if keyword == "minItems" && len < limit {
                            out.push(location.error(keyword, format!("{} is too short", describe(instance))));
                        } else if keyword == "maxItems" && len > limit {
                            out.push(location.error(keyword, format!("{} is too long", describe(instance))));
                        }
                    }
                }
                "uniqueItems" => {
                    if let (Value::Array(items), Value::Bool(true)) = (instance, value) {
                        let duplicated = items
                            .iter()
                            .enumerate()
                            .any(|(i, a)| items[i + 1..].iter().any(|b| json_equal(a, b)));
                        if duplicated {
                            out.push(location.error(
                                "uniqueItems",
                                format!("{} has non-unique elements", describe(instance)),
                            ));
                        }
                    }
                }
                "contains" if modern => self.check_contains(cx, instance, schema, map, location, out),
                "minimum" | "maximum" => self.check_bound(instance, keyword, value, map, location, out),
                "exclusiveMinimum" | "exclusiveMaximum" => {
                    // Boolean forms are modifiers handled with minimum/maximum
                    if value.is_number() {
                        self.check_bound(instance, keyword, value, map, location, out);
                    }
                }
                "multipleOf" => {
                    if let (Value::Number(number), Value::Number(divisor)) = (instance, value) {
                        if !is_multiple_of(number, divisor) {
                            out.push(location.error(
                                "multipleOf",
                                format!("{} is not a multiple of {}", number, divisor),
                            ));
                        }
                    }
                }
                "minLength" | "maxLength" => {
                    if let (Value::String(s), Some(limit)) = (instance, value.as_u64()) {
                        let len = s.chars().count() as u64;
                        if keyword == "minLength" && len < limit {
                            out.push(location.error(keyword, format!("{} is too short", describe(instance))));
                        } else if keyword == "maxLength" && len > limit {
                            out.push(location.error(keyword, format!("{} is too long", describe(instance))));
                        }
                    }
                }
                "pattern" => {
                    if let (Value::String(s), Value::String(pattern)) = (instance, value) {
                        if let Some(regex) = self.regex(pattern) {
                            if !regex.is_match(s) {
                                out.push(location.error(
                                    "pattern",
                                    format!("{} does not match '{}'", describe(instance), pattern),
                                ));
                            }
                        }
                    }
                }
                "format" => {
                    if let Value::String(name) = value {
                        if !format::check(name, instance) {
                            out.push(location.error(
                                "format",
                                format!("{} is not a '{}'", describe(instance), name),
                            ));
                        }
                    }
                }
                "allOf" => {
                    if let Value::Array(members) = value {
                        for index in 0..members.len() {
                            self.apply(cx, instance, schema, "allOf", Some(index.into()), location, out);
                        }
                    }
                }
                "anyOf" => self.check_any_of(cx, instance, schema, value, location, out),
                "oneOf" => self.check_one_of(cx, instance, schema, value, location, out),
                "not" => {
                    if self.branch(cx, instance, schema, "not", None, location).is_empty() {
                        out.push(location.error(
                            "not",
                            format!("{} should not be valid under {}", describe(instance), describe(value)),
                        ));
                    }
                }
                "if" if modern => {
                    let matched = self.branch(cx, instance, schema, "if", None, location).is_empty();
                    let next = if matched { "then" } else { "else" };
                    if map.contains_key(next) {
                        self.apply(cx, instance, schema, next, None, location, out);
                    }
                }
                _ => {}
            }
        }
    }

    fn check_type(
        &self,
        instance: &Value,
        value: &Value,
        nullable: bool,
        location: &Location,
        out: &mut Vec<ValidationError>,
    ) {
        let types: Vec<&str> = match value {
            Value::String(name) => vec![name.as_str()],
            Value::Array(names) => names.iter().filter_map(Value::as_str).collect(),
            _ => return,
        };
        if types.iter().any(|name| type_matches(instance, name)) || (nullable && instance.is_null()) {
            return;
        }
        out.push(location.error(
            "type",
            format!("{} is not of type {}", describe(instance), quoted_list(types)),
        ));
    }

    fn check_required(&self, instance: &Value, value: &Value, location: &Location, out: &mut Vec<ValidationError>) {
        let (Value::Object(object), Value::Array(names)) = (instance, value) else {
            return;
        };
        for name in names.iter().filter_map(Value::as_str) {
            if !object.contains_key(name) {
                out.push(location.error("required", format!("'{}' is a required property", name)));
            }
        }
    }

    fn check_properties(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Object(object), Value::Object(properties)) = (instance, value) else {
            return;
        };
        for name in properties.keys() {
            if let Some(property) = object.get(name) {
                location.instance.push(PathSegment::from(name));
                self.apply(cx, property, schema, "properties", Some(name.into()), location, out);
                location.instance.pop();
            }
        }
    }

    fn check_pattern_properties(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Object(object), Value::Object(patterns)) = (instance, value) else {
            return;
        };
        for pattern in patterns.keys() {
            let Some(regex) = self.regex(pattern) else {
                continue;
            };
            for (name, property) in object {
                if regex.is_match(name) {
                    location.instance.push(PathSegment::from(name));
                    self.apply(cx, property, schema, "patternProperties", Some(pattern.into()), location, out);
                    location.instance.pop();
                }
            }
        }
    }

    fn check_additional_properties(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        map: &Map<String, Value>,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let Value::Object(object) = instance else {
            return;
        };
        let declared = map.get("properties").and_then(Value::as_object);
        let patterns: Vec<Regex> = map
            .get("patternProperties")
            .and_then(Value::as_object)
            .map(|patterns| patterns.keys().filter_map(|p| self.regex(p)).collect())
            .unwrap_or_default();

        let extras: Vec<&String> = object
            .keys()
            .filter(|name| !declared.is_some_and(|declared| declared.contains_key(*name)))
            .filter(|name| !patterns.iter().any(|regex| regex.is_match(name)))
            .collect();
        if extras.is_empty() {
            return;
        }

        match map.get("additionalProperties") {
            Some(Value::Bool(false)) => {
                let verb = if extras.len() == 1 { "was" } else { "were" };
                out.push(location.error(
                    "additionalProperties",
                    format!(
                        "Additional properties are not allowed ({} {} unexpected)",
                        quoted_list(extras.iter().map(|name| name.as_str())),
                        verb
                    ),
                ));
            }
            Some(Value::Object(_)) => {
                for name in extras {
                    if let Some(property) = object.get(name) {
                        location.instance.push(PathSegment::from(name));
                        self.apply(cx, property, schema, "additionalProperties", None, location, out);
                        location.instance.pop();
                    }
                }
            }
            _ => {}
        }
    }

    fn check_property_count(
        &self,
        instance: &Value,
        keyword: &str,
        value: &Value,
        location: &Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Object(object), Some(limit)) = (instance, value.as_u64()) else {
            return;
        };
        let count = object.len() as u64;
        if keyword == "minProperties" && count < limit {
            out.push(location.error(
                keyword,
                format!("{} does not have enough properties", describe(instance)),
            ));
        } else if keyword == "maxProperties" && count > limit {
            out.push(location.error(keyword, format!("{} has too many properties", describe(instance))));
        }
    }

    fn check_dependent_required(
        &self,
        instance: &Value,
        value: &Value,
        location: &Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Object(object), Value::Object(dependencies)) = (instance, value) else {
            return;
        };
        for (name, required) in dependencies {
            if !object.contains_key(name) {
                continue;
            }
            for dependency in required.as_array().into_iter().flatten().filter_map(Value::as_str) {
                if !object.contains_key(dependency) {
                    out.push(location.error(
                        "dependentRequired",
                        format!("'{}' is a dependency of '{}'", dependency, name),
                    ));
                }
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_items(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        map: &Map<String, Value>,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let Value::Array(items) = instance else {
            return;
        };
        match (self.dialect, value) {
            (Dialect::Draft4Oas30, Value::Array(tuple)) => {
                for (index, item) in items.iter().enumerate().take(tuple.len()) {
                    location.instance.push(PathSegment::from(index));
                    self.apply(cx, item, schema, "items", Some(index.into()), location, out);
                    location.instance.pop();
                }
            }
            (_, Value::Object(_) | Value::Bool(_)) => {
                let skip = match self.dialect {
                    Dialect::Draft2020 => map.get("prefixItems").and_then(Value::as_array).map_or(0, Vec::len),
                    Dialect::Draft4Oas30 => 0,
                };
                for (index, item) in items.iter().enumerate().skip(skip) {
                    location.instance.push(PathSegment::from(index));
                    self.apply(cx, item, schema, "items", None, location, out);
                    location.instance.pop();
                }
            }
            _ => {}
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn check_additional_items(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        map: &Map<String, Value>,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Array(items), Some(Value::Array(tuple))) = (instance, map.get("items")) else {
            return;
        };
        if items.len() <= tuple.len() {
            return;
        }
        match value {
            Value::Bool(false) => out.push(location.error(
                "additionalItems",
                format!(
                    "Additional items are not allowed ({} unexpected)",
                    items.len() - tuple.len()
                ),
            )),
            Value::Object(_) => {
                for (index, item) in items.iter().enumerate().skip(tuple.len()) {
                    location.instance.push(PathSegment::from(index));
                    self.apply(cx, item, schema, "additionalItems", None, location, out);
                    location.instance.pop();
                }
            }
            _ => {}
        }
    }

    fn check_contains(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        map: &Map<String, Value>,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let Value::Array(items) = instance else {
            return;
        };
        let minimum = map.get("minContains").and_then(Value::as_u64).unwrap_or(1);
        let maximum = map.get("maxContains").and_then(Value::as_u64);

        let mut matches = 0u64;
        for item in items {
            if self.branch(cx, item, schema, "contains", None, location).is_empty() {
                matches += 1;
            }
        }

        if matches < minimum {
            let message = if minimum <= 1 {
                format!("{} does not contain items matching the given schema", describe(instance))
            } else {
                format!(
                    "{} contains {} matching items, fewer than the minimum of {}",
                    describe(instance),
                    matches,
                    minimum
                )
            };
            out.push(location.error("contains", message));
        }
        if let Some(maximum) = maximum.filter(|maximum| matches > *maximum) {
            out.push(location.error(
                "maxContains",
                format!(
                    "{} contains {} matching items, more than the maximum of {}",
                    describe(instance),
                    matches,
                    maximum
                ),
            ));
        }
    }

    fn check_bound(
        &self,
        instance: &Value,
        keyword: &str,
        value: &Value,
        map: &Map<String, Value>,
        location: &Location,
        out: &mut Vec<ValidationError>,
    ) {
        let (Value::Number(number), Value::Number(limit)) = (instance, value) else {
            return;
        };
        let Some(ordering) = compare(number, limit) else {
            return;
        };

        // draft-04 turns minimum/maximum exclusive through a boolean sibling
        let modifier = |name: &str| {
            self.dialect == Dialect::Draft4Oas30 && map.get(name) == Some(&Value::Bool(true))
        };
        let (failed, message) = match keyword {
            "minimum" if modifier("exclusiveMinimum") => (
                ordering != Ordering::Greater,
                "is less than or equal to the minimum of",
            ),
            "minimum" => (ordering == Ordering::Less, "is less than the minimum of"),
            "maximum" if modifier("exclusiveMaximum") => (
                ordering != Ordering::Less,
                "is greater than or equal to the maximum of",
            ),
            "maximum" => (ordering == Ordering::Greater, "is greater than the maximum of"),
            "exclusiveMinimum" => (
                ordering != Ordering::Greater,
                "is less than or equal to the minimum of",
            ),
            "exclusiveMaximum" => (
                ordering != Ordering::Less,
                "is greater than or equal to the maximum of",
            ),
            _ => return,
        };
        if failed {
            out.push(location.error(keyword, format!("{} {} {}", number, message, limit)));
        }
    }

    fn check_any_of(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let Value::Array(members) = value else {
            return;
        };
        let mut context = Vec::new();
        for index in 0..members.len() {
            let errors = self.branch(cx, instance, schema, "anyOf", Some(index.into()), location);
            if errors.is_empty() {
                return;
            }
            context.extend(errors);
        }
        out.push(
            location
                .error(
                    "anyOf",
                    format!("{} is not valid under any of the given schemas", describe(instance)),
                )
                .with_context(context),
        );
    }

    fn check_one_of(
        &mut self,
        cx: &mut ResolutionContext<'_>,
        instance: &Value,
        schema: &Resolved,
        value: &Value,
        location: &mut Location,
        out: &mut Vec<ValidationError>,
    ) {
        let Value::Array(members) = value else {
            return;
        };
        let mut context = Vec::new();
        let mut matched = Vec::new();
        for index in 0..members.len() {
            let errors = self.branch(cx, instance, schema, "oneOf", Some(index.into()), location);
            if errors.is_empty() {
                matched.push(index);
            } else {
                context.extend(errors);
            }
        }

        match matched.len() {
            1 => {}
            0 => out.push(
                location
                    .error(
                        "oneOf",
                        format!("{} is not valid under any of the given schemas", describe(instance)),
                    )
                    .with_context(context),
            ),
            _ => out.push(location.error(
                "oneOf",
                format!(
                    "{} is valid under more than one of the given schemas (branches {})",
                    describe(instance),
                    matched.iter().map(ToString::to_string).collect::<Vec<_>>().join(", ")
                ),
            )),
        }
    }
}

fn type_matches(instance: &Value, name: &str) -> bool {
    match name {
        "null" => instance.is_null(),
        "boolean" => instance.is_boolean(),
        "object" => instance.is_object(),
        "array" => instance.is_array(),
        "string" => instance.is_string(),
        "number" => instance.is_number(),
        "integer" => numeric::is_integer(instance),
        _ => false,
    }
}

/// Validate `instance` against `schema` with a fresh keyword validator
pub fn check_keywords(
    instance: &Value,
    schema: &Resolved,
    cx: &mut ResolutionContext<'_>,
    dialect: Dialect,
) -> Vec<ValidationError> {
    KeywordValidator::new(dialect).check(cx, instance, schema, &[])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::Document;
    use crate::loader::InMemoryProvider;
    use crate::validator::ErrorKind;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::sync::Arc;

    fn run(dialect: Dialect, schema: Value, instance: Value) -> Vec<ValidationError> {
        let provider = InMemoryProvider::new();
        let mut cx = ResolutionContext::new(&provider);
        let schema = Resolved::root(Arc::new(Document::inline(schema)));
        check_keywords(&instance, &schema, &mut cx, dialect)
    }

    fn messages(errors: &[ValidationError]) -> Vec<String> {
        errors.iter().map(|e| e.message.clone()).collect()
    }

    #[test]
    fn test_type() {
        let errors = run(Dialect::Draft2020, json!({"type": "string"}), json!(5));
        assert_eq!(messages(&errors), vec!["5 is not of type 'string'"]);
        assert_eq!(errors[0].schema_path, vec![PathSegment::from("type")]);

        assert!(run(Dialect::Draft2020, json!({"type": "integer"}), json!(2.0)).is_empty());
        assert!(run(Dialect::Draft4Oas30, json!({"type": "integer"}), json!(1e20)).is_empty());
        let errors = run(Dialect::Draft4Oas30, json!({"type": "integer", "format": "int64"}), json!(1e20));
        assert_eq!(errors[0].schema_path, vec![PathSegment::from("format")]);
        assert!(run(Dialect::Draft2020, json!({"type": ["string", "null"]}), json!(null)).is_empty());
        let errors = run(Dialect::Draft2020, json!({"type": ["string", "null"]}), json!(1.5));
        assert_eq!(messages(&errors), vec!["1.5 is not of type 'string', 'null'"]);
    }

    #[test]
    fn test_nullable_only_in_oas30_dialect() {
        let schema = json!({"type": "string", "nullable": true});
        assert!(run(Dialect::Draft4Oas30, schema.clone(), json!(null)).is_empty());
        assert_eq!(run(Dialect::Draft2020, schema, json!(null)).len(), 1);
    }

    #[test]
    fn test_required_and_properties() {
        let schema = json!({
            "type": "object",
            "required": ["name", "id"],
            "properties": {"name": {"type": "string"}, "tags": {"items": {"type": "string"}}}
        });
        let errors = run(Dialect::Draft2020, schema, json!({"name": 3, "tags": ["a", 1]}));

        assert_eq!(
            messages(&errors),
            vec![
                "'id' is a required property",
                "3 is not of type 'string'",
                "1 is not of type 'string'",
            ]
        );
        assert_eq!(errors[1].path, vec![PathSegment::from("name")]);
        assert_eq!(errors[2].path, vec![PathSegment::from("tags"), PathSegment::from(1)]);
        assert_eq!(
            errors[2].schema_path,
            vec![
                PathSegment::from("properties"),
                PathSegment::from("tags"),
                PathSegment::from("items"),
                PathSegment::from("type"),
            ]
        );
    }

    #[test]
    fn test_additional_properties() {
        let schema = json!({
            "properties": {"openapi": {}},
            "patternProperties": {"^x-": {}},
            "additionalProperties": false
        });
        let errors = run(
            Dialect::Draft4Oas30,
            schema,
            json!({"openapi": "3.0.0", "x-internal": true, "webhooks": {}, "extra": 1}),
        );
        assert_eq!(
            messages(&errors),
            vec!["Additional properties are not allowed ('webhooks', 'extra' were unexpected)"]
        );
        assert!(errors[0].path.is_empty());
    }

    #[test]
    fn test_additional_properties_schema() {
        let schema = json!({"additionalProperties": {"type": "string"}});
        let errors = run(Dialect::Draft2020, schema, json!({"a": "x", "b": 2}));
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].path, vec![PathSegment::from("b")]);
    }

    #[test]
    fn test_draft4_exclusive_bounds() {
        let schema = json!({"minimum": 0, "exclusiveMinimum": true, "maximum": 10});
        assert_eq!(
            messages(&run(Dialect::Draft4Oas30, schema.clone(), json!(0))),
            vec!["0 is less than or equal to the minimum of 0"]
        );
        assert!(run(Dialect::Draft4Oas30, schema.clone(), json!(10)).is_empty());
        assert_eq!(
            messages(&run(Dialect::Draft4Oas30, schema, json!(11))),
            vec!["11 is greater than the maximum of 10"]
        );
    }

    #[test]
    fn test_draft2020_exclusive_bounds() {
        let schema = json!({"exclusiveMinimum": 0, "exclusiveMaximum": 1});
        assert_eq!(run(Dialect::Draft2020, schema.clone(), json!(0)).len(), 1);
        assert!(run(Dialect::Draft2020, schema.clone(), json!(0.5)).is_empty());
        assert_eq!(run(Dialect::Draft2020, schema, json!(1)).len(), 1);
    }

    #[test]
    fn test_multiple_of() {
        assert!(run(Dialect::Draft2020, json!({"multipleOf": 0.01}), json!(19.99)).is_empty());
        assert_eq!(
            messages(&run(Dialect::Draft2020, json!({"multipleOf": 2}), json!(7))),
            vec!["7 is not a multiple of 2"]
        );
    }

    #[test]
    fn test_string_keywords() {
        let schema = json!({"minLength": 2, "maxLength": 3, "pattern": "^[a-z]+$", "format": "date"});
        assert_eq!(
            messages(&run(Dialect::Draft2020, schema.clone(), json!("ab"))),
            vec!["'ab' is not a 'date'"]
        );
        let errors = run(Dialect::Draft2020, schema.clone(), json!("é"));
        assert_eq!(
            messages(&errors),
            vec![
                "'é' is too short",
                "'é' does not match '^[a-z]+$'",
                "'é' is not a 'date'",
            ]
        );
        assert!(run(Dialect::Draft2020, json!({"maxLength": 2}), json!("éé")).is_empty());
    }

    #[test]
    fn test_enum_const_and_unique_items() {
        assert_eq!(
            messages(&run(Dialect::Draft2020, json!({"enum": ["a", "b"]}), json!("c"))),
            vec!["'c' is not one of [\"a\",\"b\"]"]
        );
        assert!(run(Dialect::Draft2020, json!({"enum": [1]}), json!(1.0)).is_empty());
        assert_eq!(
            messages(&run(Dialect::Draft2020, json!({"const": "x"}), json!("y"))),
            vec!["'x' was expected"]
        );
        assert_eq!(
            run(Dialect::Draft2020, json!({"uniqueItems": true}), json!([1, 2, 1.0])).len(),
            1
        );
    }

    #[test]
    fn test_one_of_attribution() {
        let schema = json!({"oneOf": [{"type": "string"}, {"type": "object", "required": ["$ref"]}]});
        let errors = run(Dialect::Draft2020, schema, json!(5));

        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].message, "5 is not valid under any of the given schemas");
        assert_eq!(errors[0].schema_path, vec![PathSegment::from("oneOf")]);
        assert_eq!(errors[0].context.len(), 2);
        assert_eq!(
            errors[0].context[1].schema_path,
            vec![PathSegment::from("oneOf"), PathSegment::from(1), PathSegment::from("type")]
        );
    }

    #[test]
    fn test_one_of_multiple_matches() {
        let schema = json!({"oneOf": [{"type": "number"}, {"type": "integer"}, {"type": "string"}]});
        let errors = run(Dialect::Draft2020, schema, json!(5));
        assert_eq!(
            messages(&errors),
            vec!["5 is valid under more than one of the given schemas (branches 0, 1)"]
        );
    }

    #[test]
    fn test_any_of_all_not_and_if() {
        let schema = json!({
            "anyOf": [{"type": "string"}, {"minimum": 10}],
            "allOf": [{"maximum": 20}],
            "not": {"const": 15}
        });
        assert!(run(Dialect::Draft2020, schema.clone(), json!(12)).is_empty());
        assert_eq!(run(Dialect::Draft2020, schema.clone(), json!(15)).len(), 1);
        assert_eq!(run(Dialect::Draft2020, schema, json!(25)).len(), 1);

        let schema = json!({
            "if": {"properties": {"in": {"const": "path"}}, "required": ["in"]},
            "then": {"required": ["required"]},
            "else": {"properties": {"required": {"type": "boolean"}}}
        });
        assert_eq!(
            messages(&run(Dialect::Draft2020, schema.clone(), json!({"in": "path"}))),
            vec!["'required' is a required property"]
        );
        assert!(run(Dialect::Draft2020, schema.clone(), json!({"in": "query"})).is_empty());
        assert_eq!(
            run(Dialect::Draft2020, schema, json!({"in": "query", "required": 1}))[0].schema_path[0],
            PathSegment::from("else")
        );
    }

    #[test]
    fn test_items_dialects() {
        let tuple = json!({"items": [{"type": "string"}], "additionalItems": false});
        assert_eq!(
            messages(&run(Dialect::Draft4Oas30, tuple, json!(["a", 1, 2]))),
            vec!["Additional items are not allowed (2 unexpected)"]
        );

        let prefix = json!({"prefixItems": [{"type": "string"}], "items": {"type": "integer"}});
        assert!(run(Dialect::Draft2020, prefix.clone(), json!(["a", 1, 2])).is_empty());
        let errors = run(Dialect::Draft2020, prefix, json!([1, "b"]));
        assert_eq!(errors.len(), 2);
        assert_eq!(errors[1].path, vec![PathSegment::from(1)]);
    }

    #[test]
    fn test_object_keywords_2020() {
        let schema = json!({
            "propertyNames": {"pattern": "^[a-z]+$"},
            "minProperties": 1,
            "dependentRequired": {"a": ["b"]},
            "dependentSchemas": {"c": {"required": ["d"]}}
        });
        let errors = run(Dialect::Draft2020, schema.clone(), json!({"a": 1, "c": 2, "X": 3}));
        assert_eq!(
            messages(&errors),
            vec![
                "'X' does not match '^[a-z]+$'",
                "'b' is a dependency of 'a'",
                "'d' is a required property",
            ]
        );
        assert_eq!(
            messages(&run(Dialect::Draft2020, schema, json!({}))),
            vec!["{} does not have enough properties"]
        );
    }

    #[test]
    fn test_contains() {
        let schema = json!({"contains": {"type": "string"}});
        assert!(run(Dialect::Draft2020, schema.clone(), json!([1, "a"])).is_empty());
        assert_eq!(run(Dialect::Draft2020, schema, json!([1, 2])).len(), 1);
    }

    #[test]
    fn test_boolean_schemas() {
        assert!(run(Dialect::Draft2020, json!(true), json!({"anything": 1})).is_empty());
        assert_eq!(
            messages(&run(Dialect::Draft2020, json!(false), json!(1))),
            vec!["False schema does not allow 1"]
        );
        let errors = run(Dialect::Draft2020, json!({"properties": {"a": false}}), json!({"a": 1}));
        assert_eq!(errors[0].path, vec![PathSegment::from("a")]);
    }

    #[test]
    fn test_ref_semantics_per_dialect() {
        let schema = json!({
            "$defs": {"Name": {"type": "string"}},
            "properties": {"name": {"$ref": "#/$defs/Name", "minLength": 5}}
        });
        let draft4 = run(Dialect::Draft4Oas30, schema.clone(), json!({"name": "abc"}));
        assert!(draft4.is_empty());
        let draft2020 = run(Dialect::Draft2020, schema.clone(), json!({"name": "abc"}));
        assert_eq!(messages(&draft2020), vec!["'abc' is too short"]);

        let errors = run(Dialect::Draft2020, schema, json!({"name": 1}));
        assert_eq!(
            errors[0].schema_path,
            vec![
                PathSegment::from("properties"),
                PathSegment::from("name"),
                PathSegment::from("$ref"),
                PathSegment::from("type"),
            ]
        );
    }

    #[test]
    fn test_unresolvable_ref_reported_in_place() {
        let errors = run(
            Dialect::Draft4Oas30,
            json!({"properties": {"a": {"$ref": "#/definitions/Missing"}}}),
            json!({"a": 1}),
        );
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].kind, ErrorKind::UnresolvableReference);
        assert_eq!(errors[0].path, vec![PathSegment::from("a")]);
    }

    #[test]
    fn test_recursive_schema_terminates() {
        let schema = json!({
            "$defs": {
                "Node": {
                    "type": "object",
                    "properties": {"children": {"type": "array", "items": {"$ref": "#/$defs/Node"}}}
                },
                "Loop": {"allOf": [{"$ref": "#/$defs/Loop"}]}
            },
            "properties": {
                "tree": {"$ref": "#/$defs/Node"},
                "loop": {"$ref": "#/$defs/Loop"}
            }
        });
        let instance = json!({
            "tree": {"children": [{"children": []}, {"children": [{"children": 5}]}]},
            "loop": 1
        });
        let errors = run(Dialect::Draft2020, schema, instance);
        assert_eq!(messages(&errors), vec!["5 is not of type 'array'"]);
    }

    #[test]
    fn test_describe_truncates() {
        let long = Value::String("x".repeat(200));
        let rendered = describe(&long);
        assert!(rendered.ends_with("..."));
        assert_eq!(rendered.chars().count(), MAX_RENDERED_LEN + 3);
    }
}

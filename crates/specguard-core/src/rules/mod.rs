//! Semantic rules
//!
//! Checks that a meta-schema cannot express: cross-references between
//! path templates and parameters, server URL variables, discriminator
//! mappings, request/response visibility of properties and similar.
//!
//! Every rule is a stateless unit struct implementing [`SemanticRule`]. The
//! walker in [`crate::validator`] calls each rule at the sites it declares in
//! [`SemanticRule::scopes`]; a rule's id leads the `schema_path` of every
//! error it raises.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

pub mod objects;
pub mod paths;
pub mod schema;
pub mod servers;

pub use objects::{ExclusiveKeywords, LicenseIdentifier};
pub use paths::{DuplicateParameters, DuplicatePaths, OperationIdUnique, PathParameters};
pub use schema::{DiscriminatorMapping, ReadWriteOnly, RequiredProperties, SchemaDefault};
pub use servers::ServerVariables;

use crate::document::{PathSegment, RefKey, Resolved};
use crate::keywords::{Dialect, KeywordValidator};
use crate::resolver::{reference_of, ResolutionContext};
use crate::validator::ValidationError;
use crate::versioning::VersionSpec;
use serde_json::{Map, Value};
use std::collections::HashSet;

/// HTTP methods that may appear as operations of a path item
pub const METHODS: [&str; 8] = ["get", "put", "post", "delete", "options", "head", "patch", "trace"];

/// Rules shared by every supported version
pub const V30_RULES: &[&dyn SemanticRule] = &[
    &ReadWriteOnly,
    &DiscriminatorMapping,
    &ServerVariables,
    &PathParameters,
    &RequiredProperties,
    &SchemaDefault,
    &DuplicateParameters,
    &OperationIdUnique,
    &DuplicatePaths,
    &ExclusiveKeywords,
];

/// The 3.0 rules plus checks for constructs introduced in 3.1
pub const V31_RULES: &[&dyn SemanticRule] = &[
    &ReadWriteOnly,
    &DiscriminatorMapping,
    &ServerVariables,
    &PathParameters,
    &RequiredProperties,
    &SchemaDefault,
    &DuplicateParameters,
    &OperationIdUnique,
    &DuplicatePaths,
    &ExclusiveKeywords,
    &LicenseIdentifier,
];

/// Kind of location a rule runs at
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Scope {
    Document,
    Info,
    Server,
    PathItem,
    /// Parameter and header objects
    Parameter,
    MediaType,
    Schema,
    /// A schema revisited under a request or response it is referenced from
    ReferencedSchema,
}

/// Whether a media type describes data sent to or returned by the API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Usage {
    Request,
    Response,
    Neutral,
}

/// A location together with what the walker knows about its surroundings
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Site<'a> {
    Document,
    Info,
    Server,
    /// `template` is the path key for entries of `paths`
    PathItem { template: Option<&'a str> },
    Parameter { header: bool },
    MediaType { usage: Usage },
    /// `usage` is inherited from the enclosing media type
    Schema { all_of_member: bool, usage: Usage },
    /// A schema that is walked at its own location, seen again through a
    /// reference from a request or response
    ReferencedSchema { all_of_member: bool, usage: Usage },
}

impl Site<'_> {
    pub fn scope(&self) -> Scope {
        match self {
            Site::Document => Scope::Document,
            Site::Info => Scope::Info,
            Site::Server => Scope::Server,
            Site::PathItem { .. } => Scope::PathItem,
            Site::Parameter { .. } => Scope::Parameter,
            Site::MediaType { .. } => Scope::MediaType,
            Site::Schema { .. } => Scope::Schema,
            Site::ReferencedSchema { .. } => Scope::ReferencedSchema,
        }
    }
}

/// The node a rule is asked to check
#[derive(Debug, Clone, Copy)]
pub struct Node<'a> {
    pub site: Site<'a>,
    /// The node itself, with any reference already followed
    pub at: &'a Resolved,
    /// Where errors about this node are reported
    pub path: &'a [PathSegment],
}

impl<'a> Node<'a> {
    pub fn value(&self) -> &'a Value {
        self.at.node()
    }

    pub fn object(&self) -> Option<&'a Map<String, Value>> {
        self.at.node().as_object()
    }

    /// Report path below this node
    pub fn path_to<I, S>(&self, segments: I) -> Vec<PathSegment>
    where
        I: IntoIterator<Item = S>,
        S: Into<PathSegment>,
    {
        let mut path = self.path.to_vec();
        path.extend(segments.into_iter().map(Into::into));
        path
    }
}

/// Run state available to rules
pub struct RuleContext<'a, 'p> {
    pub resolution: &'a mut ResolutionContext<'p>,
    pub keywords: &'a mut KeywordValidator,
    pub spec: &'static VersionSpec,
}

impl RuleContext<'_, '_> {
    /// Target of a possibly-referencing node; unresolvable references are
    /// reported by the walker, so rules just skip them
    pub fn resolve(&mut self, at: &Resolved) -> Option<Resolved> {
        self.resolution.resolve(at).ok().map(|resolution| resolution.target)
    }

    pub fn dialect(&self) -> Dialect {
        self.spec.dialect
    }
}

/// A check beyond structural validation
pub trait SemanticRule: Send + Sync {
    /// Stable identifier; first segment of the errors' schema path
    fn id(&self) -> &'static str;

    /// Sites the rule applies to
    fn scopes(&self) -> &'static [Scope];

    fn check(&self, node: &Node<'_>, cx: &mut RuleContext<'_, '_>) -> Vec<ValidationError>;

    fn applies_to(&self, scope: Scope) -> bool {
        self.scopes().contains(&scope)
    }
}

/// Names between `{` and `}` in a path template or server URL, first
/// occurrence only
pub fn template_variables(template: &str) -> Vec<&str> {
    let mut names: Vec<&str> = Vec::new();
    let mut rest = template;
    while let Some(open) = rest.find('{') {
        let after = &rest[open + 1..];
        let Some(close) = after.find('}') else {
            break;
        };
        let name = &after[..close];
        if !names.contains(&name) {
            names.push(name);
        }
        rest = &after[close + 1..];
    }
    names
}

/// Properties and required names of a schema, gathered through `$ref` and
/// `allOf`
#[derive(Debug, Default)]
pub struct EffectiveSchema {
    pub required: Vec<String>,
    pub properties: Vec<(String, Resolved)>,
}

impl EffectiveSchema {
    pub fn property(&self, name: &str) -> Option<&Resolved> {
        self.properties
            .iter()
            .find(|(candidate, _)| candidate == name)
            .map(|(_, schema)| schema)
    }

    pub fn declares(&self, name: &str) -> bool {
        self.property(name).is_some()
    }
}

pub fn effective_schema(cx: &mut RuleContext<'_, '_>, schema: &Resolved) -> EffectiveSchema {
    let mut effective = EffectiveSchema::default();
    let mut seen = HashSet::new();
    collect_effective(cx, schema, &mut seen, &mut effective);
    effective
}

fn collect_effective(
    cx: &mut RuleContext<'_, '_>,
    schema: &Resolved,
    seen: &mut HashSet<RefKey>,
    effective: &mut EffectiveSchema,
) {
    if !seen.insert(schema.key()) {
        return;
    }
    if let Some(reference) = reference_of(schema.node()) {
        if let Ok(target) = cx.resolution.resolve_step(schema, reference) {
            collect_effective(cx, &target, seen, effective);
        }
        if cx.dialect().ref_overrides_siblings() {
            return;
        }
    }
    let Some(map) = schema.node().as_object() else {
        return;
    };

    for name in map
        .get("required")
        .and_then(Value::as_array)
        .into_iter()
        .flatten()
        .filter_map(Value::as_str)
    {
        if !effective.required.iter().any(|known| known == name) {
            effective.required.push(name.to_string());
        }
    }
    if let Some(properties) = map.get("properties").and_then(Value::as_object) {
        for name in properties.keys() {
            if !effective.declares(name) {
                let property = schema.child("properties").child(name.as_str());
                effective.properties.push((name.clone(), property));
            }
        }
    }
    if let Some(members) = map.get("allOf").and_then(Value::as_array) {
        for index in 0..members.len() {
            collect_effective(cx, &schema.child("allOf").child(index), seen, effective);
        }
    }
}

//! Semantic traversal of an OpenAPI document
//!
//! The walker visits every OpenAPI object in a fixed order, runs the rules
//! registered for each site and follows references on demand. Targets in the
//! root document are visited at their own location; targets in other
//! documents are checked against the meta-schema definition for their kind
//! and walked once, under the path of the first reference that reached them.
//! Schemas below a request body or a response carry that usage; a schema
//! reached from there by reference is revisited for the usage-dependent
//! rules only.
//!
//! Copyright (c) 2025 Specguard Team
//! Licensed under the Apache-2.0 license

use crate::document::{child_path, PathSegment, RefKey, Resolved};
use crate::keywords::KeywordValidator;
use crate::resolver::{reference_of, ResolutionContext};
use crate::rules::{Node, RuleContext, Site, Usage, METHODS};
use crate::validator::{ErrorAggregate, ValidationError, ValidatorConfig};
use crate::versioning::{NodeKind, VersionSpec};
use std::collections::HashSet;
use tracing::trace;
use url::Url;

/// Where a possibly-referencing node leads
enum Followed {
    /// Walk the node here: it is inline, or an external target seen first here
    Here(Resolved),
    /// The target is walked at its own location
    Elsewhere(Resolved),
    /// The reference failed; the error is already recorded
    Broken,
}

fn join(path: &[PathSegment], first: impl Into<PathSegment>, second: impl Into<PathSegment>) -> Vec<PathSegment> {
    let mut joined = child_path(path, first);
    joined.push(second.into());
    joined
}

/// Entries of a mapping node
fn entries(container: &Resolved) -> Vec<(String, Resolved)> {
    let names: Vec<String> = match container.node().as_object() {
        Some(map) => map.keys().cloned().collect(),
        None => return Vec::new(),
    };
    names
        .into_iter()
        .map(|name| {
            let child = container.child(name.as_str());
            (name, child)
        })
        .collect()
}

/// Entries of the mapping stored under `key`
fn members(owner: &Resolved, key: &str) -> Vec<(String, Resolved)> {
    owner.get(key).map(|container| entries(&container)).unwrap_or_default()
}

/// Like [`members`] for maps that also admit `x-` extensions
fn members_without_extensions(owner: &Resolved, key: &str) -> Vec<(String, Resolved)> {
    let mut found = members(owner, key);
    found.retain(|(name, _)| !name.starts_with("x-"));
    found
}

/// Elements of the sequence stored under `key`
fn elements(owner: &Resolved, key: &str) -> Vec<Resolved> {
    let Some(container) = owner.get(key) else {
        return Vec::new();
    };
    let count = container.node().as_array().map_or(0, Vec::len);
    (0..count).map(|index| container.child(index)).collect()
}

/// A schema nested in another, as the walker descends into it
struct Subschema {
    at: Resolved,
    path: Vec<PathSegment>,
    all_of_member: bool,
    usage: Usage,
}

/// Schemas nested directly in `at`
///
/// Only keywords that describe the instance itself, or its members, pass
/// the request/response usage on; `not`, `if`, `contains`,
/// `propertyNames` and definition maps are neutral.
fn subschemas(at: &Resolved, path: &[PathSegment], usage: Usage) -> Vec<Subschema> {
    let Some(map) = at.node().as_object() else {
        return Vec::new();
    };
    let mut found = Vec::new();

    for keyword in map.keys() {
        let keyword = keyword.as_str();
        let inherited = match keyword {
            "$defs" | "definitions" | "not" | "if" | "contains" | "propertyNames" => Usage::Neutral,
            _ => usage,
        };
        match keyword {
            "properties" | "patternProperties" | "dependentSchemas" | "$defs" | "definitions" => {
                for (name, schema) in members(at, keyword) {
                    found.push(Subschema {
                        at: schema,
                        path: join(path, keyword, name.as_str()),
                        all_of_member: false,
                        usage: inherited,
                    });
                }
            }
            "items" | "additionalItems" | "prefixItems" | "anyOf" | "oneOf" | "allOf" => {
                let child = at.child(keyword);
                if child.node().is_array() {
                    for (index, schema) in elements(at, keyword).into_iter().enumerate() {
                        found.push(Subschema {
                            at: schema,
                            path: join(path, keyword, index),
                            all_of_member: keyword == "allOf",
                            usage: inherited,
                        });
                    }
                } else if child.node().is_object() {
                    found.push(Subschema {
                        at: child,
                        path: child_path(path, keyword),
                        all_of_member: false,
                        usage: inherited,
                    });
                }
            }
            "additionalProperties" | "not" | "if" | "then" | "else" | "contains" | "propertyNames"
            | "unevaluatedItems" | "unevaluatedProperties" => {
                let child = at.child(keyword);
                if child.node().is_object() {
                    found.push(Subschema {
                        at: child,
                        path: child_path(path, keyword),
                        all_of_member: false,
                        usage: inherited,
                    });
                }
            }
            _ => {}
        }
    }
    found
}

pub(crate) struct Walker<'c, 'p> {
    spec: &'static VersionSpec,
    config: &'c ValidatorConfig,
    resolution: ResolutionContext<'p>,
    keywords: KeywordValidator,
    errors: ErrorAggregate,
    visited: HashSet<RefKey>,
    root_origin: Url,
}

impl<'c, 'p> Walker<'c, 'p> {
    pub fn new(
        spec: &'static VersionSpec,
        config: &'c ValidatorConfig,
        resolution: ResolutionContext<'p>,
        root_origin: Url,
    ) -> Self {
        Self {
            spec,
            config,
            resolution,
            keywords: KeywordValidator::new(spec.dialect),
            errors: ErrorAggregate::new(),
            visited: HashSet::new(),
            root_origin,
        }
    }

    pub fn finish(self) -> ErrorAggregate {
        self.errors
    }

    /// Keyword-validate the whole document against the meta-schema
    pub fn structural(&mut self, root: &Resolved) {
        let meta = self.spec.meta_root();
        let errors = self.keywords.check(&mut self.resolution, root.node(), &meta, &[]);
        trace!(count = errors.len(), "structural pass finished");
        self.errors.extend(errors);
    }

    /// Semantic walk over the whole document
    pub fn walk(&mut self, root: &Resolved) {
        if let Some(info) = root.get("info") {
            self.apply_rules(Site::Info, &info, &[PathSegment::from("info")]);
        }
        self.walk_servers(root, &[]);

        for (template, item) in members_without_extensions(root, "paths") {
            let path = join(&[], "paths", template.as_str());
            self.walk_path_item(&item, &path, Some(template.as_str()));
        }
        if self.spec.webhooks {
            for (name, item) in members(root, "webhooks") {
                let path = join(&[], "webhooks", name.as_str());
                self.walk_path_item(&item, &path, None);
            }
        }
        if let Some(components) = root.get("components") {
            self.walk_components(&components);
        }

        self.apply_rules(Site::Document, root, &[]);
    }

    fn apply_rules(&mut self, site: Site<'_>, at: &Resolved, path: &[PathSegment]) {
        let spec = self.spec;
        let scope = site.scope();
        for rule in spec.rules {
            if !rule.applies_to(scope) || !self.config.rule_enabled(rule.id()) {
                continue;
            }
            let mut cx = RuleContext {
                resolution: &mut self.resolution,
                keywords: &mut self.keywords,
                spec,
            };
            let errors = rule.check(&Node { site, at, path }, &mut cx);
            self.errors.extend(errors);
        }
    }

    fn follow_with(&mut self, at: &Resolved, path: &[PathSegment], kind: NodeKind) -> Followed {
        if reference_of(at.node()).is_none() {
            return Followed::Here(at.clone());
        }
        let target = match self.resolution.resolve(at) {
            Ok(resolution) => resolution.target,
            Err(error) => {
                self.errors.push(ValidationError::reference(&error, path.to_vec(), Vec::new()));
                return Followed::Broken;
            }
        };
        if target.origin() == &self.root_origin || !self.visited.insert(target.key()) {
            return Followed::Elsewhere(target);
        }

        trace!(target_key = %target.key(), kind = kind.name(), "walking external target");
        if let Some(definition) = self.spec.definition(kind) {
            let errors = self.keywords.check(&mut self.resolution, target.node(), &definition, path);
            self.errors.extend(errors);
        }
        Followed::Here(target)
    }

    fn follow(&mut self, at: &Resolved, path: &[PathSegment], kind: NodeKind) -> Option<Resolved> {
        match self.follow_with(at, path, kind) {
            Followed::Here(target) => Some(target),
            Followed::Elsewhere(_) | Followed::Broken => None,
        }
    }

    fn walk_servers(&mut self, owner: &Resolved, path: &[PathSegment]) {
        for (index, server) in elements(owner, "servers").into_iter().enumerate() {
            self.apply_rules(Site::Server, &server, &join(path, "servers", index));
        }
    }

    fn walk_path_item(&mut self, at: &Resolved, path: &[PathSegment], template: Option<&str>) {
        match self.follow_with(at, path, NodeKind::PathItem) {
            Followed::Here(item) => {
                self.apply_rules(Site::PathItem { template }, &item, path);
                self.walk_servers(&item, path);
                self.walk_parameters(&item, path);
                for method in METHODS {
                    if let Some(operation) = item.get(method) {
                        self.walk_operation(&operation, &child_path(path, method));
                    }
                }
            }
            // The template only exists at the referencing location
            Followed::Elsewhere(item) if template.is_some() => {
                self.apply_rules(Site::PathItem { template }, &item, path);
            }
            Followed::Elsewhere(_) | Followed::Broken => {}
        }
    }

    fn walk_operation(&mut self, operation: &Resolved, path: &[PathSegment]) {
        self.walk_parameters(operation, path);
        if let Some(body) = operation.get("requestBody") {
            self.walk_request_body(&body, &child_path(path, "requestBody"));
        }
        for (status, response) in members_without_extensions(operation, "responses") {
            self.walk_response(&response, &join(path, "responses", status.as_str()));
        }
        for (name, callback) in members(operation, "callbacks") {
            self.walk_callback(&callback, &join(path, "callbacks", name.as_str()));
        }
        self.walk_servers(operation, path);
    }

    fn walk_parameters(&mut self, owner: &Resolved, path: &[PathSegment]) {
        for (index, parameter) in elements(owner, "parameters").into_iter().enumerate() {
            self.walk_parameter(&parameter, &join(path, "parameters", index), false);
        }
    }

    /// Parameter and header objects share their layout
    fn walk_parameter(&mut self, at: &Resolved, path: &[PathSegment], header: bool) {
        let kind = if header { NodeKind::Header } else { NodeKind::Parameter };
        let Some(parameter) = self.follow(at, path, kind) else {
            return;
        };
        self.apply_rules(Site::Parameter { header }, &parameter, path);
        if let Some(schema) = parameter.get("schema") {
            self.walk_schema(&schema, &child_path(path, "schema"), false, Usage::Neutral);
        }
        self.walk_content(&parameter, path, Usage::Neutral);
        self.walk_examples(&parameter, path);
    }

    fn walk_headers(&mut self, owner: &Resolved, path: &[PathSegment]) {
        for (name, header) in members(owner, "headers") {
            self.walk_parameter(&header, &join(path, "headers", name.as_str()), true);
        }
    }

    fn walk_examples(&mut self, owner: &Resolved, path: &[PathSegment]) {
        for (name, example) in members(owner, "examples") {
            self.follow(&example, &join(path, "examples", name.as_str()), NodeKind::Example);
        }
    }

    fn walk_content(&mut self, owner: &Resolved, path: &[PathSegment], usage: Usage) {
        for (media_type, media) in members(owner, "content") {
            let path = join(path, "content", media_type.as_str());
            self.apply_rules(Site::MediaType { usage }, &media, &path);
            if let Some(schema) = media.get("schema") {
                self.walk_schema(&schema, &child_path(&path, "schema"), false, usage);
            }
            self.walk_examples(&media, &path);
            for (name, encoding) in members(&media, "encoding") {
                self.walk_headers(&encoding, &join(&path, "encoding", name.as_str()));
            }
        }
    }

    fn walk_request_body(&mut self, at: &Resolved, path: &[PathSegment]) {
        if let Some(body) = self.follow(at, path, NodeKind::RequestBody) {
            self.walk_content(&body, path, Usage::Request);
        }
    }

    fn walk_response(&mut self, at: &Resolved, path: &[PathSegment]) {
        let Some(response) = self.follow(at, path, NodeKind::Response) else {
            return;
        };
        self.walk_headers(&response, path);
        self.walk_content(&response, path, Usage::Response);
        for (name, link) in members(&response, "links") {
            self.follow(&link, &join(path, "links", name.as_str()), NodeKind::Link);
        }
    }

    fn walk_callback(&mut self, at: &Resolved, path: &[PathSegment]) {
        let Some(callback) = self.follow(at, path, NodeKind::Callback) else {
            return;
        };
        let mut expressions = entries(&callback);
        expressions.retain(|(name, _)| !name.starts_with("x-"));
        for (expression, item) in expressions {
            self.walk_path_item(&item, &child_path(path, expression.as_str()), None);
        }
    }

    fn walk_schema(&mut self, at: &Resolved, path: &[PathSegment], all_of_member: bool, usage: Usage) {
        if reference_of(at.node()).is_some() {
            match self.follow_with(at, path, NodeKind::Schema) {
                Followed::Here(target) => self.walk_schema_keywords(&target, path, all_of_member, usage),
                Followed::Elsewhere(target) if usage != Usage::Neutral => {
                    let mut chain = HashSet::new();
                    self.walk_referenced_schema(&target, path, all_of_member, usage, &mut chain);
                }
                Followed::Elsewhere(_) | Followed::Broken => {}
            }
            // 3.0 ignores keywords next to `$ref`
            if self.spec.dialect.ref_overrides_siblings() {
                return;
            }
        }
        self.walk_schema_keywords(at, path, all_of_member, usage);
    }

    fn walk_schema_keywords(&mut self, at: &Resolved, path: &[PathSegment], all_of_member: bool, usage: Usage) {
        self.apply_rules(Site::Schema { all_of_member, usage }, at, path);
        for child in subschemas(at, path, usage) {
            self.walk_schema(&child.at, &child.path, child.all_of_member, child.usage);
        }
    }

    /// Revisit a schema walked at its own location for the checks that
    /// depend on request or response usage
    ///
    /// References are followed until one repeats along the current chain.
    /// Unresolvable references were already reported where they appear.
    fn walk_referenced_schema(
        &mut self,
        at: &Resolved,
        path: &[PathSegment],
        all_of_member: bool,
        usage: Usage,
        chain: &mut HashSet<RefKey>,
    ) {
        if usage == Usage::Neutral || !chain.insert(at.key()) {
            return;
        }
        if reference_of(at.node()).is_some() {
            if let Ok(resolution) = self.resolution.resolve(at) {
                self.walk_referenced_schema(&resolution.target, path, all_of_member, usage, chain);
            }
            if self.spec.dialect.ref_overrides_siblings() {
                chain.remove(&at.key());
                return;
            }
        }

        self.apply_rules(Site::ReferencedSchema { all_of_member, usage }, at, path);
        for child in subschemas(at, path, usage) {
            self.walk_referenced_schema(&child.at, &child.path, child.all_of_member, child.usage, chain);
        }
        chain.remove(&at.key());
    }

    fn walk_components(&mut self, components: &Resolved) {
        let base = [PathSegment::from("components")];

        for (name, schema) in members(components, "schemas") {
            self.walk_schema(&schema, &join(&base, "schemas", name.as_str()), false, Usage::Neutral);
        }
        for (name, response) in members(components, "responses") {
            self.walk_response(&response, &join(&base, "responses", name.as_str()));
        }
        for (name, parameter) in members(components, "parameters") {
            self.walk_parameter(&parameter, &join(&base, "parameters", name.as_str()), false);
        }
        for (name, example) in members(components, "examples") {
            self.follow(&example, &join(&base, "examples", name.as_str()), NodeKind::Example);
        }
        for (name, body) in members(components, "requestBodies") {
            self.walk_request_body(&body, &join(&base, "requestBodies", name.as_str()));
        }
        for (name, header) in members(components, "headers") {
            self.walk_parameter(&header, &join(&base, "headers", name.as_str()), true);
        }
        for (name, scheme) in members(components, "securitySchemes") {
            self.follow(&scheme, &join(&base, "securitySchemes", name.as_str()), NodeKind::SecurityScheme);
        }
        for (name, link) in members(components, "links") {
            self.follow(&link, &join(&base, "links", name.as_str()), NodeKind::Link);
        }
        for (name, callback) in members(components, "callbacks") {
            self.walk_callback(&callback, &join(&base, "callbacks", name.as_str()));
        }
        if self.spec.webhooks {
            for (name, item) in members(components, "pathItems") {
                self.walk_path_item(&item, &join(&base, "pathItems", name.as_str()), None);
            }
        }
    }
}

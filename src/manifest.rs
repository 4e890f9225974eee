// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Generic manifest documents, the bundle parser, and the kind-priority sorter.

use std::collections::BTreeMap;

use serde_yaml::{Mapping, Value};

use crate::endpoints::{self, Verb};
use crate::error::{Result, TenantryError};

/// Kinds that must exist before anything else in the same batch, in creation
/// order. Every other kind shares the default priority.
const KIND_PRIORITY: [&str; 3] = ["ProjectRequest", "Namespace", "RoleBindingRestriction"];

/// A single resource manifest, parsed from arbitrary YAML.
///
/// Accessors fail explicitly when a field is absent or has the wrong shape
/// instead of returning a silent default.
#[derive(Debug, Clone, PartialEq)]
pub struct ManifestObject {
    root: Value,
}

impl ManifestObject {
    pub fn from_value(value: Value) -> Result<Self> {
        match value {
            Value::Mapping(_) => Ok(Self { root: value }),
            other => Err(TenantryError::Manifest(format!(
                "expected a mapping at the top level, got {}",
                value_kind(&other)
            ))),
        }
    }

    pub fn from_yaml(document: &str) -> Result<Self> {
        let value: Value = serde_yaml::from_str(document)?;
        Self::from_value(value)
    }

    /// Decode a wire-format (JSON) body into a manifest. YAML is a superset
    /// of JSON, so the same parser covers both.
    pub fn from_slice(bytes: &[u8]) -> Result<Self> {
        let value: Value = serde_yaml::from_slice(bytes)?;
        Self::from_value(value)
    }

    pub fn kind(&self) -> Result<&str> {
        self.root
            .get("kind")
            .and_then(Value::as_str)
            .ok_or_else(|| TenantryError::Manifest("object has no string 'kind' field".to_string()))
    }

    pub fn set_kind(&mut self, kind: &str) {
        if let Value::Mapping(root) = &mut self.root {
            root.insert(Value::from("kind"), Value::from(kind));
        }
    }

    pub fn name(&self) -> Result<&str> {
        self.root
            .get("metadata")
            .and_then(|m| m.get("name"))
            .and_then(Value::as_str)
            .ok_or_else(|| {
                TenantryError::Manifest("object has no string 'metadata.name' field".to_string())
            })
    }

    /// The object's namespace. `Ok(None)` when the field is absent; an error
    /// when it is present but not a string.
    pub fn namespace(&self) -> Result<Option<&str>> {
        match self.root.get("metadata").and_then(|m| m.get("namespace")) {
            None => Ok(None),
            Some(Value::String(namespace)) => Ok(Some(namespace)),
            Some(_) => Err(TenantryError::Manifest(
                "'metadata.namespace' is not a string".to_string(),
            )),
        }
    }

    pub fn set_namespace(&mut self, namespace: &str) {
        if let Value::Mapping(root) = &mut self.root {
            let metadata = root
                .entry(Value::from("metadata"))
                .or_insert_with(|| Value::Mapping(Mapping::new()));
            if let Value::Mapping(metadata) = metadata {
                metadata.insert(Value::from("namespace"), Value::from(namespace));
            }
        }
    }

    pub fn labels(&self) -> Result<BTreeMap<String, String>> {
        let labels = self
            .root
            .get("metadata")
            .and_then(|m| m.get("labels"))
            .ok_or_else(|| {
                TenantryError::Manifest("object has no 'metadata.labels' field".to_string())
            })?;
        serde_yaml::from_value(labels.clone()).map_err(|_| {
            TenantryError::Manifest("'metadata.labels' is not a string map".to_string())
        })
    }

    /// Top-level field access for callers that inspect response documents.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.root.get(field)
    }

    /// The `message` field of an API `Status` reply, if any.
    pub fn message(&self) -> Option<&str> {
        self.root.get("message").and_then(Value::as_str)
    }

    /// The members of a bundle or list document stored under `field`.
    pub fn items(&self, field: &str) -> Result<Vec<ManifestObject>> {
        match self.root.get(field) {
            Some(Value::Sequence(items)) => items
                .iter()
                .cloned()
                .map(ManifestObject::from_value)
                .collect(),
            Some(_) => Err(TenantryError::Manifest(format!(
                "'{field}' is not a sequence"
            ))),
            None => Err(TenantryError::Manifest(format!(
                "document has no '{field}' field"
            ))),
        }
    }

    /// Serialize to the cluster's wire format.
    pub fn to_json(&self) -> Result<Vec<u8>> {
        serde_json::to_vec(&self.root).map_err(TenantryError::Serialize)
    }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a bool",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}

/// Parse one YAML document into an ordered sequence of manifests.
///
/// A top-level `Template` contributes its `objects`, a top-level `List` its
/// `items`; any other kind is a single manifest. Objects without a namespace
/// receive `default_namespace` (when non-empty), then the whole batch is
/// stably sorted by kind priority.
pub fn parse(document: &str, default_namespace: &str) -> Result<Vec<ManifestObject>> {
    let top = ManifestObject::from_yaml(document)?;
    let mut objects = match top.kind()? {
        "Template" => top.items("objects")?,
        "List" => top.items("items")?,
        _ => vec![top],
    };

    if !default_namespace.is_empty() {
        for object in &mut objects {
            if object.namespace()?.is_none() {
                object.set_namespace(default_namespace);
            }
        }
    }

    objects.sort_by_key(|object| object.kind().map(kind_priority).unwrap_or(KIND_PRIORITY.len()));
    Ok(objects)
}

fn kind_priority(kind: &str) -> usize {
    KIND_PRIORITY
        .iter()
        .position(|k| *k == kind)
        .unwrap_or(KIND_PRIORITY.len())
}

/// Pre-flight check, run before any network call: every object must have a
/// registered creation endpoint. A single unsupported kind aborts the whole
/// batch with zero side effects.
pub fn validate(objects: &[ManifestObject]) -> Result<()> {
    let mut unknown: Vec<&str> = Vec::new();
    for object in objects {
        let kind = object.kind()?;
        if endpoints::endpoint(Verb::Post, kind).is_none() && !unknown.contains(&kind) {
            unknown.push(kind);
        }
    }

    if unknown.is_empty() {
        Ok(())
    } else {
        Err(TenantryError::UnknownKinds(unknown.join(", ")))
    }
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The (verb, kind) endpoint table and URL template resolution.

use std::fmt;

use http::Method;

use crate::error::{Result, TenantryError};
use crate::manifest::ManifestObject;

/// HTTP action against the cluster API.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verb {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl Verb {
    pub fn method(self) -> Method {
        match self {
            Verb::Get => Method::GET,
            Verb::Post => Method::POST,
            Verb::Put => Method::PUT,
            Verb::Patch => Method::PATCH,
            Verb::Delete => Method::DELETE,
        }
    }

    /// Updates-by-patch go out as a merge patch; everything else is plain JSON.
    pub fn content_type(self) -> &'static str {
        match self {
            Verb::Patch => "application/merge-patch+json",
            _ => "application/json",
        }
    }
}

impl fmt::Display for Verb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.method().as_str())
    }
}

/// Collection path for a kind, with a `{namespace}` placeholder where the
/// resource is namespaced. Kinds absent from this table have no endpoints at
/// all.
fn collection(kind: &str) -> Option<&'static str> {
    Some(match kind {
        "Namespace" => "/api/v1/namespaces",
        "ConfigMap" => "/api/v1/namespaces/{namespace}/configmaps",
        "LimitRange" => "/api/v1/namespaces/{namespace}/limitranges",
        "PersistentVolumeClaim" => "/api/v1/namespaces/{namespace}/persistentvolumeclaims",
        "Pod" => "/api/v1/namespaces/{namespace}/pods",
        "ResourceQuota" => "/api/v1/namespaces/{namespace}/resourcequotas",
        "Secret" => "/api/v1/namespaces/{namespace}/secrets",
        "Service" => "/api/v1/namespaces/{namespace}/services",
        "ServiceAccount" => "/api/v1/namespaces/{namespace}/serviceaccounts",
        "Deployment" => "/apis/apps/v1/namespaces/{namespace}/deployments",
        "ReplicaSet" => "/apis/apps/v1/namespaces/{namespace}/replicasets",
        "Ingress" => "/apis/networking.k8s.io/v1/namespaces/{namespace}/ingresses",
        "ProjectRequest" => "/apis/project.openshift.io/v1/projectrequests",
        "Project" => "/apis/project.openshift.io/v1/projects",
        "RoleBinding" => "/apis/authorization.openshift.io/v1/namespaces/{namespace}/rolebindings",
        "RoleBindingRestriction" => {
            "/apis/authorization.openshift.io/v1/namespaces/{namespace}/rolebindingrestrictions"
        }
        "DeploymentConfig" => {
            "/apis/apps.openshift.io/v1/namespaces/{namespace}/deploymentconfigs"
        }
        "Route" => "/apis/route.openshift.io/v1/namespaces/{namespace}/routes",
        "BuildConfig" => "/apis/build.openshift.io/v1/namespaces/{namespace}/buildconfigs",
        "Build" => "/apis/build.openshift.io/v1/namespaces/{namespace}/builds",
        _ => return None,
    })
}

/// URL template for (verb, kind), or `None` when the combination is
/// unsupported. Some gaps are deliberate: a `ProjectRequest` can only be
/// created, and a `Project` only comes into existence through a request.
pub fn endpoint(verb: Verb, kind: &str) -> Option<String> {
    let collection = collection(kind)?;
    match (verb, kind) {
        (Verb::Post, "Project") => None,
        (Verb::Post, _) => Some(collection.to_string()),
        (_, "ProjectRequest") => None,
        _ => Some(format!("{collection}/{{name}}")),
    }
}

/// Resolve a URL template against the manifest's own namespace/name fields.
pub fn resolve(template: &str, object: &ManifestObject) -> Result<String> {
    let mut path = template.to_string();
    if path.contains("{namespace}") {
        let namespace = object.namespace()?.ok_or_else(|| {
            TenantryError::Manifest(format!(
                "object of kind {} has no namespace for endpoint {template}",
                object.kind().unwrap_or("?")
            ))
        })?;
        path = path.replace("{namespace}", namespace);
    }
    if path.contains("{name}") {
        path = path.replace("{name}", object.name()?);
    }
    Ok(path)
}

/// Item path for a named resource, without going through a manifest.
pub fn item_path(kind: &str, namespace: &str, name: &str) -> Option<String> {
    let template = endpoint(Verb::Get, kind)?;
    Some(template.replace("{namespace}", namespace).replace("{name}", name))
}

/// Collection path for listing a kind, optionally scoped by a label selector.
pub fn list_path(kind: &str, namespace: &str, selector: Option<&str>) -> Option<String> {
    let collection = collection(kind)?.replace("{namespace}", namespace);
    match selector {
        Some(selector) if !selector.is_empty() => {
            let query = url::form_urlencoded::Serializer::new(String::new())
                .append_pair("labelSelector", selector)
                .finish();
            Some(format!("{collection}?{query}"))
        }
        _ => Some(collection),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn object(yaml: &str) -> ManifestObject {
        ManifestObject::from_yaml(yaml).unwrap()
    }

    #[test]
    fn test_post_endpoint_is_the_collection() {
        assert_eq!(
            endpoint(Verb::Post, "ConfigMap").unwrap(),
            "/api/v1/namespaces/{namespace}/configmaps"
        );
    }

    #[test]
    fn test_item_endpoints_append_name() {
        assert_eq!(
            endpoint(Verb::Delete, "Service").unwrap(),
            "/api/v1/namespaces/{namespace}/services/{name}"
        );
        assert_eq!(
            endpoint(Verb::Get, "Namespace").unwrap(),
            "/api/v1/namespaces/{name}"
        );
    }

    #[test]
    fn test_project_request_is_post_only() {
        assert!(endpoint(Verb::Post, "ProjectRequest").is_some());
        assert!(endpoint(Verb::Get, "ProjectRequest").is_none());
        assert!(endpoint(Verb::Delete, "ProjectRequest").is_none());
    }

    #[test]
    fn test_project_has_no_creation_endpoint() {
        assert!(endpoint(Verb::Post, "Project").is_none());
        assert!(endpoint(Verb::Delete, "Project").is_some());
    }

    #[test]
    fn test_unknown_kind_has_no_endpoints() {
        assert!(endpoint(Verb::Post, "CronTab").is_none());
        assert!(endpoint(Verb::Get, "CronTab").is_none());
    }

    #[test]
    fn test_resolve_substitutes_namespace_and_name() {
        let object = object("kind: Service\nmetadata:\n  name: web\n  namespace: team\n");
        let path = resolve(&endpoint(Verb::Delete, "Service").unwrap(), &object).unwrap();
        assert_eq!(path, "/api/v1/namespaces/team/services/web");
    }

    #[test]
    fn test_resolve_fails_without_required_namespace() {
        let object = object("kind: Service\nmetadata:\n  name: web\n");
        assert!(resolve(&endpoint(Verb::Post, "Service").unwrap(), &object).is_err());
    }

    #[test]
    fn test_list_path_encodes_selector() {
        let path = list_path("Deployment", "team", Some("app=web,tier=front")).unwrap();
        assert_eq!(
            path,
            "/apis/apps/v1/namespaces/team/deployments?labelSelector=app%3Dweb%2Ctier%3Dfront"
        );
    }

    #[test]
    fn test_list_path_without_selector() {
        assert_eq!(
            list_path("DeploymentConfig", "team", None).unwrap(),
            "/apis/apps.openshift.io/v1/namespaces/team/deploymentconfigs"
        );
    }

    #[test]
    fn test_item_path() {
        assert_eq!(
            item_path("DeploymentConfig", "team", "app").unwrap(),
            "/apis/apps.openshift.io/v1/namespaces/team/deploymentconfigs/app"
        );
    }

    #[test]
    fn test_verb_content_types() {
        assert_eq!(Verb::Patch.content_type(), "application/merge-patch+json");
        assert_eq!(Verb::Post.content_type(), "application/json");
        assert_eq!(Verb::Delete.to_string(), "DELETE");
    }
}

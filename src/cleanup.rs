// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Best-effort bulk cleanup of tenant resources by label selector.

use bytes::Bytes;
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use tracing::{debug, instrument, warn};

use crate::apply::{apply, ApplyOptions};
use crate::constants::satellites;
use crate::endpoints::{self, Verb};
use crate::error::{Result, TenantryError};
use crate::manifest::ManifestObject;

/// Platform-specific kinds swept first, so builds and deploy machinery stop
/// producing new workloads mid-sweep.
const OPENSHIFT_KINDS: [&str; 4] = ["BuildConfig", "Build", "DeploymentConfig", "Route"];
const NATIVE_KINDS: [&str; 7] = [
    "Deployment",
    "ReplicaSet",
    "Service",
    "Secret",
    "Ingress",
    "ConfigMap",
    "ServiceAccount",
];

/// Sweep every cataloged kind in `namespace`, deleting all matches for
/// `selector`. For the primary tenant namespace the sweep also removes pods
/// and finally the namespace itself.
///
/// Deliberately the opposite of the apply engine's fail-fast policy: cleanup
/// is idempotent and safely re-runnable, so every failure is downgraded to a
/// warning and the sweep keeps going.
#[instrument(skip(options))]
pub async fn cleanup(
    options: &ApplyOptions,
    namespace: &str,
    selector: &str,
    openshift: bool,
) -> Result<()> {
    let options = options.for_namespace(namespace);
    let primary = is_primary_namespace(namespace);

    let mut kinds: Vec<&str> = Vec::new();
    if openshift {
        kinds.extend(OPENSHIFT_KINDS);
    }
    kinds.extend(NATIVE_KINDS);
    if primary {
        kinds.push("Pod");
    }

    for kind in kinds {
        if let Err(error) = sweep_kind(&options, kind, namespace, selector).await {
            warn!("Failed to sweep {} in {}: {}", kind, namespace, error);
        }
    }

    if primary {
        let kind = if openshift { "Project" } else { "Namespace" };
        match named_object(kind, namespace) {
            Ok(target) => {
                if let Err(error) = apply(&target, Verb::Delete, &options).await {
                    warn!("Failed to delete {} {}: {}", kind, namespace, error);
                }
            }
            Err(error) => warn!("Failed to delete {} {}: {}", kind, namespace, error),
        }
    }

    Ok(())
}

/// Satellite namespaces carry a fixed suffix; everything else is the primary
/// tenant namespace.
fn is_primary_namespace(namespace: &str) -> bool {
    !satellites::SUFFIXES
        .iter()
        .any(|suffix| namespace.ends_with(&format!("-{suffix}")))
}

async fn sweep_kind(
    options: &ApplyOptions,
    kind: &str,
    namespace: &str,
    selector: &str,
) -> Result<()> {
    let Some(path) = endpoints::list_path(kind, namespace, Some(selector)) else {
        return Ok(());
    };
    let client = options.client()?;
    let list = list_objects(&client, &path).await?;

    for mut item in list.items("items")? {
        // List items come back without a kind of their own.
        item.set_kind(kind);
        if item.namespace()?.is_none() {
            item.set_namespace(namespace);
        }
        let name = item.name().unwrap_or("?").to_string();
        match apply(&item, Verb::Delete, options).await {
            Ok(()) => debug!("Deleted {} {}/{}", kind, namespace, name),
            Err(error) => warn!("Failed to delete {} {}/{}: {}", kind, namespace, name, error),
        }
    }
    Ok(())
}

async fn list_objects(client: &Client, path: &str) -> Result<ManifestObject> {
    let request = http::Request::builder()
        .method(http::Method::GET)
        .uri(path)
        .header(http::header::ACCEPT, "application/json")
        .body(Body::from(Vec::new()))?;
    let response = client.send(request).await.map_err(TenantryError::Kube)?;
    let status = response.status();
    let bytes: Bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TenantryError::ResponseBody(e.to_string()))?
        .to_bytes();
    let list = ManifestObject::from_slice(&bytes)?;
    if !status.is_success() {
        return Err(TenantryError::Api {
            status: status.as_u16(),
            message: list.message().unwrap_or("request rejected").to_string(),
        });
    }
    Ok(list)
}

fn named_object(kind: &str, name: &str) -> Result<ManifestObject> {
    ManifestObject::from_value(serde_yaml::from_str(&format!(
        "kind: {kind}\nmetadata:\n  name: {name}\n"
    ))?)
}

// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Workload readiness polling across the two supported platforms.

use std::future::Future;
use std::time::Duration;

use bytes::Bytes;
use http_body_util::BodyExt;
use k8s_openapi::api::apps::v1::Deployment;
use kube::api::ListParams;
use kube::client::Body;
use kube::{Api, Client, ResourceExt};
use serde::Deserialize;
use tokio::time::{sleep, timeout};
use tracing::{debug, info, instrument};

use crate::apply::ApplyOptions;
use crate::endpoints;
use crate::error::{Result, TenantryError};
use crate::manifest::ManifestObject;

/// Replica counts as reported by a workload's status.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ReplicaCounts {
    pub available_replicas: i64,
    pub unavailable_replicas: i64,
}

impl ReplicaCounts {
    /// Ready means nothing is unavailable and something is available.
    pub fn is_ready(&self) -> bool {
        self.unavailable_replicas == 0 && self.available_replicas > 0
    }
}

/// Wait until the targeted workloads in the options' namespace are ready.
///
/// With `all` set, every workload currently in the namespace is waited for
/// instead of `targets`. One deadline is armed for the whole operation; when
/// it fires before every workload is ready the wait fails with a timeout.
/// Any status read error aborts the wait immediately.
#[instrument(skip(options, targets), fields(namespace = %options.namespace))]
pub async fn wait_for_ready(
    options: &ApplyOptions,
    targets: &[String],
    all: bool,
    max_wait: Duration,
    poll_interval: Duration,
) -> Result<()> {
    timeout(
        max_wait,
        wait_until_ready(options, targets, all, poll_interval),
    )
    .await
    .map_err(|_| TenantryError::Timeout(max_wait))?
}

async fn wait_until_ready(
    options: &ApplyOptions,
    targets: &[String],
    all: bool,
    poll_interval: Duration,
) -> Result<()> {
    let client = options.client()?;
    let namespace = options.namespace.clone();

    let deployments: Api<Deployment> = Api::namespaced(client.clone(), &namespace);
    let names = if all {
        deployments
            .list(&ListParams::default())
            .await?
            .items
            .iter()
            .map(|d| d.name_any())
            .collect()
    } else {
        targets.to_vec()
    };
    poll_until_ready(&names, poll_interval, |name| {
        let deployments = deployments.clone();
        async move {
            let deployment = deployments.get(&name).await?;
            let status = deployment.status.unwrap_or_default();
            Ok(ReplicaCounts {
                available_replicas: i64::from(status.available_replicas.unwrap_or(0)),
                unavailable_replicas: i64::from(status.unavailable_replicas.unwrap_or(0)),
            })
        }
    })
    .await?;

    // The platform-specific workload kind only exists when the cluster
    // identifies as OpenShift.
    if is_openshift(&client).await? {
        let names = if all {
            list_deployment_configs(&client, &namespace).await?
        } else {
            targets.to_vec()
        };
        poll_until_ready(&names, poll_interval, |name| {
            let client = client.clone();
            let namespace = namespace.clone();
            async move { deployment_config_counts(&client, &namespace, &name).await }
        })
        .await?;
    }

    Ok(())
}

/// The poll loop shared by both workload shapes, parameterized by how the
/// status is fetched.
async fn poll_until_ready<F, Fut>(names: &[String], poll_interval: Duration, fetch: F) -> Result<()>
where
    F: Fn(String) -> Fut,
    Fut: Future<Output = Result<ReplicaCounts>>,
{
    for name in names {
        loop {
            let counts = fetch(name.clone()).await?;
            if counts.is_ready() {
                info!(
                    "Workload {} is ready ({} available)",
                    name, counts.available_replicas
                );
                break;
            }
            debug!(
                "Workload {} not ready yet ({} unavailable, {} available)",
                name, counts.unavailable_replicas, counts.available_replicas
            );
            sleep(poll_interval).await;
        }
    }
    Ok(())
}

/// Whether the target cluster self-identifies as OpenShift.
pub async fn is_openshift(client: &Client) -> Result<bool> {
    let response = client
        .send(get_request("/apis/project.openshift.io")?)
        .await
        .map_err(TenantryError::Kube)?;
    Ok(response.status().is_success())
}

async fn deployment_config_counts(
    client: &Client,
    namespace: &str,
    name: &str,
) -> Result<ReplicaCounts> {
    // Registered for every verb, so this is always Some.
    let Some(path) = endpoints::item_path("DeploymentConfig", namespace, name) else {
        return Ok(ReplicaCounts::default());
    };
    let object = fetch_object(client, &path).await?;
    match object.get("status") {
        Some(status) => serde_yaml::from_value(status.clone()).map_err(TenantryError::Parse),
        None => Ok(ReplicaCounts::default()),
    }
}

async fn list_deployment_configs(client: &Client, namespace: &str) -> Result<Vec<String>> {
    let Some(path) = endpoints::list_path("DeploymentConfig", namespace, None) else {
        return Ok(Vec::new());
    };
    let list = fetch_object(client, &path).await?;
    list.items("items")?
        .iter()
        .map(|item| item.name().map(str::to_string))
        .collect()
}

async fn fetch_object(client: &Client, path: &str) -> Result<ManifestObject> {
    let response = client
        .send(get_request(path)?)
        .await
        .map_err(TenantryError::Kube)?;
    let status = response.status();
    let bytes: Bytes = response
        .into_body()
        .collect()
        .await
        .map_err(|e| TenantryError::ResponseBody(e.to_string()))?
        .to_bytes();
    let object = ManifestObject::from_slice(&bytes)?;
    if !status.is_success() {
        return Err(TenantryError::Api {
            status: status.as_u16(),
            message: object.message().unwrap_or("request rejected").to_string(),
        });
    }
    Ok(object)
}

fn get_request(path: &str) -> Result<http::Request<Body>> {
    http::Request::builder()
        .method(http::Method::GET)
        .uri(path)
        .header(http::header::ACCEPT, "application/json")
        .body(Body::from(Vec::new()))
        .map_err(TenantryError::Http)
}

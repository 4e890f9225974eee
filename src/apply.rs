// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! The apply engine: credentials, one-shot HTTP actions with an optional
//! retry decision callback, and the ordered fail-fast batch.

use std::sync::Arc;

use bytes::Bytes;
use http_body_util::BodyExt;
use kube::client::Body;
use kube::{Client, Config as KubeConfig};
use tokio::time::sleep;
use tracing::{debug, instrument};

use crate::constants::CREATE_SETTLE_DELAY;
use crate::endpoints::{self, Verb};
use crate::error::{Result, TenantryError};
use crate::manifest::{self, ManifestObject};

/// How to reach the cluster API. The token is treated as opaque.
#[derive(Clone)]
pub struct Credentials {
    pub api_url: String,
    pub token: String,
    pub insecure_skip_tls_verify: bool,
    transport: Option<Client>,
}

impl Credentials {
    pub fn new(api_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            api_url: api_url.into(),
            token: token.into(),
            insecure_skip_tls_verify: false,
            transport: None,
        }
    }

    /// Use a pre-built client instead of dialing `api_url`. Used by tests and
    /// in-cluster callers.
    pub fn with_transport(mut self, client: Client) -> Self {
        self.transport = Some(client);
        self
    }

    pub fn client(&self) -> Result<Client> {
        if let Some(client) = &self.transport {
            return Ok(client.clone());
        }
        let mut config = KubeConfig::new(self.api_url.parse()?);
        config.auth_info.token = Some(self.token.clone().into());
        config.accept_invalid_certs = self.insecure_skip_tls_verify;
        Client::try_from(config).map_err(TenantryError::Kube)
    }
}

/// Decides what happens after a response: `Some((verb, object))` triggers
/// exactly one retry with the new action, `None` means done.
pub type DecisionCallback = Arc<
    dyn Fn(u16, Verb, &ManifestObject, &ManifestObject) -> Option<(Verb, ManifestObject)>
        + Send
        + Sync,
>;

#[derive(Clone)]
pub struct ApplyOptions {
    pub credentials: Credentials,
    pub namespace: String,
    pub callback: Option<DecisionCallback>,
}

impl ApplyOptions {
    pub fn new(credentials: Credentials, namespace: impl Into<String>) -> Self {
        Self {
            credentials,
            namespace: namespace.into(),
            callback: None,
        }
    }

    pub fn with_callback(mut self, callback: DecisionCallback) -> Self {
        self.callback = Some(callback);
        self
    }

    /// The same credentials and callback, scoped to another namespace.
    pub fn for_namespace(&self, namespace: impl Into<String>) -> Self {
        Self {
            credentials: self.credentials.clone(),
            namespace: namespace.into(),
            callback: self.callback.clone(),
        }
    }

    pub fn client(&self) -> Result<Client> {
        self.credentials.client()
    }
}

/// The standard conflict handler: a creation that hits an existing object is
/// retried as a merge patch, turning re-provisioning into an update. Kinds
/// without a patch endpoint degrade to a no-op, which keeps re-apply
/// idempotent for request-style objects.
pub fn conflict_retry_callback() -> DecisionCallback {
    Arc::new(|status, verb, request, _response| {
        if status == 409 && verb == Verb::Post {
            return Some((Verb::Patch, request.clone()));
        }
        None
    })
}

fn delete_options() -> serde_json::Value {
    serde_json::json!({
        "kind": "DeleteOptions",
        "apiVersion": "v1",
        "propagationPolicy": "Background",
    })
}

/// Parse a manifest document, pre-flight it, and apply every object in order
/// against the options' namespace.
#[instrument(skip(document, options), fields(namespace = %options.namespace))]
pub async fn apply_manifest(document: &str, options: &ApplyOptions) -> Result<()> {
    let objects = manifest::parse(document, &options.namespace)?;
    manifest::validate(&objects)?;
    apply_all(&objects, options).await
}

/// Apply objects strictly in their sorted order. The batch is fail-fast: the
/// first failure stops it and already-applied objects are not rolled back.
pub async fn apply_all(objects: &[ManifestObject], options: &ApplyOptions) -> Result<()> {
    for (index, object) in objects.iter().enumerate() {
        apply(object, Verb::Post, options).await?;
        if index == 0 && objects.len() > 1 {
            sleep(CREATE_SETTLE_DELAY).await;
        }
    }
    Ok(())
}

/// Execute one HTTP action for a manifest.
///
/// An unregistered (verb, kind) combination succeeds without any I/O. The
/// response body is decoded regardless of status code; the callback, if any,
/// may redirect the outcome into a single retry.
#[instrument(skip(object, options), fields(kind = object.kind().unwrap_or("?"), verb = %verb))]
pub async fn apply(object: &ManifestObject, verb: Verb, options: &ApplyOptions) -> Result<()> {
    let mut verb = verb;
    let mut object = object.clone();
    let mut retried = false;

    loop {
        let kind = object.kind()?.to_string();
        let Some(template) = endpoints::endpoint(verb, &kind) else {
            debug!("no {verb} endpoint registered for kind {kind}, skipping");
            return Ok(());
        };
        let path = endpoints::resolve(&template, &object)?;

        let body = match verb {
            Verb::Get => Vec::new(),
            Verb::Delete => serde_json::to_vec(&delete_options())?,
            _ => object.to_json()?,
        };
        let request = http::Request::builder()
            .method(verb.method())
            .uri(path.as_str())
            .header(http::header::ACCEPT, "application/json")
            .header(http::header::CONTENT_TYPE, verb.content_type())
            .body(Body::from(body))?;

        let client = options.client()?;
        let response = client.send(request).await.map_err(TenantryError::Kube)?;
        let status = response.status();
        let bytes: Bytes = response
            .into_body()
            .collect()
            .await
            .map_err(|e| TenantryError::ResponseBody(e.to_string()))?
            .to_bytes();
        let reply = ManifestObject::from_slice(&bytes)?;

        if !retried {
            if let Some(callback) = &options.callback {
                if let Some((next_verb, next_object)) =
                    callback(status.as_u16(), verb, &object, &reply)
                {
                    debug!("callback redirected {verb} {kind} to {next_verb}");
                    verb = next_verb;
                    object = next_object;
                    retried = true;
                    continue;
                }
            }
        }

        if status.is_success() {
            return Ok(());
        }
        return Err(TenantryError::Api {
            status: status.as_u16(),
            message: reply.message().unwrap_or("request rejected").to_string(),
        });
    }
}

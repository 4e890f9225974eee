// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Test utilities for mocking cluster API responses.

use std::sync::{Arc, Mutex};
use std::task::{Context, Poll};

use http::{Request, Response};
use http_body_util::BodyExt;
use kube::client::Body;
use kube::Client;
use tower::Service;

/// One request the mock saw, in arrival order.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    pub path: String,
    pub body: String,
}

struct Rule {
    method: String,
    path: String,
    body_contains: Option<String>,
    status: u16,
    body: String,
    consumed: bool,
}

impl Rule {
    fn matches(&self, method: &str, path: &str, body: &str, exact: bool) -> bool {
        if self.method != method {
            return false;
        }
        let path_ok = if exact {
            self.path == path
        } else {
            path.starts_with(&self.path)
        };
        if !path_ok {
            return false;
        }
        self.body_contains
            .as_ref()
            .is_none_or(|needle| body.contains(needle))
    }
}

/// A mock HTTP service with predefined responses.
///
/// Rules added for the same (method, path) act as a queue: each is used once
/// in insertion order, and the last matching rule repeats once the queue is
/// exhausted. Paths match exactly first, then by prefix. Every request is
/// recorded for later assertions.
#[derive(Clone)]
pub struct MockService {
    rules: Arc<Mutex<Vec<Rule>>>,
    requests: Arc<Mutex<Vec<RecordedRequest>>>,
}

impl MockService {
    pub fn new() -> Self {
        Self {
            rules: Arc::new(Mutex::new(Vec::new())),
            requests: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Add a response for requests matching the method and path.
    pub fn on(self, method: &str, path: &str, status: u16, body: &str) -> Self {
        self.rules.lock().unwrap().push(Rule {
            method: method.to_string(),
            path: path.to_string(),
            body_contains: None,
            status,
            body: body.to_string(),
            consumed: false,
        });
        self
    }

    /// Like [`MockService::on`], but only for requests whose body contains
    /// `needle`. Useful to tell apart concurrent posts to the same path.
    pub fn on_body(self, method: &str, path: &str, needle: &str, status: u16, body: &str) -> Self {
        self.rules.lock().unwrap().push(Rule {
            method: method.to_string(),
            path: path.to_string(),
            body_contains: Some(needle.to_string()),
            status,
            body: body.to_string(),
            consumed: false,
        });
        self
    }

    /// Build a kube Client from this mock service.
    pub fn into_client(&self) -> Client {
        Client::new(self.clone(), "default")
    }

    /// Everything the mock has seen so far.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    fn find_response(&self, method: &str, path: &str, body: &str) -> Option<(u16, String)> {
        let mut rules = self.rules.lock().unwrap();

        for exact in [true, false] {
            if let Some(rule) = rules
                .iter_mut()
                .find(|r| !r.consumed && r.matches(method, path, body, exact))
            {
                rule.consumed = true;
                return Some((rule.status, rule.body.clone()));
            }
        }
        // All matching rules used up: repeat the most recent one.
        for exact in [true, false] {
            if let Some(rule) = rules
                .iter()
                .rev()
                .find(|r| r.matches(method, path, body, exact))
            {
                return Some((rule.status, rule.body.clone()));
            }
        }
        None
    }
}

impl Default for MockService {
    fn default() -> Self {
        Self::new()
    }
}

impl Service<Request<Body>> for MockService {
    type Response = Response<Body>;
    type Error = tower::BoxError;
    type Future = std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self::Response, Self::Error>> + Send>,
    >;

    fn poll_ready(&mut self, _cx: &mut Context<'_>) -> Poll<Result<(), Self::Error>> {
        Poll::Ready(Ok(()))
    }

    fn call(&mut self, req: Request<Body>) -> Self::Future {
        let service = self.clone();
        Box::pin(async move {
            let (parts, body) = req.into_parts();
            let method = parts.method.to_string();
            let path = parts.uri.path().to_string();
            let body = String::from_utf8_lossy(&body.collect().await?.to_bytes()).to_string();

            service.requests.lock().unwrap().push(RecordedRequest {
                method: method.clone(),
                path: path.clone(),
                body: body.clone(),
            });

            match service.find_response(&method, &path, &body) {
                Some((status, body)) => Ok(Response::builder()
                    .status(status)
                    .header("content-type", "application/json")
                    .body(Body::from(body.into_bytes()))
                    .unwrap()),
                None => Ok(Response::builder()
                    .status(404)
                    .header("content-type", "application/json")
                    .body(Body::from(status_json(404, "not found").into_bytes()))
                    .unwrap()),
            }
        })
    }
}

/// A cluster `Status` reply.
pub fn status_json(code: u16, message: &str) -> String {
    serde_json::json!({
        "kind": "Status",
        "apiVersion": "v1",
        "status": if code < 400 { "Success" } else { "Failure" },
        "message": message,
        "code": code,
    })
    .to_string()
}

/// A created-object reply with just enough metadata to decode.
pub fn object_json(kind: &str, name: &str, namespace: &str) -> String {
    serde_json::json!({
        "kind": kind,
        "metadata": {"name": name, "namespace": namespace},
    })
    .to_string()
}

/// A Deployment reply carrying replica counts in its status.
pub fn deployment_json(name: &str, namespace: &str, available: i32, unavailable: i32) -> String {
    serde_json::json!({
        "apiVersion": "apps/v1",
        "kind": "Deployment",
        "metadata": {"name": name, "namespace": namespace},
        "status": {
            "availableReplicas": available,
            "unavailableReplicas": unavailable,
        },
    })
    .to_string()
}

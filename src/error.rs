// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::fmt;
use std::time::Duration;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum TenantryError {
    #[error("failed to parse manifest: {0}")]
    Parse(#[from] serde_yaml::Error),

    #[error("malformed manifest: {0}")]
    Manifest(String),

    #[error("no creation endpoint registered for kinds: {0}")]
    UnknownKinds(String),

    #[error("Kubernetes API error: {0}")]
    Kube(#[from] kube::Error),

    #[error("invalid cluster URL: {0}")]
    InvalidUri(#[from] http::uri::InvalidUri),

    #[error("failed to build request: {0}")]
    Http(#[from] http::Error),

    #[error("failed to serialize manifest: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("failed to read response body: {0}")]
    ResponseBody(String),

    #[error("API request failed with status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("provisioning of namespace {namespace} failed: {source}")]
    Satellite {
        namespace: String,
        source: Box<TenantryError>,
    },

    #[error("workloads did not become ready within {0:?}")]
    Timeout(Duration),

    #[error("{0}")]
    Aggregate(MultiError),
}

pub type Result<T> = std::result::Result<T, TenantryError>;

/// Ordered collection of independently raised errors. Empty means success.
#[derive(Debug, Default)]
pub struct MultiError {
    errors: Vec<TenantryError>,
}

impl MultiError {
    pub fn push(&mut self, error: TenantryError) {
        self.errors.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn len(&self) -> usize {
        self.errors.len()
    }

    pub fn errors(&self) -> &[TenantryError] {
        &self.errors
    }
}

impl fmt::Display for MultiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let messages: Vec<String> = self.errors.iter().map(|e| e.to_string()).collect();
        write!(f, "{}", messages.join("\n"))
    }
}

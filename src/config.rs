// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use anyhow::{Context, Result};
use kube::Client;
use std::env;

use crate::apply::Credentials;

/// Provisioner configuration loaded from environment variables
#[derive(Clone)]
pub struct Config {
    /// Base URL of the cluster API
    pub api_url: String,
    /// Bearer token with cluster-admin rights
    pub admin_token: String,
    /// Identity the admin token belongs to, granted access to every tenant namespace
    pub admin_user: String,
    pub insecure_skip_tls_verify: bool,
    /// Pre-built transport, used by in-cluster callers and tests
    pub transport: Option<Client>,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        let api_url = env::var("API_URL").context("API_URL environment variable not set")?;
        let admin_token =
            env::var("ADMIN_TOKEN").context("ADMIN_TOKEN environment variable not set")?;
        let admin_user = env::var("ADMIN_USER").unwrap_or_else(|_| "system:admin".to_string());
        let insecure_skip_tls_verify: bool = env::var("INSECURE_SKIP_TLS_VERIFY")
            .unwrap_or("false".to_string())
            .parse()
            .unwrap_or(false);

        Ok(Config {
            api_url,
            admin_token,
            admin_user,
            insecure_skip_tls_verify,
            transport: None,
        })
    }

    pub fn admin_credentials(&self) -> Credentials {
        self.credentials(&self.admin_token)
    }

    /// Credentials acting as the tenant user with their own token.
    pub fn user_credentials(&self, token: &str) -> Credentials {
        self.credentials(token)
    }

    fn credentials(&self, token: &str) -> Credentials {
        let mut credentials = Credentials::new(&self.api_url, token);
        credentials.insecure_skip_tls_verify = self.insecure_skip_tls_verify;
        match &self.transport {
            Some(client) => credentials.with_transport(client.clone()),
            None => credentials,
        }
    }
}

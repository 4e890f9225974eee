// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
use std::collections::BTreeMap;
use std::env;

use anyhow::{Context, Result};
use tracing::info;

use tenantry::apply::{conflict_retry_callback, ApplyOptions};
use tenantry::config::Config;
use tenantry::constants::readiness::{DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL};
use tenantry::readiness::wait_for_ready;
use tenantry::tenant::{init_tenant, namespace_safe_name};

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt::init();

    // Load configuration
    let config = Config::from_env()?;
    let username =
        env::var("TENANT_USERNAME").context("TENANT_USERNAME environment variable not set")?;
    let user_token =
        env::var("TENANT_USER_TOKEN").unwrap_or_else(|_| config.admin_token.clone());

    info!("Provisioning tenant for {}", username);
    init_tenant(
        &config,
        conflict_retry_callback(),
        &username,
        &user_token,
        &BTreeMap::new(),
    )
    .await?;

    let name = namespace_safe_name(&username);
    let options = ApplyOptions::new(config.user_credentials(&user_token), &name);

    info!("Waiting for workloads in {} to become ready", name);
    wait_for_ready(&options, &[], true, DEFAULT_MAX_WAIT, DEFAULT_POLL_INTERVAL).await?;

    info!("Tenant {} is ready", name);
    Ok(())
}

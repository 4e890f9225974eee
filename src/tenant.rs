// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! Tenant orchestration: the ordered synchronous phase for the primary
//! namespace, then concurrent satellite provisioning with error aggregation.

use std::collections::BTreeMap;

use tokio::sync::mpsc;
use tracing::{debug, info, instrument, warn};

use crate::apply::{apply_manifest, ApplyOptions, DecisionCallback};
use crate::config::Config;
use crate::constants::{satellites, vars};
use crate::error::{MultiError, Result, TenantryError};
use crate::template;

mod templates {
    pub const USER_PROJECT: &str = include_str!("../templates/user-project.yaml");
    pub const USER_COLLABORATORS: &str = include_str!("../templates/user-collaborators.yaml");
    pub const USER_ROLE_BINDINGS: &str = include_str!("../templates/user-role-bindings.yaml");
    pub const TENANT_QUOTAS: &str = include_str!("../templates/tenant-quotas.yaml");
    pub const TENANT_CI: &str = include_str!("../templates/tenant-ci.yaml");
    pub const TENANT_WORKSPACE: &str = include_str!("../templates/tenant-workspace.yaml");
}

/// Outcome of one satellite provisioning task.
#[derive(Debug)]
pub struct ProvisioningResult {
    pub namespace: String,
    pub outcome: Result<()>,
}

/// Namespace-safe name derived from a username: the local part before `@`,
/// with dots replaced.
pub fn namespace_safe_name(username: &str) -> String {
    let local = username.split('@').next().unwrap_or(username);
    local.replace('.', "-")
}

fn tenant_variables(
    name: &str,
    username: &str,
    admin_user: &str,
    extra_vars: &BTreeMap<String, String>,
) -> BTreeMap<String, String> {
    let mut variables = extra_vars.clone();
    // Derived values take precedence over caller overrides.
    variables.insert(vars::PROJECT_NAME.to_string(), name.to_string());
    variables.insert(vars::PROJECT_DISPLAYNAME.to_string(), name.to_string());
    variables.insert(vars::PROJECT_DESCRIPTION.to_string(), name.to_string());
    variables.insert(vars::PROJECT_USER.to_string(), username.to_string());
    variables.insert(
        vars::PROJECT_REQUESTING_USER.to_string(),
        username.to_string(),
    );
    variables.insert(vars::PROJECT_ADMIN_USER.to_string(), admin_user.to_string());
    variables
}

/// Provision every namespace of a tenant.
///
/// The primary namespace is set up in four strictly ordered steps; a failure
/// aborts before any satellite work starts. Satellites are then provisioned
/// concurrently and independently, and their failures are aggregated.
/// Provisioning is additive: nothing is rolled back on partial failure.
#[instrument(skip(config, callback, user_token, extra_vars))]
pub async fn init_tenant(
    config: &Config,
    callback: DecisionCallback,
    username: &str,
    user_token: &str,
    extra_vars: &BTreeMap<String, String>,
) -> Result<()> {
    let name = namespace_safe_name(username);
    let variables = tenant_variables(&name, username, &config.admin_user, extra_vars);

    let user_options = ApplyOptions::new(config.user_credentials(user_token), &name)
        .with_callback(callback.clone());
    let admin_options =
        ApplyOptions::new(config.admin_credentials(), &name).with_callback(callback.clone());

    info!("Provisioning primary namespace {} for {}", name, username);
    apply_manifest(
        &template::resolve(templates::USER_PROJECT, &variables),
        &user_options,
    )
    .await?;
    apply_manifest(
        &template::resolve(templates::USER_COLLABORATORS, &variables),
        &admin_options,
    )
    .await?;
    apply_manifest(
        &template::resolve(templates::USER_ROLE_BINDINGS, &variables),
        &user_options,
    )
    .await?;

    let mut quota_variables = variables.clone();
    quota_variables.insert(vars::PROJECT_DISPLAYNAME.to_string(), name.clone());
    apply_manifest(
        &template::resolve(templates::TENANT_QUOTAS, &quota_variables),
        &admin_options,
    )
    .await?;

    provision_satellites(&name, &variables, &admin_options).await
}

/// Fan out one task per satellite namespace and join on a fixed count of
/// completion reports. A failure in one satellite never aborts another.
async fn provision_satellites(
    name: &str,
    variables: &BTreeMap<String, String>,
    admin_options: &ApplyOptions,
) -> Result<()> {
    let satellites = [
        (satellites::CI_SUFFIX, templates::TENANT_CI),
        (satellites::WORKSPACE_SUFFIX, templates::TENANT_WORKSPACE),
    ];
    let (report_tx, mut report_rx) = mpsc::channel::<ProvisioningResult>(satellites.len());

    for (suffix, manifest_template) in satellites {
        let namespace = format!("{name}-{suffix}");
        let mut variables = variables.clone();
        variables.insert(vars::PROJECT_NAME.to_string(), namespace.clone());
        variables.insert(vars::PROJECT_DISPLAYNAME.to_string(), namespace.clone());
        let options = admin_options.for_namespace(&namespace);
        let report_tx = report_tx.clone();

        tokio::spawn(async move {
            debug!("Applying satellite namespace {}", namespace);
            let document = template::resolve(manifest_template, &variables);
            let outcome = apply_manifest(&document, &options).await;
            // The coordinator outlives every task; a send failure only means
            // the whole call was dropped.
            let _ = report_tx.send(ProvisioningResult { namespace, outcome }).await;
        });
    }
    drop(report_tx);

    let mut failures = MultiError::default();
    for _ in 0..satellites.len() {
        let Some(report) = report_rx.recv().await else {
            break;
        };
        match report.outcome {
            Ok(()) => info!("Satellite namespace {} provisioned", report.namespace),
            Err(error) => {
                warn!(
                    "Satellite namespace {} failed: {}",
                    report.namespace, error
                );
                failures.push(TenantryError::Satellite {
                    namespace: report.namespace,
                    source: Box::new(error),
                });
            }
        }
    }

    if failures.is_empty() {
        Ok(())
    } else {
        Err(TenantryError::Aggregate(failures))
    }
}

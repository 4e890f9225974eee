// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

use std::time::Duration;

/// Delay after the first object of a multi-object batch. The first object is
/// typically the namespace request, and the control plane finishes its setup
/// asynchronously; dependent objects submitted immediately can still race on
/// a slow cluster.
pub const CREATE_SETTLE_DELAY: Duration = Duration::from_secs(1);

/// Satellite namespaces provisioned alongside the primary tenant namespace,
/// named by suffixing the derived tenant name.
pub mod satellites {
    pub const CI_SUFFIX: &str = "ci";
    pub const WORKSPACE_SUFFIX: &str = "workspace";
    pub const SUFFIXES: [&str; 2] = [CI_SUFFIX, WORKSPACE_SUFFIX];
}

/// Template variable names substituted into tenant manifests.
pub mod vars {
    pub const PROJECT_NAME: &str = "PROJECT_NAME";
    pub const PROJECT_DISPLAYNAME: &str = "PROJECT_DISPLAYNAME";
    pub const PROJECT_DESCRIPTION: &str = "PROJECT_DESCRIPTION";
    pub const PROJECT_USER: &str = "PROJECT_USER";
    pub const PROJECT_REQUESTING_USER: &str = "PROJECT_REQUESTING_USER";
    pub const PROJECT_ADMIN_USER: &str = "PROJECT_ADMIN_USER";
}

/// Readiness polling configuration
pub mod readiness {
    use std::time::Duration;

    /// Default interval between status checks
    pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(3);
    /// Default deadline for the whole wait operation
    pub const DEFAULT_MAX_WAIT: Duration = Duration::from_secs(300);
}

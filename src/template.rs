// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0

//! `${NAME}` placeholder substitution for manifest templates.

use std::collections::BTreeMap;

/// Substitute every `${NAME}` placeholder in `document` with its value from
/// `variables`. Placeholders without a matching variable are left untouched.
pub fn resolve(document: &str, variables: &BTreeMap<String, String>) -> String {
    let mut resolved = document.to_string();
    for (name, value) in variables {
        resolved = resolved.replace(&format!("${{{name}}}"), value);
    }
    resolved
}

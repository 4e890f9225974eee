// Copyright 2026, Jeroen van Erp <jeroen@geeko.me>
// SPDX-License-Identifier: Apache-2.0
pub mod apply;
pub mod cleanup;
pub mod config;
pub mod constants;
pub mod endpoints;
pub mod error;
pub mod manifest;
pub mod readiness;
pub mod template;
pub mod tenant;

#[cfg(test)]
pub mod test_utils;

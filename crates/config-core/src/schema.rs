// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Schema root definition for configuration validation.
//!
//! This type describes the canonical shape of a configuration file. It is
//! used for schema generation and validation only; code reads configuration
//! through the section types in `mbp-config-types`.

use mbp_config_types::{CredentialsSection, DiscoveryConfig, GitHostConfig, JenkinsConfig};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
#[serde(deny_unknown_fields)]
pub struct SchemaRoot {
    pub git_host: Option<GitHostConfig>,
    pub discovery: Option<DiscoveryConfig>,
    pub jenkins: Option<JenkinsConfig>,
    pub credentials: Option<CredentialsSection>,
    /// Default log level when neither `--log-level` nor `RUST_LOG` is given
    pub log_level: Option<LogLevel>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

/// JSON schema of [`SchemaRoot`], as printed by `config schema`
pub fn json_schema() -> serde_json::Value {
    let root = schemars::schema_for!(SchemaRoot);
    serde_json::to_value(root).unwrap_or(serde_json::Value::Null)
}

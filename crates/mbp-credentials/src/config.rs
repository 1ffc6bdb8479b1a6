// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration integration for credentials

use mbp_config_types::CredentialsSection;
use std::path::PathBuf;

const FILE_NAME: &str = "credentials.toml";

/// Where to find `credentials.toml`
#[derive(Debug, Clone, Default)]
pub struct CredentialsConfig {
    /// Explicit file path from the `credentials.storage-path` key
    pub storage_path: Option<PathBuf>,

    /// Base configuration directory resolved by config-core
    pub base_config_dir: Option<PathBuf>,

    /// Override for MBP_HOME (used by tests to avoid touching the environment)
    pub home_override: Option<PathBuf>,
}

impl CredentialsConfig {
    /// Build from the resolved configuration's `credentials` section
    pub fn from_resolved_config(
        resolved_json: &serde_json::Value,
        base_config_dir: PathBuf,
    ) -> crate::Result<Self> {
        let section: CredentialsSection =
            config_core::extract::section(resolved_json, "credentials")
                .map_err(|e| crate::Error::Config(e.to_string()))?;

        Ok(Self {
            storage_path: section.storage_path,
            base_config_dir: Some(base_config_dir),
            home_override: None,
        })
    }

    /// Path of the credentials file
    ///
    /// Precedence: storage_path > MBP_HOME > base_config_dir > dirs::config_dir
    pub fn credentials_file(&self) -> crate::Result<PathBuf> {
        if let Some(path) = &self.storage_path {
            return Ok(path.clone());
        }

        if let Some(home) = &self.home_override {
            return Ok(home.join(FILE_NAME));
        }
        if let Ok(home) = std::env::var("MBP_HOME") {
            return Ok(PathBuf::from(home).join(FILE_NAME));
        }

        if let Some(base_dir) = &self.base_config_dir {
            return Ok(base_dir.join(FILE_NAME));
        }

        let base_dir = dirs::config_dir().ok_or_else(|| {
            crate::Error::Config("Could not determine config directory".to_string())
        })?;
        Ok(base_dir.join(config_core::paths::APP_DIR).join(FILE_NAME))
    }
}

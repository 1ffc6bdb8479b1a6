// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Configuration file path discovery

use std::path::{Path, PathBuf};

/// Directory name used under system and user config roots
pub const APP_DIR: &str = "mbp-seeder";

/// Directory holding the project-local config file
pub const PROJECT_DIR: &str = ".mbp";

/// Configuration file paths for different scopes
#[derive(Debug, Clone)]
pub struct Paths {
    pub system: PathBuf,
    pub user: PathBuf,
    pub project: Option<PathBuf>,
    pub cli_config: Option<PathBuf>,
}

impl Paths {
    /// Directory of the user config file; credentials default to living here too
    pub fn user_dir(&self) -> PathBuf {
        self.user.parent().map(Path::to_path_buf).unwrap_or_default()
    }
}

/// Discover configuration file paths for the current environment
pub fn discover_paths(project_root: Option<&Path>) -> Paths {
    Paths {
        system: get_system_config_path(),
        user: get_user_config_path(),
        project: project_root.map(|root| root.join(PROJECT_DIR).join("config.toml")),
        cli_config: None,
    }
}

/// Get system configuration path based on platform
fn get_system_config_path() -> PathBuf {
    if cfg!(target_os = "macos") {
        PathBuf::from("/Library/Application Support").join(APP_DIR).join("config.toml")
    } else if cfg!(target_os = "windows") {
        PathBuf::from(std::env::var("ProgramData").unwrap_or_else(|_| "C:\\ProgramData".into()))
            .join(APP_DIR)
            .join("config.toml")
    } else {
        PathBuf::from("/etc").join(APP_DIR).join("config.toml")
    }
}

/// Get user configuration path, honoring `MBP_HOME`
fn get_user_config_path() -> PathBuf {
    if let Ok(home) = std::env::var("MBP_HOME") {
        return PathBuf::from(home).join("config.toml");
    }

    if cfg!(target_os = "linux") {
        if let Ok(xdg) = std::env::var("XDG_CONFIG_HOME") {
            return PathBuf::from(xdg).join(APP_DIR).join("config.toml");
        }
    }

    dirs::config_dir()
        .or_else(|| dirs::home_dir().map(|h| h.join(".config")))
        .unwrap_or_else(|| PathBuf::from("/tmp"))
        .join(APP_DIR)
        .join("config.toml")
}

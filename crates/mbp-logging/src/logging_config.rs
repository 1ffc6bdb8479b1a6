// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Logging configuration types

use serde::{Deserialize, Serialize};

use crate::CliLogLevel;

/// Logging keys read from the resolved configuration root
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Logging verbosity level
    #[serde(rename = "log-level")]
    pub level: Option<String>,
}

impl LoggingConfig {
    /// Configured level, or `info` when unset or unparseable
    pub fn default_level(&self) -> CliLogLevel {
        self.level.as_deref().and_then(|s| s.parse().ok()).unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_configured_level() {
        let cfg: LoggingConfig =
            serde_json::from_value(serde_json::json!({"log-level": "debug"})).unwrap();
        assert_eq!(cfg.default_level(), CliLogLevel::Debug);
    }

    #[test]
    fn falls_back_to_info() {
        assert_eq!(LoggingConfig::default().default_level(), CliLogLevel::Info);
        let cfg = LoggingConfig {
            level: Some("chatty".into()),
        };
        assert_eq!(cfg.default_level(), CliLogLevel::Info);
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Git host (TFS / Azure DevOps) connection settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::time::Duration;

pub const DEFAULT_CONCURRENCY: usize = 4;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct GitHostConfig {
    /// Team project base URL, e.g. `https://tfs.example.com/tfs/DefaultCollection/Payments`
    pub team_project_url: Option<String>,
    /// Credential store id (or alias) holding the username and personal access token
    pub credentials_id: Option<String>,
    /// Per-request deadline in seconds; unset or `0` means requests wait indefinitely
    pub timeout_secs: Option<u64>,
    /// How many repositories are inspected at once; `1` crawls sequentially
    pub concurrency: Option<usize>,
}

impl GitHostConfig {
    pub fn concurrency(&self) -> usize {
        self.concurrency.unwrap_or(DEFAULT_CONCURRENCY).max(1)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_secs.filter(|&secs| secs > 0).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn concurrency_defaults_and_floors_at_one() {
        assert_eq!(GitHostConfig::default().concurrency(), DEFAULT_CONCURRENCY);
        let cfg = GitHostConfig {
            concurrency: Some(0),
            ..Default::default()
        };
        assert_eq!(cfg.concurrency(), 1);
    }

    #[test]
    fn zero_timeout_means_no_deadline() {
        let cfg = |secs| GitHostConfig {
            timeout_secs: secs,
            ..Default::default()
        };
        assert_eq!(cfg(None).timeout(), None);
        assert_eq!(cfg(Some(0)).timeout(), None);
        assert_eq!(cfg(Some(30)).timeout(), Some(Duration::from_secs(30)));
    }

    #[test]
    fn deserializes_kebab_case_keys() {
        let cfg: GitHostConfig = toml::from_str(
            r#"
            team-project-url = "https://tfs/Coll/Proj"
            credentials-id = "tfs-pat"
            timeout-secs = 30
            "#,
        )
        .unwrap();
        assert_eq!(cfg.team_project_url.as_deref(), Some("https://tfs/Coll/Proj"));
        assert_eq!(cfg.credentials_id.as_deref(), Some("tfs-pat"));
        assert_eq!(cfg.timeout_secs, Some(30));
    }
}

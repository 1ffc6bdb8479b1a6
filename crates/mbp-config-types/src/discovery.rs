// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! What the crawl looks for

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

pub const DEFAULT_TARGET_FILE: &str = "Jenkinsfile";
pub const DEFAULT_AD_HOC_SUFFIX: &str = ".Jenkinsfile";
pub const DEFAULT_BRANCH: &str = "master";

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct DiscoveryConfig {
    /// File whose presence on any branch makes a repository a candidate
    pub target_file: Option<String>,
    /// Suffix of top-level files that get their own single-branch job
    pub ad_hoc_suffix: Option<String>,
    /// Branch scanned for ad hoc pipeline files
    pub default_branch: Option<String>,
    /// Set to false to skip the ad hoc scan entirely
    pub ad_hoc: Option<bool>,
}

impl DiscoveryConfig {
    pub fn target_file(&self) -> &str {
        self.target_file.as_deref().unwrap_or(DEFAULT_TARGET_FILE)
    }

    pub fn ad_hoc_suffix(&self) -> &str {
        self.ad_hoc_suffix.as_deref().unwrap_or(DEFAULT_AD_HOC_SUFFIX)
    }

    pub fn default_branch(&self) -> &str {
        self.default_branch.as_deref().unwrap_or(DEFAULT_BRANCH)
    }

    pub fn ad_hoc_enabled(&self) -> bool {
        self.ad_hoc.unwrap_or(true)
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Job server settings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "kebab-case")]
pub struct JenkinsConfig {
    /// Jenkins root URL
    pub url: Option<String>,
    /// Folder path jobs are created in, `/`-separated. Defaults to the team project name.
    pub folder: Option<String>,
    /// Credential store id for the Jenkins user and API token
    pub credentials_id: Option<String>,
    /// Jenkins-side credential id written into generated jobs.
    /// Defaults to `git-host.credentials-id`.
    pub template_credentials_id: Option<String>,
    /// Queue a first run right after a job is created
    pub run_pipelines: Option<bool>,
    /// Replacement for the built-in multibranch job template
    pub multibranch_template: Option<PathBuf>,
    /// Replacement for the built-in ad hoc pipeline job template
    pub ad_hoc_template: Option<PathBuf>,
}

impl JenkinsConfig {
    pub fn run_pipelines(&self) -> bool {
        self.run_pipelines.unwrap_or(false)
    }

    /// Folder to create jobs in, falling back to `team`
    pub fn folder_or<'a>(&'a self, team: &'a str) -> &'a str {
        self.folder.as_deref().unwrap_or(team)
    }
}

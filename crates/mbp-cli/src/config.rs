// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Resolved configuration, turned into what the commands need

use anyhow::{Context, Result};
use config_core::{Resolved, paths};
use mbp_config_types::{DiscoveryConfig, GitHostConfig, JenkinsConfig};
use mbp_core::{DiscoveryOptions, GitHostSettings, MaterializeOptions, SeedPlan, TemplateSet};
use mbp_credentials::{CredentialStore, CredentialsConfig, FileCredentialStore};
use mbp_domain_types::TeamProject;
use mbp_jenkins::{JenkinsClient, JenkinsFolder};
use mbp_logging::logging_config::LoggingConfig;
use mbp_rest_client::{AuthConfig, RestClient, ScanOptions};
use serde_json::Value;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

/// Load every configuration layer
pub fn load(cli_config: Option<&str>, flags: &[(&str, Value)]) -> Result<(Resolved, paths::Paths)> {
    let project_root = std::env::current_dir().ok();
    let mut paths = paths::discover_paths(project_root.as_deref());
    if let Some(file) = cli_config {
        paths.cli_config = Some(PathBuf::from(file));
    }
    let resolved = config_core::load_all(&paths, flags)?;
    Ok((resolved, paths))
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub git_host: GitHostConfig,
    pub discovery: DiscoveryConfig,
    pub jenkins: JenkinsConfig,
    pub logging: LoggingConfig,
    credentials: CredentialsConfig,
}

impl Settings {
    pub fn from_resolved(resolved: &Resolved, config_dir: &Path) -> Result<Self> {
        Ok(Self {
            git_host: resolved.section("git-host")?,
            discovery: resolved.section("discovery")?,
            jenkins: resolved.section("jenkins")?,
            logging: config_core::extract::get(&resolved.json)?,
            credentials: CredentialsConfig::from_resolved_config(
                &resolved.json,
                config_dir.to_path_buf(),
            )?,
        })
    }

    pub fn team_project(&self) -> Result<TeamProject> {
        let url = self.git_host.team_project_url.as_deref().context(
            "no team project configured; pass --team-project-url or set git-host.team-project-url",
        )?;
        Ok(TeamProject::parse(url)?)
    }

    pub fn git_credentials_id(&self) -> Result<&str> {
        self.git_host.credentials_id.as_deref().context(
            "no git host credential configured; pass --credentials-id or set git-host.credentials-id",
        )
    }

    /// Credential id written into generated jobs
    pub fn template_credentials_id(&self) -> Result<&str> {
        match self.jenkins.template_credentials_id.as_deref() {
            Some(id) => Ok(id),
            None => self.git_credentials_id(),
        }
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.git_host.timeout()
    }

    pub fn discovery_options(&self) -> DiscoveryOptions {
        DiscoveryOptions {
            target_file: self.discovery.target_file().to_string(),
            ad_hoc: self.discovery.ad_hoc_enabled(),
            concurrency: self.git_host.concurrency(),
        }
    }

    pub fn scan_options(&self) -> ScanOptions {
        ScanOptions {
            default_branch: self.discovery.default_branch().to_string(),
            ad_hoc_suffix: self.discovery.ad_hoc_suffix().to_string(),
        }
    }

    pub fn seed_plan(&self) -> Result<SeedPlan> {
        let mut plan = SeedPlan::new(self.team_project()?, self.template_credentials_id()?);
        plan.discovery = self.discovery_options();
        plan.scan = self.scan_options();
        plan.materialize = MaterializeOptions {
            run_pipelines: self.jenkins.run_pipelines(),
        };
        Ok(plan)
    }

    pub fn git_host_settings(&self, cancel: CancellationToken) -> Result<GitHostSettings> {
        Ok(GitHostSettings {
            credentials_id: self.git_credentials_id()?.to_string(),
            timeout: self.timeout(),
            cancel,
        })
    }

    pub async fn templates(&self) -> Result<TemplateSet> {
        TemplateSet::load(
            self.jenkins.multibranch_template.as_deref(),
            self.jenkins.ad_hoc_template.as_deref(),
        )
        .await
        .context("loading job templates")
    }

    pub async fn credential_store(&self) -> Result<FileCredentialStore> {
        FileCredentialStore::open(self.credentials.clone())
            .await
            .context("loading credentials")
    }

    /// Target folder on the configured Jenkins
    pub async fn jenkins_folder(
        &self,
        credentials: &dyn CredentialStore,
        team: &str,
        cancel: CancellationToken,
    ) -> Result<JenkinsFolder> {
        let url = self
            .jenkins
            .url
            .as_deref()
            .context("no Jenkins configured; set jenkins.url")?;

        let auth = match self.jenkins.credentials_id.as_deref() {
            Some(id) => {
                let credential = credentials
                    .lookup(id)
                    .await
                    .with_context(|| format!("looking up the Jenkins credential '{}'", id))?;
                tracing::debug!(
                    credential = id,
                    user = %credential.username,
                    secret = %mbp_logging::redact(credential.secret.expose()),
                    "using Jenkins credential"
                );
                AuthConfig::basic(credential.username.clone(), credential.secret.expose())
            }
            None => AuthConfig::None,
        };

        let client = RestClient::new(auth)?
            .with_timeout(self.timeout())
            .with_cancellation(cancel);
        let jenkins = JenkinsClient::new(url, client)?;
        Ok(jenkins.folder(self.jenkins.folder_or(team)))
    }
}

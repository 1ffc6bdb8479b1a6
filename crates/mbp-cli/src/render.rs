// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `render`: print one generated job configuration, without touching the network

use anyhow::{Result, bail};
use clap::Args;
use mbp_core::Escaping;
use mbp_domain_types::{
    AdHocJobRequest, BranchRef, CandidateRepository, JobDescriptor, JobKind, Repository,
};

use crate::config::Settings;

#[derive(Args, Debug, Clone)]
pub struct RenderArgs {
    /// Repository name
    #[arg(long)]
    pub repo: String,
    #[arg(long, value_enum, default_value = "multibranch")]
    pub kind: JobKind,
    /// Pipeline file; required for ad hoc jobs
    #[arg(long)]
    pub file: Option<String>,
    /// Branch written into the job (default: the configured default branch)
    #[arg(long)]
    pub branch: Option<String>,
    /// Substitute values without XML escaping
    #[arg(long)]
    pub raw: bool,
}

impl RenderArgs {
    pub fn descriptor(&self, settings: &Settings) -> Result<JobDescriptor> {
        let project = settings.team_project()?;
        let credential = settings.template_credentials_id()?;
        let repository = Repository::new("", self.repo.as_str());
        let branch = self
            .branch
            .clone()
            .unwrap_or_else(|| settings.discovery.default_branch().to_string());

        Ok(match self.kind {
            JobKind::Multibranch => {
                let candidate = CandidateRepository {
                    repository,
                    branch: BranchRef::new(format!("refs/heads/{}", branch)),
                };
                let target_file = self.file.as_deref().unwrap_or(settings.discovery.target_file());
                JobDescriptor::multibranch(&project, &candidate, credential, target_file)
            }
            JobKind::AdHoc => {
                let Some(file) = &self.file else {
                    bail!("--file is required for ad hoc jobs");
                };
                let request = AdHocJobRequest::new(repository, file.as_str());
                JobDescriptor::ad_hoc(&project, &request, credential, &branch)
            }
        })
    }

    pub async fn run(self, settings: &Settings) -> Result<()> {
        let descriptor = self.descriptor(settings)?;
        let mut templates = settings.templates().await?;
        if self.raw {
            templates = templates.with_escaping(Escaping::None);
        }
        let rendered = templates.render(&descriptor)?;
        tracing::debug!(job = %descriptor.job_name, unique_id = %rendered.unique_id, "rendered");
        println!("{}", rendered.document);
        Ok(())
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The seed workflow
//!
//! 1. resolve the git host credential; a missing one ends the run
//! 2. make sure the target folder exists, before any crawling
//! 3. crawl the team project
//! 4. create the jobs that are not there yet

use mbp_credentials::CredentialStore;
use mbp_domain_types::{DiscoveryReport, JobDescriptor, JobOutcome, JobRecord, TeamProject};
use mbp_rest_client::{AuthConfig, RestClient, RestClientError, ScanOptions, TfsClient};
use serde::Serialize;
use std::time::Duration;
use thiserror::Error;
use tokio_util::sync::CancellationToken;

use crate::discovery::{DiscoveryError, DiscoveryOptions, discover};
use crate::git_host::GitHost;
use crate::job_container::{JobContainer, JobContainerError};
use crate::materialize::{MaterializeOptions, materialize_jobs};
use crate::template::TemplateSet;

#[derive(Debug, Error)]
pub enum SeedError {
    #[error(transparent)]
    Credentials(#[from] mbp_credentials::Error),

    #[error(
        "Team project folder does not exist! Please make a folder for the {container} team project before running this job."
    )]
    TargetContainerMissing { container: String },

    #[error("could not check the target folder {container}: {source}")]
    Container {
        container: String,
        #[source]
        source: JobContainerError,
    },

    #[error("discovery failed: {0}")]
    Discovery(DiscoveryError),

    #[error("failed to set up the git host client: {0}")]
    Client(RestClientError),

    /// Jobs handled before the cancellation are kept
    #[error("seed cancelled")]
    Cancelled { completed: Vec<JobRecord> },
}

impl From<DiscoveryError> for SeedError {
    fn from(e: DiscoveryError) -> Self {
        if e.is_cancelled() {
            SeedError::Cancelled {
                completed: Vec::new(),
            }
        } else {
            SeedError::Discovery(e)
        }
    }
}

/// What to crawl and how to turn findings into jobs
#[derive(Debug, Clone)]
pub struct SeedPlan {
    pub project: TeamProject,
    /// Credential id written into the job documents
    pub credential_reference: String,
    pub discovery: DiscoveryOptions,
    pub scan: ScanOptions,
    pub materialize: MaterializeOptions,
    /// Crawl and render, but create nothing
    pub dry_run: bool,
}

impl SeedPlan {
    pub fn new(project: TeamProject, credential_reference: impl Into<String>) -> Self {
        Self {
            project,
            credential_reference: credential_reference.into(),
            discovery: DiscoveryOptions::default(),
            scan: ScanOptions::default(),
            materialize: MaterializeOptions::default(),
            dry_run: false,
        }
    }

    /// One descriptor per candidate repository, then one per ad hoc file
    pub fn jobs(&self, report: &DiscoveryReport) -> Vec<JobDescriptor> {
        let multibranch = report.candidates.iter().map(|candidate| {
            JobDescriptor::multibranch(
                &self.project,
                candidate,
                &self.credential_reference,
                &self.discovery.target_file,
            )
        });
        let ad_hoc = report.ad_hoc.iter().map(|request| {
            JobDescriptor::ad_hoc(
                &self.project,
                request,
                &self.credential_reference,
                &self.scan.default_branch,
            )
        });
        multibranch.chain(ad_hoc).collect()
    }
}

/// Connection settings for the git host
#[derive(Debug, Clone, Default)]
pub struct GitHostSettings {
    /// Credential store id of the account that reads the team project
    pub credentials_id: String,
    pub timeout: Option<Duration>,
    pub cancel: CancellationToken,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct SeedReport {
    pub team_project: String,
    pub container: String,
    pub dry_run: bool,
    pub discovery: DiscoveryReport,
    /// What a dry run would have submitted
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub planned: Vec<JobDescriptor>,
    /// Handled jobs; in a dry run only those whose configuration failed to render
    pub jobs: Vec<JobRecord>,
}

impl SeedReport {
    pub fn has_failures(&self) -> bool {
        self.jobs.iter().any(|job| job.outcome.is_failure())
    }

    pub fn created(&self) -> usize {
        self.jobs.iter().filter(|job| job.outcome.is_created()).count()
    }
}

/// Resolve the git host credential and build a client for the plan's project
pub async fn connect(
    credentials: &dyn CredentialStore,
    git_host: &GitHostSettings,
    plan: &SeedPlan,
) -> Result<TfsClient, SeedError> {
    let credential = credentials.lookup(&git_host.credentials_id).await.map_err(|e| {
        tracing::error!(credentials_id = %git_host.credentials_id, error = %e, "credential lookup failed");
        SeedError::Credentials(e)
    })?;

    let client = RestClient::new(AuthConfig::basic(
        credential.username.clone(),
        credential.secret.expose(),
    ))
    .map_err(SeedError::Client)?
    .with_timeout(git_host.timeout)
    .with_cancellation(git_host.cancel.clone());
    Ok(TfsClient::new(client, plan.project.clone()).with_options(plan.scan.clone()))
}

/// Look up the git host credential, connect, and seed
pub async fn seed<C>(
    credentials: &dyn CredentialStore,
    git_host: &GitHostSettings,
    container: &C,
    templates: &TemplateSet,
    plan: &SeedPlan,
) -> Result<SeedReport, SeedError>
where
    C: JobContainer + ?Sized,
{
    let host = connect(credentials, git_host, plan).await?;
    seed_with_host(&host, container, templates, plan).await
}

/// Seed with an already connected git host
pub async fn seed_with_host<H, C>(
    host: &H,
    container: &C,
    templates: &TemplateSet,
    plan: &SeedPlan,
) -> Result<SeedReport, SeedError>
where
    H: GitHost + ?Sized,
    C: JobContainer + ?Sized,
{
    let container_name = container.name();
    match container.container_exists().await {
        Ok(true) => {}
        Ok(false) => {
            let err = SeedError::TargetContainerMissing {
                container: container_name,
            };
            tracing::error!("{}", err);
            return Err(err);
        }
        Err(JobContainerError::Cancelled) => {
            return Err(SeedError::Cancelled {
                completed: Vec::new(),
            });
        }
        Err(source) => {
            return Err(SeedError::Container {
                container: container_name,
                source,
            });
        }
    }

    let discovery = discover(host, &plan.discovery).await?;
    let descriptors = plan.jobs(&discovery);

    let mut report = SeedReport {
        team_project: plan.project.name.clone(),
        container: container_name,
        dry_run: plan.dry_run,
        discovery,
        ..SeedReport::default()
    };

    if plan.dry_run {
        for descriptor in descriptors {
            match templates.render(&descriptor) {
                Ok(_) => {
                    tracing::info!(job = %descriptor.job_name, kind = %descriptor.kind, "would create job");
                    report.planned.push(descriptor);
                }
                Err(e) => {
                    tracing::warn!(job = %descriptor.job_name, error = %e, "could not render job configuration");
                    report.jobs.push(JobRecord {
                        job_name: descriptor.job_name,
                        kind: descriptor.kind,
                        repository: descriptor.repository_name,
                        unique_id: None,
                        outcome: JobOutcome::CreateFailed {
                            reason: e.to_string(),
                        },
                    });
                }
            }
        }
        return Ok(report);
    }

    tracing::info!(jobs = descriptors.len(), "processing repositories");
    report.jobs = materialize_jobs(container, templates, descriptors, plan.materialize)
        .await
        .map_err(|cancelled| SeedError::Cancelled {
            completed: cancelled.completed,
        })?;

    tracing::info!(
        created = report.created(),
        failed = report.jobs.iter().filter(|j| j.outcome.is_failure()).count(),
        "seed finished"
    );
    Ok(report)
}

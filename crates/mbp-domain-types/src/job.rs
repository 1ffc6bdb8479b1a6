// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Job-related domain types
//!
//! A [`JobDescriptor`] is the fully resolved parameter set for one template
//! fill. The unique id embedded in a rendered document is minted by each fill,
//! not by the descriptor, and ends up in the [`JobRecord`]. A [`JobOutcome`]
//! records what happened when the job was submitted to the job container.

use serde::{Deserialize, Serialize};
use strum::{Display, EnumString};
use uuid::Uuid;

use crate::{AdHocJobRequest, CandidateRepository, TeamProject};

/// Which job template a descriptor is rendered with
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Display, EnumString)]
#[cfg_attr(feature = "clap", derive(clap::ValueEnum))]
#[serde(rename_all = "kebab-case")]
#[strum(serialize_all = "kebab-case")]
pub enum JobKind {
    /// One multibranch pipeline per repository, scanning every branch
    Multibranch,
    /// One single-branch pipeline per ad hoc pipeline file on the default branch
    AdHoc,
}

/// Parameters substituted into a job template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobDescriptor {
    pub kind: JobKind,
    pub job_name: String,
    pub repository_name: String,
    /// Credential id the job server uses to clone the repository
    pub credential_reference: String,
    /// Team project base URL, without trailing slash
    pub base_url: String,
    /// Pipeline file the generated job runs
    pub target_file_path: String,
    pub team: String,
    /// Branch a single-branch job builds; multibranch jobs discover their own
    pub branch: String,
}

impl JobDescriptor {
    /// Descriptor for a multibranch job named after the repository
    pub fn multibranch(
        project: &TeamProject,
        candidate: &CandidateRepository,
        credential_reference: &str,
        target_file: &str,
    ) -> Self {
        let repository = &candidate.repository;
        Self {
            kind: JobKind::Multibranch,
            job_name: repository.name.clone(),
            repository_name: repository.name.clone(),
            credential_reference: credential_reference.to_string(),
            base_url: project.url.clone(),
            target_file_path: target_file.to_string(),
            team: project.name.clone(),
            branch: candidate
                .branch
                .short_name()
                .unwrap_or(&candidate.branch.name)
                .to_string(),
        }
    }

    /// Descriptor for an ad hoc pipeline job building `default_branch`
    pub fn ad_hoc(
        project: &TeamProject,
        request: &AdHocJobRequest,
        credential_reference: &str,
        default_branch: &str,
    ) -> Self {
        Self {
            kind: JobKind::AdHoc,
            job_name: request.job_name(),
            repository_name: request.repository.name.clone(),
            credential_reference: credential_reference.to_string(),
            base_url: project.url.clone(),
            target_file_path: request.file.clone(),
            team: project.name.clone(),
            branch: default_branch.to_string(),
        }
    }
}

/// Terminal state of one job after the materialization driver handled it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "kebab-case")]
pub enum JobOutcome {
    /// A job with this name was already present; nothing was submitted
    Exists,
    /// The job was created. `scheduled` tells whether a first run was queued.
    Created {
        scheduled: bool,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        schedule_error: Option<String>,
    },
    /// The container rejected the job, or its document could not be rendered
    CreateFailed { reason: String },
}

impl JobOutcome {
    pub fn is_failure(&self) -> bool {
        matches!(self, JobOutcome::CreateFailed { .. })
    }

    pub fn is_created(&self) -> bool {
        matches!(self, JobOutcome::Created { .. })
    }
}

/// One line of the materialization report
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JobRecord {
    pub job_name: String,
    pub kind: JobKind,
    pub repository: String,
    /// Id written into the rendered document, when one was rendered
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unique_id: Option<Uuid>,
    #[serde(flatten)]
    pub outcome: JobOutcome,
}

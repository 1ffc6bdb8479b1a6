// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! The folder that receives generated jobs
//!
//! [`JobContainer`] is what the materialization driver writes to. The Jenkins
//! folder client implements it; driver tests use the mockall mock.

use async_trait::async_trait;
use mbp_jenkins::{JenkinsError, JenkinsFolder};
use mbp_rest_client::RestClientError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum JobContainerError {
    /// The container refused the document or the name
    #[error("{reason}")]
    Rejected { reason: String },

    #[error("job server unavailable: {0}")]
    Unavailable(String),

    #[error("cancelled")]
    Cancelled,
}

/// A named collection of jobs
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait JobContainer: Send + Sync {
    /// Display name, used in messages
    fn name(&self) -> String;

    async fn container_exists(&self) -> Result<bool, JobContainerError>;

    async fn exists(&self, job_name: &str) -> Result<bool, JobContainerError>;

    /// Create a job from `document`; fails if the name is taken
    async fn create(&self, job_name: &str, document: &str) -> Result<(), JobContainerError>;

    /// Queue a first run of a freshly created job
    async fn schedule_run(&self, job_name: &str) -> Result<(), JobContainerError>;
}

impl From<JenkinsError> for JobContainerError {
    fn from(e: JenkinsError) -> Self {
        match e {
            JenkinsError::Rejected { reason, .. } => JobContainerError::Rejected { reason },
            JenkinsError::Rest(RestClientError::Cancelled) => JobContainerError::Cancelled,
            other => JobContainerError::Unavailable(other.to_string()),
        }
    }
}

#[async_trait]
impl JobContainer for JenkinsFolder {
    fn name(&self) -> String {
        self.path()
    }

    async fn container_exists(&self) -> Result<bool, JobContainerError> {
        Ok(JenkinsFolder::container_exists(self).await?)
    }

    async fn exists(&self, job_name: &str) -> Result<bool, JobContainerError> {
        Ok(JenkinsFolder::exists(self, job_name).await?)
    }

    async fn create(&self, job_name: &str, document: &str) -> Result<(), JobContainerError> {
        Ok(JenkinsFolder::create(self, job_name, document).await?)
    }

    async fn schedule_run(&self, job_name: &str) -> Result<(), JobContainerError> {
        Ok(JenkinsFolder::schedule_run(self, job_name).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn jenkins_errors_map_onto_container_errors() {
        let rejected: JobContainerError = JenkinsError::Rejected {
            name: "svc-a".into(),
            reason: "A job already exists with the name 'svc-a'".into(),
        }
        .into();
        assert!(matches!(rejected, JobContainerError::Rejected { ref reason } if reason.contains("already exists")));

        let cancelled: JobContainerError = JenkinsError::Rest(RestClientError::Cancelled).into();
        assert!(matches!(cancelled, JobContainerError::Cancelled));

        let down: JobContainerError = JenkinsError::InvalidUrl {
            url: "x".into(),
            reason: "bad".into(),
        }
        .into();
        assert!(matches!(down, JobContainerError::Unavailable(_)));
    }
}

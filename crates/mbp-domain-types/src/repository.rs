// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Repository-related domain types
//!
//! Types describing git repositories and branch refs as reported by the
//! git host, plus the results of probing them.

use serde::{Deserialize, Serialize};

use crate::DomainError;

/// Prefix carried by every head ref returned from the refs endpoint
pub const HEADS_PREFIX: &str = "refs/heads/";

/// A git repository inside a team project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Repository {
    pub id: String,
    pub name: String,
}

impl Repository {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

/// A head ref exactly as the git host returned it, e.g. `refs/heads/main`
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct BranchRef {
    pub name: String,
}

impl BranchRef {
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }

    /// Branch name with the `refs/heads/` prefix removed.
    ///
    /// The result is always 11 characters shorter than the raw ref.
    pub fn short_name(&self) -> Result<&str, DomainError> {
        self.name
            .strip_prefix(HEADS_PREFIX)
            .ok_or_else(|| DomainError::MalformedRef(self.name.clone()))
    }
}

impl std::fmt::Display for BranchRef {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.name)
    }
}

/// A repository confirmed to carry the target file on at least one branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CandidateRepository {
    pub repository: Repository,
    /// First branch on which the probe succeeded
    pub branch: BranchRef,
}

/// A top-level file with the ad hoc suffix found on the default branch
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdHocJobRequest {
    pub repository: Repository,
    /// Path relative to the repository root, without a leading `/`
    pub file: String,
}

impl AdHocJobRequest {
    pub fn new(repository: Repository, file: impl Into<String>) -> Self {
        let file = file.into();
        let file = file.trim_start_matches('/').to_string();
        Self { repository, file }
    }

    /// Job name: the repository name followed by the file name up to its first dot.
    ///
    /// `deploy.Jenkinsfile` in `svc-a` becomes `svc-a deploy`. A bare
    /// `.Jenkinsfile` has no stem, so the part after the dot is used instead.
    pub fn job_name(&self) -> String {
        let stem = match self.file.split('.').next() {
            Some(stem) if !stem.is_empty() => stem,
            _ => self.file.trim_start_matches('.'),
        };
        format!("{} {}", self.repository.name, stem)
    }
}

/// Everything a crawl found, in the order the git host listed the repositories
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DiscoveryReport {
    pub candidates: Vec<CandidateRepository>,
    pub ad_hoc: Vec<AdHocJobRequest>,
}

impl DiscoveryReport {
    pub fn is_empty(&self) -> bool {
        self.candidates.is_empty() && self.ad_hoc.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_strips_heads_prefix() {
        let branch = BranchRef::new("refs/heads/main");
        let short = branch.short_name().unwrap();
        assert_eq!(short, "main");
        assert_eq!(short.len(), branch.name.len() - 11);
    }

    #[test]
    fn short_name_keeps_nested_branch_paths() {
        let branch = BranchRef::new("refs/heads/feature/login");
        assert_eq!(branch.short_name().unwrap(), "feature/login");
    }

    #[test]
    fn short_name_rejects_refs_without_prefix() {
        let branch = BranchRef::new("refs/tags/v1");
        assert_eq!(
            branch.short_name(),
            Err(DomainError::MalformedRef("refs/tags/v1".into()))
        );
    }

    #[test]
    fn ad_hoc_request_strips_leading_slash() {
        let req = AdHocJobRequest::new(Repository::new("1", "svc-a"), "/deploy.Jenkinsfile");
        assert_eq!(req.file, "deploy.Jenkinsfile");
    }

    #[test]
    fn ad_hoc_job_name_uses_stem_before_first_dot() {
        let req = AdHocJobRequest::new(Repository::new("1", "svc-a"), "deploy.prod.Jenkinsfile");
        assert_eq!(req.job_name(), "svc-a deploy");
    }

    #[test]
    fn ad_hoc_job_name_for_bare_suffix() {
        let req = AdHocJobRequest::new(Repository::new("1", "svc-a"), ".Jenkinsfile");
        assert_eq!(req.job_name(), "svc-a Jenkinsfile");
    }

    #[test]
    fn branch_ref_serializes_as_plain_string() {
        let json = serde_json::to_value(BranchRef::new("refs/heads/dev")).unwrap();
        assert_eq!(json, serde_json::json!("refs/heads/dev"));
    }
}

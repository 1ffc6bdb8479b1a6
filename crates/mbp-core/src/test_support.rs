// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory git host for crawl tests

use async_trait::async_trait;
use mbp_domain_types::{BranchRef, Repository};
use mbp_rest_client::RestClientError;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use crate::discovery::{DiscoveryError, DiscoveryResult};
use crate::git_host::GitHost;

const DEFAULT_BRANCH: &str = "refs/heads/master";
const AD_HOC_SUFFIX: &str = ".Jenkinsfile";

#[derive(Debug, Clone)]
pub struct InMemoryRepo {
    repository: Repository,
    /// (full ref, files relative to the root)
    branches: Vec<(String, Vec<String>)>,
    delay: Duration,
    fail_branches: bool,
}

impl InMemoryRepo {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            repository: Repository::new(id, name),
            branches: Vec::new(),
            delay: Duration::ZERO,
            fail_branches: false,
        }
    }

    pub fn branch(mut self, full_ref: &str, files: &[&str]) -> Self {
        self.branches
            .push((full_ref.to_string(), files.iter().map(|f| f.to_string()).collect()));
        self
    }

    /// Delay the branch listing, to shuffle completion order
    pub fn delay_ms(mut self, ms: u64) -> Self {
        self.delay = Duration::from_millis(ms);
        self
    }

    pub fn fail_branches(mut self) -> Self {
        self.fail_branches = true;
        self
    }
}

#[derive(Debug, Clone, Default)]
pub struct InMemoryHost {
    repos: Vec<InMemoryRepo>,
    listings: Arc<AtomicUsize>,
    probes: Arc<AtomicUsize>,
    top_level: Arc<AtomicUsize>,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn repo(mut self, repo: InMemoryRepo) -> Self {
        self.repos.push(repo);
        self
    }

    pub fn listing_calls(&self) -> usize {
        self.listings.load(Ordering::SeqCst)
    }

    pub fn probe_calls(&self) -> usize {
        self.probes.load(Ordering::SeqCst)
    }

    pub fn top_level_calls(&self) -> usize {
        self.top_level.load(Ordering::SeqCst)
    }

    fn find(&self, id: &str) -> DiscoveryResult<&InMemoryRepo> {
        self.repos.iter().find(|r| r.repository.id == id).ok_or_else(|| {
            DiscoveryError::Rest(RestClientError::Parse {
                url: format!("memory://{}", id),
                message: "unknown repository".to_string(),
            })
        })
    }
}

#[async_trait]
impl GitHost for InMemoryHost {
    async fn list_repositories(&self) -> DiscoveryResult<Vec<Repository>> {
        self.listings.fetch_add(1, Ordering::SeqCst);
        Ok(self.repos.iter().map(|r| r.repository.clone()).collect())
    }

    async fn list_branches(&self, repository_id: &str) -> DiscoveryResult<Vec<BranchRef>> {
        let repo = self.find(repository_id)?;
        if !repo.delay.is_zero() {
            tokio::time::sleep(repo.delay).await;
        }
        if repo.fail_branches {
            return Err(DiscoveryError::Rest(RestClientError::Parse {
                url: format!("memory://{}/refs", repository_id),
                message: "refs unavailable".to_string(),
            }));
        }
        Ok(repo.branches.iter().map(|(name, _)| BranchRef::new(name.clone())).collect())
    }

    async fn probe_path(
        &self,
        repository_id: &str,
        branch: &BranchRef,
        path: &str,
    ) -> DiscoveryResult<bool> {
        branch
            .short_name()
            .map_err(|_| DiscoveryError::MalformedRef(branch.name.clone()))?;
        self.probes.fetch_add(1, Ordering::SeqCst);
        let repo = self.find(repository_id)?;
        Ok(repo
            .branches
            .iter()
            .find(|(name, _)| *name == branch.name)
            .is_some_and(|(_, files)| files.iter().any(|f| f == path)))
    }

    async fn list_top_level_files(&self, repository_id: &str) -> DiscoveryResult<Option<Vec<String>>> {
        self.top_level.fetch_add(1, Ordering::SeqCst);
        let repo = self.find(repository_id)?;
        Ok(repo
            .branches
            .iter()
            .find(|(name, _)| name == DEFAULT_BRANCH)
            .map(|(_, files)| {
                files
                    .iter()
                    .filter(|f| !f.contains('/') && f.ends_with(AD_HOC_SUFFIX))
                    .cloned()
                    .collect()
            }))
    }

    fn description(&self) -> String {
        "in-memory host".to_string()
    }
}

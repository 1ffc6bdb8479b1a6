// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Git Host - Abstract Repository Crawl Interface
//!
//! The discovery orchestrator never talks HTTP itself. It asks a [`GitHost`]
//! for the repositories of a team project, the head refs of each repository,
//! whether a path exists on a branch, and which top-level files the default
//! branch carries.
//!
//! `mbp-core` owns the trait and implements it for the REST client
//! ([`TfsClient`]). Tests drive the orchestrator with an in-memory host.
//!
//! Branches cross this interface as full head refs (`refs/heads/main`). The
//! REST implementation strips the prefix before probing and reports a ref
//! without it as [`DiscoveryError::MalformedRef`].

use async_trait::async_trait;
use mbp_domain_types::{BranchRef, Repository};
use mbp_rest_client::TfsClient;

use crate::discovery::{DiscoveryError, DiscoveryResult};

/// Read-only view of one team project on the git host
#[async_trait]
pub trait GitHost: Send + Sync {
    /// Every repository of the team project, in the host's order
    async fn list_repositories(&self) -> DiscoveryResult<Vec<Repository>>;

    /// Head refs of a repository, prefix included
    async fn list_branches(&self, repository_id: &str) -> DiscoveryResult<Vec<BranchRef>>;

    /// Whether `path` exists on `branch`
    async fn probe_path(
        &self,
        repository_id: &str,
        branch: &BranchRef,
        path: &str,
    ) -> DiscoveryResult<bool>;

    /// Top-level ad hoc pipeline files on the default branch, without leading `/`
    ///
    /// `None` when the repository has no default branch.
    async fn list_top_level_files(&self, repository_id: &str) -> DiscoveryResult<Option<Vec<String>>>;

    /// Where the host lives, for log messages
    fn description(&self) -> String;
}

#[async_trait]
impl GitHost for TfsClient {
    async fn list_repositories(&self) -> DiscoveryResult<Vec<Repository>> {
        Ok(TfsClient::list_repositories(self).await?)
    }

    async fn list_branches(&self, repository_id: &str) -> DiscoveryResult<Vec<BranchRef>> {
        Ok(TfsClient::list_branches(self, repository_id).await?)
    }

    async fn probe_path(
        &self,
        repository_id: &str,
        branch: &BranchRef,
        path: &str,
    ) -> DiscoveryResult<bool> {
        let short = branch
            .short_name()
            .map_err(|_| DiscoveryError::MalformedRef(branch.name.clone()))?;
        Ok(TfsClient::probe_path(self, repository_id, short, path).await?)
    }

    async fn list_top_level_files(&self, repository_id: &str) -> DiscoveryResult<Option<Vec<String>>> {
        Ok(TfsClient::list_top_level_files(self, repository_id).await?)
    }

    fn description(&self) -> String {
        self.project().to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mbp_domain_types::TeamProject;
    use mbp_rest_client::{AuthConfig, RestClient};
    use mbp_test_utils::{FakeRepo, FakeTfs};

    async fn host() -> (mbp_test_utils::MockServer, TfsClient) {
        let (server, url) = FakeTfs::new("/tfs/Coll/Payments")
            .repo(FakeRepo::new("r-1", "svc-a").branch("feature/x", &["/Jenkinsfile"]))
            .spawn()
            .await;
        let client = TfsClient::new(
            RestClient::new(AuthConfig::None).unwrap(),
            TeamProject::parse(&url).unwrap(),
        );
        (server, client)
    }

    #[tokio::test]
    async fn probe_strips_the_heads_prefix() {
        let (server, client) = host().await;
        let host: &dyn GitHost = &client;

        let found = host
            .probe_path("r-1", &BranchRef::new("refs/heads/feature/x"), "Jenkinsfile")
            .await
            .unwrap();
        assert!(found);

        let probe = &server.requests().matching("GET", "/items")[0];
        assert_eq!(probe.query_param("version").as_deref(), Some("feature/x"));
    }

    #[tokio::test]
    async fn ref_without_heads_prefix_is_rejected_before_any_request() {
        let (server, client) = host().await;
        let host: &dyn GitHost = &client;

        let err = host
            .probe_path("r-1", &BranchRef::new("refs/tags/v1"), "Jenkinsfile")
            .await
            .unwrap_err();
        assert!(matches!(err, DiscoveryError::MalformedRef(ref name) if name == "refs/tags/v1"));
        assert!(server.requests().all().is_empty());
    }

    #[tokio::test]
    async fn description_names_the_team_project() {
        let (_server, client) = host().await;
        assert!(GitHost::description(&client).starts_with("Payments ("));
    }
}

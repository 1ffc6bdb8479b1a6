// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Team project crawl
//!
//! For each repository: list its branches, probe them in order for the target
//! file and stop at the first hit, then scan the default branch for ad hoc
//! pipeline files. Repositories are crawled concurrently up to a limit, but
//! the report keeps the host's repository order.

use futures::{StreamExt, TryStreamExt, stream};
use mbp_domain_types::{AdHocJobRequest, CandidateRepository, DiscoveryReport, Repository};
use mbp_rest_client::RestClientError;
use thiserror::Error;

use crate::git_host::GitHost;

pub type DiscoveryResult<T> = Result<T, DiscoveryError>;

#[derive(Debug, Error)]
pub enum DiscoveryError {
    #[error(transparent)]
    Rest(#[from] RestClientError),

    #[error("branch ref '{0}' does not start with 'refs/heads/'")]
    MalformedRef(String),
}

impl DiscoveryError {
    pub fn is_cancelled(&self) -> bool {
        matches!(self, DiscoveryError::Rest(e) if e.is_cancelled())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscoveryOptions {
    /// Path probed on every branch, relative to the repository root
    pub target_file: String,
    /// Scan the default branch for ad hoc pipeline files
    pub ad_hoc: bool,
    /// Repositories crawled at once; `1` is a sequential crawl
    pub concurrency: usize,
}

impl Default for DiscoveryOptions {
    fn default() -> Self {
        Self {
            target_file: "Jenkinsfile".to_string(),
            ad_hoc: true,
            concurrency: 4,
        }
    }
}

#[derive(Debug, Default)]
struct RepositoryScan {
    candidate: Option<CandidateRepository>,
    ad_hoc: Vec<AdHocJobRequest>,
}

/// Crawl the team project behind `host`
///
/// The first error aborts the crawl; nothing found before it is returned.
pub async fn discover<H>(host: &H, options: &DiscoveryOptions) -> DiscoveryResult<DiscoveryReport>
where
    H: GitHost + ?Sized,
{
    tracing::info!(host = %host.description(), "looking through team project for repositories");
    let repositories = host.list_repositories().await?;
    tracing::info!(count = repositories.len(), "found repositories");

    let scans: Vec<RepositoryScan> = stream::iter(repositories)
        .map(|repository| scan_repository(host, repository, options))
        .buffered(options.concurrency.max(1))
        .try_collect()
        .await?;

    let mut report = DiscoveryReport::default();
    for scan in scans {
        report.candidates.extend(scan.candidate);
        report.ad_hoc.extend(scan.ad_hoc);
    }
    tracing::info!(
        candidates = report.candidates.len(),
        ad_hoc = report.ad_hoc.len(),
        "discovery finished"
    );
    Ok(report)
}

async fn scan_repository<H>(
    host: &H,
    repository: Repository,
    options: &DiscoveryOptions,
) -> DiscoveryResult<RepositoryScan>
where
    H: GitHost + ?Sized,
{
    let branches = host.list_branches(&repository.id).await?;
    if branches.is_empty() {
        tracing::info!(repository = %repository.name, "repository has no branches");
        return Ok(RepositoryScan::default());
    }

    let mut scan = RepositoryScan::default();
    for branch in branches {
        if host.probe_path(&repository.id, &branch, &options.target_file).await? {
            tracing::info!(
                repository = %repository.name,
                branch = %branch,
                "found {}",
                options.target_file
            );
            scan.candidate = Some(CandidateRepository {
                repository: repository.clone(),
                branch,
            });
            break;
        }
    }
    if scan.candidate.is_none() {
        tracing::debug!(repository = %repository.name, "no branch carries {}", options.target_file);
    }

    if options.ad_hoc {
        match host.list_top_level_files(&repository.id).await? {
            Some(files) => {
                if files.is_empty() {
                    tracing::debug!(repository = %repository.name, "no ad hoc pipeline files");
                }
                scan.ad_hoc = files
                    .into_iter()
                    .map(|file| AdHocJobRequest::new(repository.clone(), file))
                    .collect();
            }
            None => {
                tracing::info!(
                    repository = %repository.name,
                    "no default branch; skipping ad hoc scan"
                );
            }
        }
    }

    Ok(scan)
}

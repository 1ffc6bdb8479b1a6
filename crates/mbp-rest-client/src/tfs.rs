// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Team project endpoints of the git REST API

use mbp_domain_types::{BranchRef, Repository, TeamProject};
use serde::Deserialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use url::Url;

use crate::client::RestClient;
use crate::error::{RestClientError, RestClientResult};

/// What the default-branch scan looks at
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScanOptions {
    pub default_branch: String,
    /// Top-level files ending with this are ad hoc pipeline definitions
    pub ad_hoc_suffix: String,
}

impl Default for ScanOptions {
    fn default() -> Self {
        Self {
            default_branch: "master".to_string(),
            ad_hoc_suffix: ".Jenkinsfile".to_string(),
        }
    }
}

/// `{ "value": [...], "count": n }`
#[derive(Debug, Deserialize)]
struct ListEnvelope<T> {
    value: Option<Vec<T>>,
}

#[derive(Debug, Deserialize)]
struct RepositoryDto {
    id: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct RefDto {
    name: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemDto {
    path: String,
    #[serde(default)]
    is_folder: bool,
}

/// Client for one team project
#[derive(Debug, Clone)]
pub struct TfsClient {
    client: RestClient,
    project: TeamProject,
    options: ScanOptions,
}

impl TfsClient {
    pub fn new(client: RestClient, project: TeamProject) -> Self {
        Self {
            client,
            project,
            options: ScanOptions::default(),
        }
    }

    pub fn with_options(mut self, options: ScanOptions) -> Self {
        self.options = options;
        self
    }

    pub fn project(&self) -> &TeamProject {
        &self.project
    }

    pub fn options(&self) -> &ScanOptions {
        &self.options
    }

    /// Every git repository of the team project, in API order
    pub async fn list_repositories(&self) -> RestClientResult<Vec<Repository>> {
        let url = self.endpoint(&[], &[("api-version", "1")])?;
        let json = self.client.get_json(&url).await?;
        let repos: Vec<RepositoryDto> = required_list(&url, json)?;
        Ok(repos.into_iter().map(|r| Repository::new(r.id, r.name)).collect())
    }

    /// Head refs of a repository, still carrying `refs/heads/`
    pub async fn list_branches(&self, repository_id: &str) -> RestClientResult<Vec<BranchRef>> {
        let url = self.endpoint(
            &[repository_id, "refs"],
            &[("filter", "heads"), ("api-version", "1.0")],
        )?;
        let json = self.client.get_json(&url).await?;
        let refs: Vec<RefDto> = required_list(&url, json)?;
        Ok(refs.into_iter().map(|r| BranchRef::new(r.name)).collect())
    }

    /// Whether `path` exists on `branch` (a short name such as `main`)
    ///
    /// A missing item is `false`, whether the server reports it as `404` or
    /// as a body without `value`.
    pub async fn probe_path(
        &self,
        repository_id: &str,
        branch: &str,
        path: &str,
    ) -> RestClientResult<bool> {
        let scope = format!("/{}", path.trim_start_matches('/'));
        let url = self.endpoint(
            &[repository_id, "items"],
            &[("api-version", "1.0"), ("version", branch), ("scopepath", &scope)],
        )?;

        let found = match self.client.get_json_opt(&url).await? {
            Some(json) => json
                .get("value")
                .and_then(Value::as_array)
                .is_some_and(|items| !items.is_empty()),
            None => false,
        };
        tracing::trace!(repository_id, branch, path, found, "probed path");
        Ok(found)
    }

    /// Top-level files of the default branch carrying the ad hoc suffix
    ///
    /// `None` means the repository has no default branch; the ad hoc scan is
    /// skipped for it.
    pub async fn list_top_level_files(
        &self,
        repository_id: &str,
    ) -> RestClientResult<Option<Vec<String>>> {
        let url = self.endpoint(
            &[repository_id, "items"],
            &[
                ("api-version", "1.0"),
                ("version", &self.options.default_branch),
                ("scopepath", "/"),
                ("recursionLevel", "OneLevel"),
            ],
        )?;

        let Some(json) = self.client.get_json_opt(&url).await? else {
            return Ok(None);
        };
        let envelope: ListEnvelope<ItemDto> = decode(&url, json)?;
        let Some(items) = envelope.value else {
            return Ok(None);
        };

        let files = items
            .into_iter()
            .filter(|item| !item.is_folder && item.path.ends_with(&self.options.ad_hoc_suffix))
            .map(|item| item.path.trim_start_matches('/').to_string())
            .collect();
        Ok(Some(files))
    }

    /// `{project}/_apis/git/repositories/{segments..}?{query}`
    fn endpoint(&self, segments: &[&str], query: &[(&str, &str)]) -> RestClientResult<Url> {
        let mut url = Url::parse(&self.project.api_url("git/repositories"))?;
        url.path_segments_mut()
            .map_err(|_| RestClientError::Client(format!("{} is not a base URL", self.project.url)))?
            .extend(segments);
        url.query_pairs_mut().extend_pairs(query);
        Ok(url)
    }
}

fn decode<T: DeserializeOwned>(url: &Url, json: Value) -> RestClientResult<T> {
    serde_json::from_value(json).map_err(|e| RestClientError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

/// List endpoints always carry `value`; its absence means we hit something else
fn required_list<T: DeserializeOwned>(url: &Url, json: Value) -> RestClientResult<Vec<T>> {
    let envelope: ListEnvelope<T> = decode(url, json)?;
    envelope.value.ok_or_else(|| RestClientError::Parse {
        url: url.to_string(),
        message: "response has no 'value' array".to_string(),
    })
}

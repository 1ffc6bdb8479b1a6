// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use mbp_rest_client::{Payload, RestClient, RestClientError};
use reqwest::StatusCode;
use serde::Deserialize;
use std::sync::Arc;
use tokio::sync::OnceCell;
use url::Url;

use crate::error::{JenkinsError, JenkinsResult};

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Crumb {
    crumb: String,
    crumb_request_field: String,
}

/// One Jenkins controller
#[derive(Debug, Clone)]
pub struct JenkinsClient {
    client: RestClient,
    base_url: Url,
    /// `None` once we know the controller has no crumb issuer
    crumb: Arc<OnceCell<Option<Crumb>>>,
}

impl JenkinsClient {
    pub fn new(base_url: &str, client: RestClient) -> JenkinsResult<Self> {
        let invalid = |reason: String| JenkinsError::InvalidUrl {
            url: base_url.to_string(),
            reason,
        };
        let parsed = Url::parse(base_url.trim_end_matches('/')).map_err(|e| invalid(e.to_string()))?;
        if parsed.cannot_be_a_base() {
            return Err(invalid("not a base URL".to_string()));
        }

        Ok(Self {
            client,
            base_url: parsed,
            crumb: Arc::new(OnceCell::new()),
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Scope to a folder given as a `/`-separated path; empty means the root
    pub fn folder(&self, path: &str) -> JenkinsFolder {
        JenkinsFolder {
            jenkins: self.clone(),
            path: path
                .split('/')
                .filter(|part| !part.is_empty())
                .map(str::to_string)
                .collect(),
        }
    }

    /// `{base}/job/a/job/b/{tail..}`
    fn url(&self, items: &[&str], tail: &[&str]) -> JenkinsResult<Url> {
        let mut url = self.base_url.clone();
        {
            let mut segments = url.path_segments_mut().map_err(|_| JenkinsError::InvalidUrl {
                url: self.base_url.to_string(),
                reason: "not a base URL".to_string(),
            })?;
            segments.pop_if_empty();
            for item in items {
                segments.push("job").push(item);
            }
            segments.extend(tail);
        }
        Ok(url)
    }

    async fn crumb(&self) -> JenkinsResult<Option<&Crumb>> {
        let crumb = self.crumb.get_or_try_init(|| self.fetch_crumb()).await?;
        Ok(crumb.as_ref())
    }

    async fn fetch_crumb(&self) -> JenkinsResult<Option<Crumb>> {
        let url = self.url(&[], &["crumbIssuer", "api", "json"])?;
        let Some(json) = self.client.get_json_opt(&url).await? else {
            tracing::debug!("Jenkins has no crumb issuer");
            return Ok(None);
        };
        let crumb = serde_json::from_value(json).map_err(|e| RestClientError::Parse {
            url: url.to_string(),
            message: e.to_string(),
        })?;
        Ok(Some(crumb))
    }

    async fn exists_at(&self, items: &[&str]) -> JenkinsResult<bool> {
        let url = self.url(items, &["api", "json"])?;
        Ok(self.client.get_json_opt(&url).await?.is_some())
    }

    async fn post(&self, url: &Url, payload: Option<Payload>) -> JenkinsResult<String> {
        let crumb = self.crumb().await?;
        let headers: Vec<(&str, &str)> = crumb
            .map(|c| (c.crumb_request_field.as_str(), c.crumb.as_str()))
            .into_iter()
            .collect();
        Ok(self.client.post(url, payload, &headers).await?)
    }
}

/// Folder that receives generated jobs
#[derive(Debug, Clone)]
pub struct JenkinsFolder {
    jenkins: JenkinsClient,
    path: Vec<String>,
}

impl JenkinsFolder {
    /// Folder path as configured, `/`-separated
    pub fn path(&self) -> String {
        self.path.join("/")
    }

    fn items_with<'a>(&'a self, name: &'a str) -> Vec<&'a str> {
        let mut items: Vec<&str> = self.path.iter().map(String::as_str).collect();
        items.push(name);
        items
    }

    fn items(&self) -> Vec<&str> {
        self.path.iter().map(String::as_str).collect()
    }

    pub async fn container_exists(&self) -> JenkinsResult<bool> {
        self.jenkins.exists_at(&self.items()).await
    }

    pub async fn exists(&self, name: &str) -> JenkinsResult<bool> {
        self.jenkins.exists_at(&self.items_with(name)).await
    }

    /// Submit `config_xml` as a new job called `name`
    pub async fn create(&self, name: &str, config_xml: &str) -> JenkinsResult<()> {
        let mut url = self.jenkins.url(&self.items(), &["createItem"])?;
        url.query_pairs_mut().append_pair("name", name);

        match self.jenkins.post(&url, Some(Payload::xml(config_xml))).await {
            Ok(_) => {
                tracing::debug!(folder = %self.path(), job = name, "created job");
                Ok(())
            }
            Err(JenkinsError::Rest(RestClientError::Status { status, body, .. }))
                if status == StatusCode::BAD_REQUEST =>
            {
                let body = body.trim();
                Err(JenkinsError::Rejected {
                    name: name.to_string(),
                    reason: if body.is_empty() {
                        status.to_string()
                    } else {
                        body.to_string()
                    },
                })
            }
            Err(e) => Err(e),
        }
    }

    /// Queue a build; for a multibranch project this starts branch indexing
    pub async fn schedule_run(&self, name: &str) -> JenkinsResult<()> {
        let url = self.jenkins.url(&self.items_with(name), &["build"])?;
        self.jenkins.post(&url, None).await?;
        tracing::debug!(folder = %self.path(), job = name, "scheduled build");
        Ok(())
    }
}

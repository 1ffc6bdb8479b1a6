// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory stand-in for the parts of the Jenkins REST API the seeder uses

use axum::{
    Json, Router,
    extract::{Query, State},
    http::{HeaderMap, Method, StatusCode, Uri, header},
    response::{IntoResponse, Response},
};
use base64::Engine;
use serde_json::json;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard};

use crate::MockServer;

pub const CRUMB_FIELD: &str = "Jenkins-Crumb";

#[derive(Debug, Default)]
struct JenkinsState {
    folders: HashSet<String>,
    /// full item path (`folder/name`) to config.xml
    jobs: BTreeMap<String, String>,
    builds: Vec<String>,
    rejected_names: HashSet<String>,
    crumb: Option<String>,
    expected_auth: Option<String>,
}

/// Fake Jenkins controller; clones share the same state
#[derive(Debug, Clone, Default)]
pub struct FakeJenkins {
    state: Arc<Mutex<JenkinsState>>,
}

impl FakeJenkins {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, JenkinsState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    /// Create a folder (and its parents), `/`-separated
    pub fn folder(self, path: &str) -> Self {
        {
            let mut state = self.lock();
            let mut prefix = String::new();
            for part in path.split('/').filter(|p| !p.is_empty()) {
                if !prefix.is_empty() {
                    prefix.push('/');
                }
                prefix.push_str(part);
                state.folders.insert(prefix.clone());
            }
        }
        self
    }

    /// Pre-existing job inside `folder`
    pub fn existing_job(self, folder: &str, name: &str) -> Self {
        self.lock()
            .jobs
            .insert(item_path(folder, name), "<existing/>".to_string());
        self
    }

    /// Make `createItem` fail for this job name
    pub fn reject_create(self, name: &str) -> Self {
        self.lock().rejected_names.insert(name.to_string());
        self
    }

    /// Require this CSRF crumb on every POST
    pub fn with_crumb(self, crumb: &str) -> Self {
        self.lock().crumb = Some(crumb.to_string());
        self
    }

    pub fn require_basic_auth(self, username: &str, token: &str) -> Self {
        let encoded =
            base64::engine::general_purpose::STANDARD.encode(format!("{}:{}", username, token));
        self.lock().expected_auth = Some(format!("Basic {}", encoded));
        self
    }

    /// Config documents of every job, keyed by full item path
    pub fn jobs(&self) -> BTreeMap<String, String> {
        self.lock().jobs.clone()
    }

    pub fn job_config(&self, folder: &str, name: &str) -> Option<String> {
        self.lock().jobs.get(&item_path(folder, name)).cloned()
    }

    /// Full item paths of every build request, in arrival order
    pub fn builds(&self) -> Vec<String> {
        self.lock().builds.clone()
    }

    pub fn router(&self) -> Router {
        Router::new().fallback(handle).with_state(self.clone())
    }

    pub async fn spawn(&self) -> MockServer {
        MockServer::spawn(self.router()).await
    }
}

fn item_path(folder: &str, name: &str) -> String {
    let folder = folder.trim_matches('/');
    if folder.is_empty() {
        name.to_string()
    } else {
        format!("{}/{}", folder, name)
    }
}

/// Split `/job/a/job/b/createItem` into (`a/b`, `createItem`)
fn parse_path(path: &str) -> (String, String) {
    let segments: Vec<String> = path
        .trim_matches('/')
        .split('/')
        .map(|s| percent_encoding::percent_decode_str(s).decode_utf8_lossy().into_owned())
        .collect();

    let mut names = Vec::new();
    let mut i = 0;
    while i + 1 < segments.len() && segments[i] == "job" {
        names.push(segments[i + 1].clone());
        i += 2;
    }
    (names.join("/"), segments[i..].join("/"))
}

async fn handle(
    State(jenkins): State<FakeJenkins>,
    method: Method,
    uri: Uri,
    headers: HeaderMap,
    Query(query): Query<HashMap<String, String>>,
    body: String,
) -> Response {
    let mut state = jenkins.lock();

    if let Some(expected) = &state.expected_auth {
        let actual = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if actual != Some(expected.as_str()) {
            return (StatusCode::UNAUTHORIZED, "Invalid password/token for user").into_response();
        }
    }

    if method == Method::POST {
        if let Some(crumb) = &state.crumb {
            let sent = headers.get(CRUMB_FIELD).and_then(|v| v.to_str().ok());
            if sent != Some(crumb.as_str()) {
                return (StatusCode::FORBIDDEN, "No valid crumb was included in the request")
                    .into_response();
            }
        }
    }

    let (item, action) = parse_path(uri.path());
    match (method, action.as_str()) {
        (Method::GET, "crumbIssuer/api/json") if item.is_empty() => match &state.crumb {
            Some(crumb) => Json(json!({
                "_class": "hudson.security.csrf.DefaultCrumbIssuer",
                "crumb": crumb,
                "crumbRequestField": CRUMB_FIELD,
            }))
            .into_response(),
            None => StatusCode::NOT_FOUND.into_response(),
        },
        (Method::GET, "api/json") => {
            if item.is_empty() || state.folders.contains(&item) {
                Json(json!({
                    "_class": "com.cloudbees.hudson.plugins.folder.Folder",
                    "name": item.rsplit('/').next().unwrap_or_default(),
                }))
                .into_response()
            } else if state.jobs.contains_key(&item) {
                Json(json!({
                    "_class": "org.jenkinsci.plugins.workflow.multibranch.WorkflowMultiBranchProject",
                    "name": item.rsplit('/').next().unwrap_or_default(),
                }))
                .into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }
        (Method::POST, "createItem") => {
            let Some(name) = query.get("name") else {
                return (StatusCode::BAD_REQUEST, "Query parameter 'name' is required").into_response();
            };
            if !item.is_empty() && !state.folders.contains(&item) {
                return StatusCode::NOT_FOUND.into_response();
            }
            let is_xml = headers
                .get(header::CONTENT_TYPE)
                .and_then(|v| v.to_str().ok())
                .is_some_and(|v| v.contains("xml"));
            if !is_xml || body.trim().is_empty() {
                return (StatusCode::BAD_REQUEST, "Invalid config.xml").into_response();
            }
            let path = item_path(&item, name);
            if state.rejected_names.contains(name) {
                return (
                    StatusCode::BAD_REQUEST,
                    [("X-Error", "Failed to create job")],
                    "Failed to create job",
                )
                    .into_response();
            }
            if state.jobs.contains_key(&path) {
                let message = format!("A job already exists with the name '{}'", name);
                return (StatusCode::BAD_REQUEST, message).into_response();
            }
            state.jobs.insert(path, body);
            StatusCode::OK.into_response()
        }
        (Method::POST, "build") => {
            if state.jobs.contains_key(&item) {
                state.builds.push(item);
                StatusCode::CREATED.into_response()
            } else {
                StatusCode::NOT_FOUND.into_response()
            }
        }
        _ => StatusCode::NOT_FOUND.into_response(),
    }
}

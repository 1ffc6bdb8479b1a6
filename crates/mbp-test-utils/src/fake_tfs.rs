// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! In-memory stand-in for the TFS / Azure DevOps git REST API

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::{HeaderMap, StatusCode, header},
    response::{IntoResponse, Response},
    routing::get,
};
use base64::Engine;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use crate::MockServer;

/// A repository with branches and the files on each branch
#[derive(Debug, Clone)]
pub struct FakeRepo {
    pub id: String,
    pub name: String,
    /// (short branch name, absolute file paths), in ref listing order
    pub branches: Vec<(String, Vec<String>)>,
}

impl FakeRepo {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            branches: Vec::new(),
        }
    }

    /// Add a branch holding `files` (absolute paths like `/Jenkinsfile`)
    pub fn branch(mut self, name: &str, files: &[&str]) -> Self {
        self.branches
            .push((name.to_string(), files.iter().map(|f| f.to_string()).collect()));
        self
    }

    fn files_on(&self, branch: &str) -> Option<&[String]> {
        self.branches.iter().find(|(b, _)| b == branch).map(|(_, files)| files.as_slice())
    }
}

/// Fake team project served under `project_path`, e.g. `/tfs/Coll/Payments`
#[derive(Debug, Clone)]
pub struct FakeTfs {
    project_path: String,
    repos: Vec<FakeRepo>,
    expected_auth: Option<String>,
    legacy_missing_items: bool,
}

impl FakeTfs {
    pub fn new(project_path: &str) -> Self {
        Self {
            project_path: format!("/{}", project_path.trim_matches('/')),
            repos: Vec::new(),
            expected_auth: None,
            legacy_missing_items: false,
        }
    }

    pub fn repo(mut self, repo: FakeRepo) -> Self {
        self.repos.push(repo);
        self
    }

    /// Answer 401 unless requests carry these Basic credentials
    pub fn require_basic_auth(mut self, username: &str, password: &str) -> Self {
        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", username, password));
        self.expected_auth = Some(format!("Basic {}", encoded));
        self
    }

    /// Report missing items and branches as `200 {}` instead of `404`,
    /// the way older TFS servers did
    pub fn legacy_missing_items(mut self) -> Self {
        self.legacy_missing_items = true;
        self
    }

    pub fn router(self) -> Router {
        let prefix = self.project_path.clone();
        Router::new()
            .route(&format!("{}/_apis/git/repositories", prefix), get(list_repositories))
            .route(&format!("{}/_apis/git/repositories/:id/refs", prefix), get(list_refs))
            .route(&format!("{}/_apis/git/repositories/:id/items", prefix), get(get_items))
            .with_state(Arc::new(self))
    }

    /// Spawn the fake; returns the server and the team project URL
    pub async fn spawn(self) -> (MockServer, String) {
        let path = self.project_path.clone();
        let server = MockServer::spawn(self.router()).await;
        let url = format!("{}{}", server.base_url(), path);
        (server, url)
    }

    fn check_auth(&self, headers: &HeaderMap) -> Result<(), Response> {
        let Some(expected) = &self.expected_auth else {
            return Ok(());
        };
        let actual = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok());
        if actual == Some(expected.as_str()) {
            Ok(())
        } else {
            Err((StatusCode::UNAUTHORIZED, "Access denied").into_response())
        }
    }

    fn find_repo(&self, id: &str) -> Result<&FakeRepo, Response> {
        self.repos.iter().find(|r| r.id == id).ok_or_else(|| {
            error_response(
                StatusCode::NOT_FOUND,
                "GitRepositoryNotFoundException",
                &format!("TF401019: The Git repository with name or identifier {} does not exist", id),
            )
        })
    }

    fn missing(&self, type_key: &str, message: &str) -> Response {
        if self.legacy_missing_items {
            (StatusCode::OK, Json(json!({}))).into_response()
        } else {
            error_response(StatusCode::NOT_FOUND, type_key, message)
        }
    }
}

fn error_response(status: StatusCode, type_key: &str, message: &str) -> Response {
    (
        status,
        Json(json!({
            "$id": "1",
            "innerException": null,
            "message": message,
            "typeName": format!("Microsoft.TeamFoundation.Git.Server.{}", type_key),
            "typeKey": type_key,
            "errorCode": 0,
        })),
    )
        .into_response()
}

fn param<'a>(params: &'a HashMap<String, String>, name: &str) -> Option<&'a str> {
    params.iter().find(|(k, _)| k.eq_ignore_ascii_case(name)).map(|(_, v)| v.as_str())
}

async fn list_repositories(State(tfs): State<Arc<FakeTfs>>, headers: HeaderMap) -> Response {
    if let Err(resp) = tfs.check_auth(&headers) {
        return resp;
    }
    let value: Vec<Value> = tfs
        .repos
        .iter()
        .map(|r| {
            json!({
                "id": r.id,
                "name": r.name,
                "remoteUrl": format!("{}/_git/{}", tfs.project_path, r.name),
            })
        })
        .collect();
    Json(json!({ "value": value, "count": value.len() })).into_response()
}

async fn list_refs(
    State(tfs): State<Arc<FakeTfs>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = tfs.check_auth(&headers) {
        return resp;
    }
    let repo = match tfs.find_repo(&id) {
        Ok(repo) => repo,
        Err(resp) => return resp,
    };
    let value: Vec<Value> = repo
        .branches
        .iter()
        .enumerate()
        .map(|(i, (name, _))| {
            json!({
                "name": format!("refs/heads/{}", name),
                "objectId": format!("{:040x}", i + 1),
            })
        })
        .collect();
    Json(json!({ "value": value, "count": value.len() })).into_response()
}

async fn get_items(
    State(tfs): State<Arc<FakeTfs>>,
    Path(id): Path<String>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if let Err(resp) = tfs.check_auth(&headers) {
        return resp;
    }
    let repo = match tfs.find_repo(&id) {
        Ok(repo) => repo,
        Err(resp) => return resp,
    };

    let version = param(&params, "version").unwrap_or_default();
    let scope = param(&params, "scopePath").unwrap_or("/");
    let Some(files) = repo.files_on(version) else {
        return tfs.missing(
            "GitUnresolvableToCommitException",
            &format!("TF401175: The version descriptor <Branch: {}> could not be resolved", version),
        );
    };

    let one_level = param(&params, "recursionLevel")
        .is_some_and(|level| level.eq_ignore_ascii_case("OneLevel"));

    if one_level && scope == "/" {
        let mut value = vec![json!({ "path": "/", "isFolder": true, "gitObjectType": "tree" })];
        value.extend(
            files
                .iter()
                .filter(|f| f.trim_start_matches('/').split('/').count() == 1)
                .map(|f| json!({ "path": f, "gitObjectType": "blob" })),
        );
        return Json(json!({ "value": value, "count": value.len() })).into_response();
    }

    if files.iter().any(|f| f == scope) {
        Json(json!({
            "count": 1,
            "value": [{ "path": scope, "gitObjectType": "blob", "objectId": "b10b" }],
        }))
        .into_response()
    } else {
        tfs.missing(
            "GitItemNotFoundException",
            &format!("TF401174: The item '{}' could not be found in the repository", scope),
        )
    }
}

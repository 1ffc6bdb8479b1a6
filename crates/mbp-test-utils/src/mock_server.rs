// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Ephemeral-port HTTP server with request recording

use axum::{
    Router,
    body::Body,
    extract::{Request, State},
    middleware::{self, Next},
    response::Response,
};
use std::sync::{Arc, Mutex};
use tokio::task::JoinHandle;

/// One request as seen by the server
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: String,
    /// Raw (still percent-encoded) path
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
    pub accept: Option<String>,
    pub body: String,
}

impl RecordedRequest {
    /// Value of a query parameter, compared case-insensitively by name
    pub fn query_param(&self, name: &str) -> Option<String> {
        let query = self.query.as_deref()?;
        query.split('&').find_map(|pair| {
            let (k, v) = pair.split_once('=').unwrap_or((pair, ""));
            k.eq_ignore_ascii_case(name).then(|| {
                percent_encoding::percent_decode_str(v).decode_utf8_lossy().into_owned()
            })
        })
    }
}

/// Shared, append-only list of requests
#[derive(Debug, Clone, Default)]
pub struct RequestLog(Arc<Mutex<Vec<RecordedRequest>>>);

impl RequestLog {
    pub fn all(&self) -> Vec<RecordedRequest> {
        self.0.lock().map(|v| v.clone()).unwrap_or_default()
    }

    /// Requests whose path ends with `suffix`
    pub fn matching(&self, method: &str, suffix: &str) -> Vec<RecordedRequest> {
        self.all()
            .into_iter()
            .filter(|r| r.method == method && r.path.ends_with(suffix))
            .collect()
    }

    pub fn count(&self, method: &str, suffix: &str) -> usize {
        self.matching(method, suffix).len()
    }

    fn push(&self, request: RecordedRequest) {
        if let Ok(mut v) = self.0.lock() {
            v.push(request);
        }
    }
}

/// A running server; aborted when dropped
pub struct MockServer {
    base_url: String,
    requests: RequestLog,
    handle: JoinHandle<()>,
}

impl MockServer {
    /// Serve `router` on `127.0.0.1:0`
    pub async fn spawn(router: Router) -> Self {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind to ephemeral port");
        let addr = listener.local_addr().expect("local addr");

        let requests = RequestLog::default();
        let app = router.layer(middleware::from_fn_with_state(requests.clone(), record));

        let handle = tokio::spawn(async move {
            axum::serve(listener, app).await.expect("mock server run");
        });

        Self {
            base_url: format!("http://{}", addr),
            requests,
            handle,
        }
    }

    /// `http://127.0.0.1:<port>`, without trailing slash
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// `base_url` followed by `path`
    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn requests(&self) -> &RequestLog {
        &self.requests
    }
}

impl Drop for MockServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

async fn record(State(log): State<RequestLog>, req: Request, next: Next) -> Response {
    let (parts, body) = req.into_parts();
    let bytes = axum::body::to_bytes(body, usize::MAX).await.unwrap_or_default();

    let header = |name: axum::http::HeaderName| {
        parts.headers.get(name).and_then(|v| v.to_str().ok()).map(str::to_string)
    };
    log.push(RecordedRequest {
        method: parts.method.to_string(),
        path: parts.uri.path().to_string(),
        query: parts.uri.query().map(str::to_string),
        authorization: header(axum::http::header::AUTHORIZATION),
        content_type: header(axum::http::header::CONTENT_TYPE),
        accept: header(axum::http::header::ACCEPT),
        body: String::from_utf8_lossy(&bytes).into_owned(),
    });

    next.run(Request::from_parts(parts, Body::from(bytes))).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::routing::get;

    #[tokio::test]
    async fn records_requests_and_serves_routes() {
        let server = MockServer::spawn(Router::new().route("/ping", get(|| async { "pong" }))).await;

        let body = reqwest::get(server.url("/ping?x=a%20b")).await.unwrap().text().await.unwrap();
        assert_eq!(body, "pong");

        let recorded = server.requests().matching("GET", "/ping");
        assert_eq!(recorded.len(), 1);
        assert_eq!(recorded[0].query_param("X").as_deref(), Some("a b"));
    }
}

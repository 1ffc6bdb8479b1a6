// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! HTTP transport shared by the git host and job server clients

use reqwest::header::{ACCEPT, CONTENT_TYPE, HeaderValue};
use reqwest::{Client as HttpClient, Method, StatusCode};
use serde_json::Value;
use std::time::Duration;
use tokio_util::sync::CancellationToken;
use url::Url;

use crate::auth::AuthConfig;
use crate::error::{RestClientError, RestClientResult};

/// Longest error body kept in [`RestClientError::Status`]
const MAX_ERROR_BODY: usize = 512;

/// Request body with its media type
#[derive(Debug, Clone)]
pub struct Payload {
    pub content_type: &'static str,
    pub text: String,
}

impl Payload {
    pub fn xml(text: impl Into<String>) -> Self {
        Self {
            content_type: "application/xml",
            text: text.into(),
        }
    }
}

/// Authenticated JSON-over-HTTP client
///
/// Every request carries `Accept: application/json` and the configured
/// credentials. Clones share the connection pool and the cancellation token.
#[derive(Debug, Clone)]
pub struct RestClient {
    http_client: HttpClient,
    auth: AuthConfig,
    timeout: Option<Duration>,
    cancel: CancellationToken,
}

impl RestClient {
    pub fn new(auth: AuthConfig) -> RestClientResult<Self> {
        let http_client = HttpClient::builder()
            .user_agent(concat!("mbp-seeder/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| RestClientError::Client(e.to_string()))?;

        Ok(Self {
            http_client,
            auth,
            timeout: None,
            cancel: CancellationToken::new(),
        })
    }

    /// Deadline applied to each request; `None` waits indefinitely
    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    /// Resolve every in-flight and future request to `Cancelled` once `token` fires
    pub fn with_cancellation(mut self, token: CancellationToken) -> Self {
        self.cancel = token;
        self
    }

    pub fn auth(&self) -> &AuthConfig {
        &self.auth
    }

    /// GET and decode a JSON body; any non-success status is an error
    pub async fn get_json(&self, url: &Url) -> RestClientResult<Value> {
        let (status, text) = self.execute(Method::GET, url, None, &[]).await?;
        let text = check_status(url, status, text)?;
        parse_json(url, &text)
    }

    /// Like [`RestClient::get_json`], but `404 Not Found` yields `None`
    pub async fn get_json_opt(&self, url: &Url) -> RestClientResult<Option<Value>> {
        let (status, text) = self.execute(Method::GET, url, None, &[]).await?;
        if status == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        let text = check_status(url, status, text)?;
        parse_json(url, &text).map(Some)
    }

    /// POST and return the response body; any non-success status is an error
    pub async fn post(
        &self,
        url: &Url,
        payload: Option<Payload>,
        headers: &[(&str, &str)],
    ) -> RestClientResult<String> {
        let (status, text) = self.execute(Method::POST, url, payload, headers).await?;
        check_status(url, status, text)
    }

    async fn execute(
        &self,
        method: Method,
        url: &Url,
        payload: Option<Payload>,
        headers: &[(&str, &str)],
    ) -> RestClientResult<(StatusCode, String)> {
        if self.cancel.is_cancelled() {
            return Err(RestClientError::Cancelled);
        }

        let mut request = self
            .http_client
            .request(method.clone(), url.clone())
            .headers(self.auth.headers()?)
            .header(ACCEPT, HeaderValue::from_static("application/json"));
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        if let Some(payload) = payload {
            request = request.header(CONTENT_TYPE, payload.content_type).body(payload.text);
        }
        if let Some(timeout) = self.timeout {
            request = request.timeout(timeout);
        }

        tracing::debug!(%method, %url, "sending request");
        let exchange = async {
            let response = request.send().await.map_err(|e| self.map_transport(url, e))?;
            let status = response.status();
            let text = response.text().await.map_err(|e| self.map_transport(url, e))?;
            Ok((status, text))
        };

        let result = tokio::select! {
            biased;
            _ = self.cancel.cancelled() => Err(RestClientError::Cancelled),
            result = exchange => result,
        };

        match &result {
            Ok((status, _)) => tracing::debug!(%method, %url, %status, "received response"),
            Err(e) => tracing::debug!(%method, %url, error = %e, "request failed"),
        }
        result
    }

    fn map_transport(&self, url: &Url, e: reqwest::Error) -> RestClientError {
        match self.timeout {
            Some(timeout) if e.is_timeout() => RestClientError::Timeout {
                url: url.to_string(),
                timeout,
            },
            _ => RestClientError::Transport {
                url: url.to_string(),
                source: e,
            },
        }
    }
}

/// Map a status to success or the matching error
///
/// Azure DevOps answers a bad personal access token with `203` and a sign-in
/// page, so that status counts as an authentication failure too.
fn check_status(url: &Url, status: StatusCode, text: String) -> RestClientResult<String> {
    match status {
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN | StatusCode::NON_AUTHORITATIVE_INFORMATION => {
            Err(RestClientError::Auth {
                url: url.to_string(),
                status,
            })
        }
        s if s.is_success() => Ok(text),
        _ => Err(RestClientError::Status {
            url: url.to_string(),
            status,
            body: truncate(text, MAX_ERROR_BODY),
        }),
    }
}

fn parse_json(url: &Url, text: &str) -> RestClientResult<Value> {
    serde_json::from_str(text).map_err(|e| RestClientError::Parse {
        url: url.to_string(),
        message: e.to_string(),
    })
}

fn truncate(mut text: String, max: usize) -> String {
    if text.len() > max {
        let mut cut = max;
        while !text.is_char_boundary(cut) {
            cut -= 1;
        }
        text.truncate(cut);
        text.push('…');
    }
    text
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for REST calls

use reqwest::StatusCode;
use std::time::Duration;
use thiserror::Error;

pub type RestClientResult<T> = Result<T, RestClientError>;

#[derive(Debug, Error)]
pub enum RestClientError {
    /// Network-level failure: DNS, connect, TLS, reset
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("{url} rejected the credentials ({status})")]
    Auth { url: String, status: StatusCode },

    #[error("{url} answered {status}: {body}")]
    Status {
        url: String,
        status: StatusCode,
        body: String,
    },

    #[error("unexpected response from {url}: {message}")]
    Parse { url: String, message: String },

    #[error("request to {url} timed out after {timeout:?}")]
    Timeout { url: String, timeout: Duration },

    #[error("request cancelled")]
    Cancelled,

    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),

    #[error(transparent)]
    Header(#[from] crate::auth::AuthError),

    #[error("failed to build HTTP client: {0}")]
    Client(String),
}

impl RestClientError {
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            RestClientError::Auth { status, .. } | RestClientError::Status { status, .. } => {
                Some(*status)
            }
            _ => None,
        }
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self, RestClientError::Cancelled)
    }
}

// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Authentication configuration

use base64::Engine;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};

/// How requests authenticate
#[derive(Clone, Default)]
pub enum AuthConfig {
    #[default]
    None,
    /// HTTP Basic; a personal access token goes in `password`
    Basic { username: String, password: String },
}

impl AuthConfig {
    pub fn basic(username: impl Into<String>, password: impl Into<String>) -> Self {
        AuthConfig::Basic {
            username: username.into(),
            password: password.into(),
        }
    }

    /// Headers to attach to every request
    pub fn headers(&self) -> Result<HeaderMap, AuthError> {
        let mut headers = HeaderMap::new();
        if let AuthConfig::Basic { username, password } = self {
            let encoded = base64::engine::general_purpose::STANDARD
                .encode(format!("{}:{}", username, password));
            let mut value = HeaderValue::from_str(&format!("Basic {}", encoded))
                .map_err(|e| AuthError::InvalidHeader(e.to_string()))?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}

impl std::fmt::Debug for AuthConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            AuthConfig::None => f.write_str("None"),
            AuthConfig::Basic { username, .. } => f
                .debug_struct("Basic")
                .field("username", username)
                .field("password", &"[REDACTED]")
                .finish(),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    #[error("invalid authorization header: {0}")]
    InvalidHeader(String),
}

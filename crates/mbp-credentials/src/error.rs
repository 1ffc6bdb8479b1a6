// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Error types for credential lookup

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for credentials operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while loading or querying credentials
#[derive(Debug, Error)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("TOML parsing error in {path}: {source}")]
    Toml {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Credential not found: {0}")]
    CredentialNotFound(String),

    #[error("Secret for credential '{id}' is unavailable: environment variable {var} is not set")]
    SecretUnavailable { id: String, var: String },
}

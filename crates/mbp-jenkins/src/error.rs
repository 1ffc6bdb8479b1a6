// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

use mbp_rest_client::RestClientError;
use thiserror::Error;

pub type JenkinsResult<T> = Result<T, JenkinsError>;

#[derive(Debug, Error)]
pub enum JenkinsError {
    /// `createItem` refused the job: the name is taken or the document is invalid
    #[error("Jenkins refused to create '{name}': {reason}")]
    Rejected { name: String, reason: String },

    #[error("invalid Jenkins URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error(transparent)]
    Rest(#[from] RestClientError),
}

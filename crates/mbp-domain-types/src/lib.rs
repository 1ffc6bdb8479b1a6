// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Domain types for the multibranch pipeline seeder
//!
//! These types describe what a crawl of a team project produces and what the
//! job materialization step consumes. None of them are persisted; every
//! invocation builds them fresh from the git host's answers.

pub mod job;
pub mod repository;
pub mod team_project;

pub use job::*;
pub use repository::*;
pub use team_project::*;

use thiserror::Error;

/// Errors raised when constructing domain values from external input
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("branch ref '{0}' does not start with 'refs/heads/'")]
    MalformedRef(String),

    #[error("invalid team project URL '{url}': {reason}")]
    InvalidTeamProjectUrl { url: String, reason: String },
}

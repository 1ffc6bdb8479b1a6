// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Multibranch pipeline seeding
//!
//! Crawls a team project for repositories that carry a pipeline definition,
//! renders one job configuration per finding and creates the jobs that do
//! not exist yet in the target folder.

pub mod discovery;
pub mod git_host;
pub mod job_container;
pub mod materialize;
pub mod seed;
pub mod template;

#[cfg(test)]
mod test_support;

pub use discovery::{DiscoveryError, DiscoveryOptions, DiscoveryResult, discover};
pub use git_host::GitHost;
pub use job_container::{JobContainer, JobContainerError};
pub use materialize::{MaterializeCancelled, MaterializeOptions, materialize_jobs};
pub use seed::{GitHostSettings, SeedError, SeedPlan, SeedReport, connect, seed, seed_with_host};
pub use template::{Escaping, Materialized, TemplateError, TemplateSet, Token, TokenValues, materialize};

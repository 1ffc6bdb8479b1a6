// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Strongly-typed configuration sections for the seeder.
//!
//! Each section is extracted from the merged configuration JSON at its own
//! top-level key (`git-host`, `discovery`, `jenkins`, `credentials`). Every
//! field is optional in the file; the accessor methods supply the defaults.

pub mod credentials;
pub mod discovery;
pub mod git_host;
pub mod jenkins;

pub use credentials::CredentialsSection;
pub use discovery::DiscoveryConfig;
pub use git_host::GitHostConfig;
pub use jenkins::JenkinsConfig;

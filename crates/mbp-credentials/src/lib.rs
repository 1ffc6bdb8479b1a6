// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Credential lookup for the seeder.
//!
//! The seeder never owns secrets. It asks a [`CredentialStore`] for the
//! username and token behind an id, and hands them to the REST clients.
//! This crate provides:
//! - the [`CredentialStore`] trait the rest of the workspace depends on
//! - a TOML-backed store ([`FileCredentialStore`]) with id, alias and
//!   username lookup
//! - an in-memory store for tests and embedding

pub mod config;
pub mod error;
pub mod registry;
pub mod storage;
pub mod types;

pub use config::CredentialsConfig;
pub use error::{Error, Result};
pub use registry::{CredentialStore, FileCredentialStore, StaticCredentialStore};
pub use types::{Credential, CredentialEntry, Secret};

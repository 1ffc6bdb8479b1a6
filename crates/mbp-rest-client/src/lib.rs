// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! REST client for the TFS / Azure DevOps git API
//!
//! [`RestClient`] is the transport: Basic auth, JSON decoding, status
//! mapping, an optional per-request timeout and cooperative cancellation.
//! [`TfsClient`] builds the team project endpoints on top of it. The job
//! server client in `mbp-jenkins` reuses the same transport.
//!
//! Requests are never retried. Any failure is returned to the caller, which
//! aborts the crawl.

pub mod auth;
pub mod client;
pub mod error;
pub mod tfs;

pub use auth::*;
pub use client::*;
pub use error::*;
pub use tfs::{ScanOptions, TfsClient};

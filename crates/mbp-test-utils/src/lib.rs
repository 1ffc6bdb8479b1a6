// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Test fixtures shared by the seeder crates
//!
//! Integration tests run the real REST clients against in-process HTTP
//! servers bound to an ephemeral port:
//! - [`MockServer`] serves any axum router and records every request
//! - [`FakeTfs`] answers the git host endpoints for a described team project
//! - [`FakeJenkins`] keeps an in-memory folder of jobs

pub mod fake_jenkins;
pub mod fake_tfs;
pub mod mock_server;

pub use fake_jenkins::FakeJenkins;
pub use fake_tfs::{FakeRepo, FakeTfs};
pub use mock_server::{MockServer, RecordedRequest, RequestLog};

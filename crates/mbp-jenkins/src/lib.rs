// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Client for the Jenkins folder and job REST endpoints
//!
//! [`JenkinsClient`] talks to one controller and caches its CSRF crumb.
//! [`JenkinsFolder`] scopes it to the folder that receives generated jobs.

pub mod client;
pub mod error;

pub use client::{JenkinsClient, JenkinsFolder};
pub use error::{JenkinsError, JenkinsResult};

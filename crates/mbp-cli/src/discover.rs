// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `discover`: crawl only

use anyhow::Result;
use clap::Args;
use mbp_domain_types::DiscoveryReport;
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::SubcommandOverrides;
use crate::config::Settings;

#[derive(Args, Debug, Clone, Default)]
pub struct DiscoverArgs {
    /// Repositories crawled at once
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Skip the default branch scan for ad hoc pipeline files
    #[arg(long)]
    pub no_ad_hoc: bool,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl SubcommandOverrides for DiscoverArgs {
    fn config_overrides(&self) -> Vec<(&'static str, Value)> {
        let mut flags = Vec::new();
        if let Some(n) = self.concurrency {
            flags.push(("git-host.concurrency", Value::from(n)));
        }
        if self.no_ad_hoc {
            flags.push(("discovery.ad-hoc", Value::Bool(false)));
        }
        flags
    }
}

impl DiscoverArgs {
    pub async fn run(self, settings: &Settings, cancel: CancellationToken) -> Result<()> {
        let plan = settings.seed_plan()?;
        let credentials = settings.credential_store().await?;
        let host = mbp_core::connect(&credentials, &settings.git_host_settings(cancel)?, &plan).await?;

        let report = mbp_core::discover(&host, &plan.discovery).await?;
        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(())
    }
}

fn print_report(report: &DiscoveryReport) {
    println!("Repositories with a pipeline definition:");
    for candidate in &report.candidates {
        println!("  {:<40} {}", candidate.repository.name, candidate.branch);
    }
    if report.candidates.is_empty() {
        println!("  none");
    }

    if !report.ad_hoc.is_empty() {
        println!("Ad hoc pipelines:");
        for request in &report.ad_hoc {
            println!("  {:<40} {}", request.job_name(), request.file);
        }
    }
}

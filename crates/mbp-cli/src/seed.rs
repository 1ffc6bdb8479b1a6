// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! `seed`: crawl, render and create the missing jobs

use anyhow::Result;
use clap::Args;
use mbp_core::{SeedError, SeedReport};
use mbp_domain_types::{JobOutcome, JobRecord};
use serde_json::Value;
use tokio_util::sync::CancellationToken;

use crate::SubcommandOverrides;
use crate::config::Settings;

#[derive(Args, Debug, Clone, Default)]
pub struct SeedArgs {
    /// Crawl and render, but create nothing
    #[arg(long)]
    pub dry_run: bool,
    /// Queue a first run of every multibranch job created
    #[arg(long)]
    pub run_pipelines: bool,
    /// Folder to create jobs in, `/`-separated (default: team project name)
    #[arg(long)]
    pub folder: Option<String>,
    /// Jenkins root URL
    #[arg(long)]
    pub jenkins_url: Option<String>,
    /// Repositories crawled at once
    #[arg(long)]
    pub concurrency: Option<usize>,
    /// Print the report as JSON
    #[arg(long)]
    pub json: bool,
}

impl SubcommandOverrides for SeedArgs {
    fn config_overrides(&self) -> Vec<(&'static str, Value)> {
        let mut flags = Vec::new();
        if self.run_pipelines {
            flags.push(("jenkins.run-pipelines", Value::Bool(true)));
        }
        if let Some(folder) = &self.folder {
            flags.push(("jenkins.folder", Value::from(folder.as_str())));
        }
        if let Some(url) = &self.jenkins_url {
            flags.push(("jenkins.url", Value::from(url.as_str())));
        }
        if let Some(n) = self.concurrency {
            flags.push(("git-host.concurrency", Value::from(n)));
        }
        flags
    }
}

impl SeedArgs {
    /// Returns whether every job ended without failure
    pub async fn run(self, settings: &Settings, cancel: CancellationToken) -> Result<bool> {
        let mut plan = settings.seed_plan()?;
        plan.dry_run = self.dry_run;

        let credentials = settings.credential_store().await?;
        let git_host = settings.git_host_settings(cancel.clone())?;
        let container = settings
            .jenkins_folder(&credentials, &plan.project.name, cancel)
            .await?;
        let templates = settings.templates().await?;

        let report = match mbp_core::seed(&credentials, &git_host, &container, &templates, &plan).await {
            Ok(report) => report,
            Err(SeedError::Cancelled { completed }) => {
                eprintln!("Cancelled.");
                print_jobs(&completed);
                return Ok(false);
            }
            Err(e) => return Err(e.into()),
        };

        if self.json {
            println!("{}", serde_json::to_string_pretty(&report)?);
        } else {
            print_report(&report);
        }
        Ok(!report.has_failures())
    }
}

fn print_report(report: &SeedReport) {
    if report.dry_run {
        println!("Dry run for {} into folder {}:", report.team_project, report.container);
        for job in &report.planned {
            println!("  would create {} ({})", job.job_name, job.kind);
        }
        if report.planned.is_empty() && report.jobs.is_empty() {
            println!("  nothing to create");
        }
        print_jobs(&report.jobs);
        return;
    }

    println!("Seeded {} into folder {}:", report.team_project, report.container);
    print_jobs(&report.jobs);
    println!(
        "{} created, {} already present, {} failed",
        report.created(),
        report.jobs.iter().filter(|j| j.outcome == JobOutcome::Exists).count(),
        report.jobs.iter().filter(|j| j.outcome.is_failure()).count()
    );
}

fn print_jobs(jobs: &[JobRecord]) {
    for job in jobs {
        println!("  {:<40} {}", job.job_name, describe(&job.outcome));
    }
}

fn describe(outcome: &JobOutcome) -> String {
    match outcome {
        JobOutcome::Exists => "already exists".to_string(),
        JobOutcome::Created {
            scheduled: true, ..
        } => "created, run queued".to_string(),
        JobOutcome::Created {
            schedule_error: Some(e),
            ..
        } => format!("created, run not queued: {}", e),
        JobOutcome::Created { .. } => "created".to_string(),
        JobOutcome::CreateFailed { reason } => format!("FAILED: {}", reason),
    }
}

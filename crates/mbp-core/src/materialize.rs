// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Job materialization driver
//!
//! Jobs are handled one at a time: check whether the name is taken, render
//! and create it if not, then optionally queue a first run. A failure only
//! affects its own job. The existence check is the only guard against
//! duplicates; two concurrent seeders targeting one folder can still race.

use mbp_domain_types::{JobDescriptor, JobKind, JobOutcome, JobRecord};
use thiserror::Error;

use crate::job_container::{JobContainer, JobContainerError};
use crate::template::TemplateSet;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MaterializeOptions {
    /// Queue branch indexing for every multibranch job created
    pub run_pipelines: bool,
}

#[derive(Debug, Error)]
#[error("job materialization cancelled after {} job(s)", .completed.len())]
pub struct MaterializeCancelled {
    /// Jobs handled before the cancellation
    pub completed: Vec<JobRecord>,
}

fn label(kind: JobKind) -> &'static str {
    match kind {
        JobKind::Multibranch => "multibranch pipeline",
        JobKind::AdHoc => "pipeline",
    }
}

/// Submit every descriptor to `container`, in order
pub async fn materialize_jobs<C>(
    container: &C,
    templates: &TemplateSet,
    descriptors: Vec<JobDescriptor>,
    options: MaterializeOptions,
) -> Result<Vec<JobRecord>, MaterializeCancelled>
where
    C: JobContainer + ?Sized,
{
    let mut completed = Vec::with_capacity(descriptors.len());
    for descriptor in descriptors {
        match materialize_one(container, templates, &descriptor, options).await {
            Ok(record) => completed.push(record),
            Err(Cancelled(partial)) => {
                completed.extend(partial);
                tracing::warn!(handled = completed.len(), "job materialization cancelled");
                return Err(MaterializeCancelled { completed });
            }
        }
    }
    Ok(completed)
}

/// Cancellation, with the record of a job created just before it
struct Cancelled(Option<JobRecord>);

async fn materialize_one<C>(
    container: &C,
    templates: &TemplateSet,
    descriptor: &JobDescriptor,
    options: MaterializeOptions,
) -> Result<JobRecord, Cancelled>
where
    C: JobContainer + ?Sized,
{
    let name = descriptor.job_name.as_str();
    let kind = label(descriptor.kind);
    let mut record = JobRecord {
        job_name: descriptor.job_name.clone(),
        kind: descriptor.kind,
        repository: descriptor.repository_name.clone(),
        unique_id: None,
        outcome: JobOutcome::Exists,
    };

    match container.exists(name).await {
        Ok(true) => {
            tracing::info!("{} {} already exists", name, kind);
            return Ok(record);
        }
        Ok(false) => {}
        Err(JobContainerError::Cancelled) => return Err(Cancelled(None)),
        Err(e) => {
            tracing::warn!(job = name, error = %e, "could not check whether the job exists");
            record.outcome = JobOutcome::CreateFailed {
                reason: format!("existence check failed: {}", e),
            };
            return Ok(record);
        }
    }

    let rendered = match templates.render(descriptor) {
        Ok(rendered) => rendered,
        Err(e) => {
            tracing::warn!(job = name, error = %e, "could not render job configuration");
            record.outcome = JobOutcome::CreateFailed {
                reason: e.to_string(),
            };
            return Ok(record);
        }
    };
    record.unique_id = Some(rendered.unique_id);

    match container.create(name, &rendered.document).await {
        Ok(()) => tracing::info!("Created {} for: {}", kind, name),
        Err(JobContainerError::Cancelled) => return Err(Cancelled(None)),
        Err(e) => {
            tracing::warn!(job = name, error = %e, "failed to create {}", kind);
            record.outcome = JobOutcome::CreateFailed {
                reason: e.to_string(),
            };
            return Ok(record);
        }
    }

    // Ad hoc jobs are left for their first manual or SCM-triggered run
    if !(options.run_pipelines && descriptor.kind == JobKind::Multibranch) {
        record.outcome = JobOutcome::Created {
            scheduled: false,
            schedule_error: None,
        };
        return Ok(record);
    }

    match container.schedule_run(name).await {
        Ok(()) => {
            tracing::info!(job = name, "scheduled first run");
            record.outcome = JobOutcome::Created {
                scheduled: true,
                schedule_error: None,
            };
            Ok(record)
        }
        Err(e) => {
            tracing::warn!(job = name, error = %e, "created but could not schedule a run");
            let cancelled = matches!(e, JobContainerError::Cancelled);
            record.outcome = JobOutcome::Created {
                scheduled: false,
                schedule_error: Some(e.to_string()),
            };
            if cancelled {
                Err(Cancelled(Some(record)))
            } else {
                Ok(record)
            }
        }
    }
}

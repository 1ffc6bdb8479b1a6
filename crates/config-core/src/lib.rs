// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Layered configuration engine with schema validation, merging, and provenance tracking.
//!
//! Configuration is loaded from TOML files, `MBP_*` environment variables and
//! CLI flags. Every layer is turned into a `serde_json::Value`, file layers
//! are validated against the [`SchemaRoot`] schema, and the layers are merged
//! in precedence order. Typed sections are then pulled out with [`extract`].

pub mod env;
pub mod extract;
pub mod loader;
pub mod merge;
pub mod paths;
pub mod provenance;
pub mod schema;

pub use provenance::{Provenance, Scope};
pub use schema::SchemaRoot;

use anyhow::Result;
use serde::de::DeserializeOwned;
use serde_json::Value as J;

/// Final resolved configuration with provenance information
#[derive(Debug)]
pub struct Resolved {
    /// Final merged JSON configuration
    pub json: J,
    /// Provenance tracking for all configuration values
    pub provenance: Provenance,
}

impl Resolved {
    /// Typed section at `dotted`, defaulted when absent
    pub fn section<T: DeserializeOwned + Default>(&self, dotted: &str) -> Result<T> {
        extract::section(&self.json, dotted)
    }
}

/// Load and merge all configuration layers according to precedence rules
///
/// Precedence order: system < user < project < env < cli-config < flags
pub fn load_all(paths: &paths::Paths, flag_sets: &[(&str, J)]) -> Result<Resolved> {
    load_all_with_env(paths, flag_sets, env::env_overlay()?)
}

/// [`load_all`] with an explicit environment overlay
pub fn load_all_with_env(
    paths: &paths::Paths,
    flag_sets: &[(&str, J)],
    env_layer: J,
) -> Result<Resolved> {
    use Scope::*;

    let read_optional = |path: Option<&std::path::PathBuf>, scope: Scope| -> Result<Option<J>> {
        match path {
            Some(p) if p.exists() => Ok(Some(loader::read_layer_from_file(p, scope)?.json)),
            _ => Ok(None),
        }
    };

    let cli_config = match &paths.cli_config {
        // An explicitly requested file must exist
        Some(p) => Some(loader::read_layer_from_file(p, CliConfig)?.json),
        None => None,
    };

    let layers = vec![
        (read_optional(Some(&paths.system), System)?, System),
        (read_optional(Some(&paths.user), User)?, User),
        (read_optional(paths.project.as_ref(), Project)?, Project),
        (Some(env_layer), Env),
        (cli_config, CliConfig),
        (Some(env::flags_overlay(flag_sets)), Flags),
    ];

    let mut prov = Provenance::default();
    let mut json = serde_json::json!({});
    for (layer, scope) in layers {
        if let Some(layer) = layer {
            prov.record_layer(&layer, scope, "");
            merge::merge_two_json(&mut json, layer);
        }
    }

    Ok(Resolved {
        json,
        provenance: prov,
    })
}

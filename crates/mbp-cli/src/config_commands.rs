// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only
#![allow(clippy::disallowed_methods)] // CLI commands intentionally print to stdout/stderr

//! Configuration inspection commands
use anyhow::Result;
use clap::Subcommand;
use config_core::{Provenance, Resolved};
use serde_json::Value;

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigCommands {
    /// Show the resolved configuration
    Show {
        /// Show only this dotted key
        key: Option<String>,
        /// Show which configuration layer set each value
        #[arg(long)]
        explain: bool,
    },
    /// Print the JSON schema configuration files are validated against
    Schema,
}

impl ConfigCommands {
    pub fn run(self, resolved: &Resolved) -> Result<()> {
        match self {
            ConfigCommands::Show { key, explain } => {
                for line in show_lines(resolved, key.as_deref(), explain) {
                    println!("{}", line);
                }
                Ok(())
            }
            ConfigCommands::Schema => {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&config_core::schema::json_schema())?
                );
                Ok(())
            }
        }
    }
}

/// `key=value` lines, optionally annotated with their origin
pub fn show_lines(resolved: &Resolved, key_filter: Option<&str>, explain: bool) -> Vec<String> {
    if explain && key_filter.is_none() {
        return resolved.provenance.explain();
    }

    let mut lines = Vec::new();
    match key_filter {
        Some(key) => match get_nested_value(&resolved.json, key) {
            Some(value) => flatten(value, key, explain, &resolved.provenance, &mut lines),
            None => lines.push(format!("Configuration key '{}' not found", key)),
        },
        None => flatten(&resolved.json, "", explain, &resolved.provenance, &mut lines),
    }
    lines
}

fn get_nested_value<'a>(json: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = json;
    for part in path.split('.') {
        current = current.get(part)?;
    }
    Some(current)
}

fn flatten(json: &Value, prefix: &str, explain: bool, provenance: &Provenance, out: &mut Vec<String>) {
    match json {
        Value::Object(obj) => {
            for (key, value) in obj {
                let full_key = if prefix.is_empty() {
                    key.clone()
                } else {
                    format!("{}.{}", prefix, key)
                };
                flatten(value, &full_key, explain, provenance, out);
            }
        }
        _ => match provenance.winner.get(prefix).filter(|_| explain) {
            Some(scope) => out.push(format!("{}={} (from {})", prefix, json, scope)),
            None => out.push(format!("{}={}", prefix, json)),
        },
    }
}

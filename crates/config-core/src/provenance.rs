// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Provenance tracking for configuration values

use serde_json::Value as J;
use std::collections::BTreeMap;

/// Configuration scope precedence order
#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd)]
pub enum Scope {
    System,
    User,
    Project,
    Env,
    CliConfig,
    Flags,
}

impl std::fmt::Display for Scope {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Scope::System => "system",
            Scope::User => "user",
            Scope::Project => "project",
            Scope::Env => "env",
            Scope::CliConfig => "cli-config",
            Scope::Flags => "flags",
        };
        f.write_str(s)
    }
}

/// Provenance information for configuration values
#[derive(Default, Clone, Debug)]
pub struct Provenance {
    /// Maps dotted key paths to the winning scope
    pub winner: BTreeMap<String, Scope>,
    /// Maps dotted key paths to change history [(scope, value)]
    pub changes: BTreeMap<String, Vec<(Scope, J)>>,
}

impl Provenance {
    /// Record every leaf value of `layer` as set by `scope`
    pub fn record_layer(&mut self, layer: &J, scope: Scope, prefix: &str) {
        match layer {
            J::Object(obj) => {
                for (k, v) in obj {
                    let pfx = if prefix.is_empty() {
                        k.clone()
                    } else {
                        format!("{}.{}", prefix, k)
                    };
                    self.record_layer(v, scope, &pfx);
                }
            }
            J::Null => {}
            _ => {
                self.winner.insert(prefix.to_string(), scope);
                self.changes.entry(prefix.to_string()).or_default().push((scope, layer.clone()));
            }
        }
    }

    /// One line per key: `key = value (scope)`, overridden values listed after it
    pub fn explain(&self) -> Vec<String> {
        let mut lines = Vec::new();
        for (key, history) in &self.changes {
            let Some(((scope, value), overridden)) = history.split_last() else {
                continue;
            };
            lines.push(format!("{} = {} ({})", key, value, scope));
            for (scope, value) in overridden.iter().rev() {
                lines.push(format!("    overrides {} ({})", value, scope));
            }
        }
        lines
    }
}

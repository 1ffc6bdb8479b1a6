// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Environment variable and CLI flag overlays

use anyhow::Result;
use serde_json::Value as J;

/// Prefix shared by every configuration variable
pub const ENV_PREFIX: &str = "MBP";

/// Variables with the prefix that are not configuration keys
const RESERVED: &[&str] = &["MBP_HOME"];

/// Create JSON overlay from the process environment
pub fn env_overlay() -> Result<J> {
    env_overlay_from(std::env::vars())
}

/// Create JSON overlay from `MBP_*` variables
///
/// `__` separates sections and single underscores become dashes, so
/// `MBP_GIT_HOST__TEAM_PROJECT_URL` sets `git-host.team-project-url`.
/// Scalar values are parsed, so `MBP_JENKINS__RUN_PIPELINES=true` is a boolean.
pub fn env_overlay_from<I>(vars: I) -> Result<J>
where
    I: IntoIterator<Item = (String, String)>,
{
    let prefix = format!("{}_", ENV_PREFIX);
    let source: config::Map<String, String> = vars
        .into_iter()
        .filter(|(k, _)| k.starts_with(&prefix) && !RESERVED.contains(&k.as_str()))
        .collect();

    let built = config::Config::builder()
        .add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true)
                .source(Some(source)),
        )
        .build()?;

    let raw = serde_json::to_value(built.try_deserialize::<serde_json::Map<String, J>>()?)?;
    Ok(kebab_keys(raw))
}

fn kebab_keys(v: J) -> J {
    match v {
        J::Object(map) => J::Object(
            map.into_iter().map(|(k, v)| (k.replace('_', "-"), kebab_keys(v))).collect(),
        ),
        other => other,
    }
}

/// Create JSON overlay from CLI flags given as dotted keys
pub fn flags_overlay(kv_pairs: &[(&str, J)]) -> J {
    let mut root = serde_json::json!({});
    for (k, v) in kv_pairs {
        crate::merge::insert_dotted(&mut root, k, v.clone());
    }
    root
}

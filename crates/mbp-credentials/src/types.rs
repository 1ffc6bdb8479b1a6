// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Core types for credential storage

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// A secret value whose `Debug` output never shows the content
#[derive(Clone, PartialEq, Eq)]
pub struct Secret(String);

impl Secret {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Debug for Secret {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("Secret([REDACTED])")
    }
}

/// A resolved username and secret pair
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Credential {
    /// Id the credential is stored under
    pub id: String,
    pub username: String,
    /// Password or personal access token
    pub secret: Secret,
}

impl Credential {
    pub fn new(id: impl Into<String>, username: impl Into<String>, secret: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            secret: Secret::new(secret),
        }
    }
}

/// One `[[credential]]` table in `credentials.toml`
#[derive(Debug, Clone, Serialize, Deserialize, schemars::JsonSchema, PartialEq)]
#[serde(rename_all = "kebab-case", deny_unknown_fields)]
pub struct CredentialEntry {
    /// Id used by configuration to reference this credential
    pub id: String,

    /// Alternative identifiers for this credential
    #[serde(default)]
    pub aliases: Vec<String>,

    pub username: String,

    /// Inline secret
    pub secret: Option<String>,

    /// Name of an environment variable holding the secret
    pub secret_env: Option<String>,
}

impl CredentialEntry {
    /// Whether `identifier` names this entry by id or alias
    pub fn answers_to(&self, identifier: &str) -> bool {
        self.id == identifier || self.aliases.iter().any(|a| a == identifier)
    }

    /// Resolve the secret, reading `secret-env` when set
    pub fn resolve(&self) -> Result<Credential> {
        let secret = match (&self.secret_env, &self.secret) {
            (Some(var), _) => std::env::var(var).map_err(|_| Error::SecretUnavailable {
                id: self.id.clone(),
                var: var.clone(),
            })?,
            (None, Some(secret)) => secret.clone(),
            (None, None) => {
                return Err(Error::Validation(format!(
                    "credential '{}' has neither secret nor secret-env",
                    self.id
                )));
            }
        };
        Ok(Credential {
            id: self.id.clone(),
            username: self.username.clone(),
            secret: Secret::new(secret),
        })
    }
}

/// Contents of `credentials.toml`
#[derive(Debug, Clone, Default, Serialize, Deserialize, schemars::JsonSchema)]
pub struct CredentialFile {
    #[serde(default, rename = "credential")]
    pub credentials: Vec<CredentialEntry>,
}

impl CredentialFile {
    /// Find by id, then alias, then username
    pub fn find(&self, identifier: &str) -> Option<&CredentialEntry> {
        self.credentials
            .iter()
            .find(|c| c.id == identifier)
            .or_else(|| self.credentials.iter().find(|c| c.answers_to(identifier)))
            .or_else(|| self.credentials.iter().find(|c| c.username == identifier))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, username: &str, aliases: &[&str]) -> CredentialEntry {
        CredentialEntry {
            id: id.into(),
            aliases: aliases.iter().map(|s| s.to_string()).collect(),
            username: username.into(),
            secret: Some("pat".into()),
            secret_env: None,
        }
    }

    #[test]
    fn secret_debug_is_redacted() {
        let cred = Credential::new("tfs", "svc", "super-secret");
        let dbg = format!("{:?}", cred);
        assert!(!dbg.contains("super-secret"));
        assert!(dbg.contains("REDACTED"));
        assert_eq!(cred.secret.expose(), "super-secret");
    }

    #[test]
    fn find_prefers_id_over_alias_and_username() {
        let file = CredentialFile {
            credentials: vec![
                entry("a", "tfs", &["tfs-main"]),
                entry("tfs", "builder", &[]),
            ],
        };
        assert_eq!(file.find("tfs").unwrap().username, "builder");
        assert_eq!(file.find("tfs-main").unwrap().id, "a");
        assert_eq!(file.find("builder").unwrap().id, "tfs");
        assert!(file.find("missing").is_none());
    }

    #[test]
    fn resolve_requires_some_secret() {
        let mut e = entry("x", "u", &[]);
        e.secret = None;
        assert!(matches!(e.resolve(), Err(Error::Validation(_))));
    }

    #[test]
    fn resolve_reports_missing_env_var() {
        let mut e = entry("x", "u", &[]);
        e.secret_env = Some("MBP_TEST_SURELY_UNSET_VARIABLE_1234".into());
        match e.resolve() {
            Err(Error::SecretUnavailable { id, var }) => {
                assert_eq!(id, "x");
                assert_eq!(var, "MBP_TEST_SURELY_UNSET_VARIABLE_1234");
            }
            other => panic!("unexpected: {:?}", other),
        }
    }
}

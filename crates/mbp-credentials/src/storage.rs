// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Loading and validating `credentials.toml`

use crate::{
    config::CredentialsConfig,
    error::{Error, Result},
    types::CredentialFile,
};
use std::collections::HashSet;
use std::path::Path;
use tokio::fs as async_fs;

#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;

/// Load the credentials file named by `config`
///
/// A missing file yields an empty store; every lookup against it then fails
/// with [`Error::CredentialNotFound`].
pub async fn load_credential_file(config: &CredentialsConfig) -> Result<CredentialFile> {
    let path = config.credentials_file()?;
    load_credential_file_at(&path).await
}

/// Load and validate a credentials file at an explicit path
pub async fn load_credential_file_at(path: &Path) -> Result<CredentialFile> {
    if !path.exists() {
        tracing::debug!(path = %path.display(), "credentials file not present");
        return Ok(CredentialFile::default());
    }

    warn_if_shared(path).await;

    let content = async_fs::read_to_string(path).await?;
    let file: CredentialFile = toml::from_str(&content).map_err(|source| Error::Toml {
        path: path.to_path_buf(),
        source,
    })?;

    validate_credential_file(&file)?;
    tracing::debug!(
        path = %path.display(),
        count = file.credentials.len(),
        "loaded credentials file"
    );
    Ok(file)
}

/// Validate against the JSON schema, then check identifier uniqueness
fn validate_credential_file(file: &CredentialFile) -> Result<()> {
    use schemars::schema_for;
    use std::sync::OnceLock;

    static COMPILED_SCHEMA: OnceLock<std::result::Result<jsonschema::JSONSchema, String>> =
        OnceLock::new();

    let compiled_schema = COMPILED_SCHEMA.get_or_init(|| {
        let schema = schema_for!(CredentialFile);
        let schema_json = serde_json::to_value(&schema)
            .map_err(|e| format!("Failed to serialize schema: {}", e))?;
        jsonschema::JSONSchema::compile(&schema_json)
            .map_err(|e| format!("Failed to compile schema: {}", e))
    });
    let compiled_schema = compiled_schema
        .as_ref()
        .map_err(|err| Error::Validation(format!("Schema compilation failed: {}", err)))?;

    let file_json = serde_json::to_value(file)
        .map_err(|e| Error::Validation(format!("Failed to serialize credentials: {}", e)))?;
    if let Err(errors) = compiled_schema.validate(&file_json) {
        let error_messages: Vec<String> = errors.map(|e| e.to_string()).collect();
        return Err(Error::Validation(format!(
            "Schema validation failed: {}",
            error_messages.join(", ")
        )));
    }

    let mut seen = HashSet::new();
    for entry in &file.credentials {
        if entry.id.trim().is_empty() {
            return Err(Error::Validation("Credential id cannot be empty".to_string()));
        }
        for identifier in std::iter::once(&entry.id).chain(entry.aliases.iter()) {
            if !seen.insert(identifier.as_str()) {
                return Err(Error::Validation(format!(
                    "Identifier '{}' is used by more than one credential",
                    identifier
                )));
            }
        }
    }

    Ok(())
}

#[cfg(unix)]
async fn warn_if_shared(path: &Path) {
    if let Ok(metadata) = async_fs::metadata(path).await {
        let mode = metadata.permissions().mode();
        if mode & 0o077 != 0 {
            tracing::warn!(
                path = %path.display(),
                mode = format!("{:o}", mode & 0o777),
                "credentials file is readable by other users; consider chmod 600"
            );
        }
    }
}

#[cfg(not(unix))]
async fn warn_if_shared(_path: &Path) {}

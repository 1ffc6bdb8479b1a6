// Copyright 2025 Schelling Point Labs Inc
// SPDX-License-Identifier: AGPL-3.0-only

//! Credential lookup

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::{
    config::CredentialsConfig,
    error::{Error, Result},
    storage::load_credential_file,
    types::{Credential, CredentialFile},
};

/// Source of credentials by id
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Resolve `identifier` to a username and secret
    ///
    /// Fails with [`Error::CredentialNotFound`] when nothing matches.
    async fn lookup(&self, identifier: &str) -> Result<Credential>;
}

/// Credential store backed by `credentials.toml`
#[derive(Clone)]
pub struct FileCredentialStore {
    config: CredentialsConfig,
    file: Arc<RwLock<CredentialFile>>,
}

impl FileCredentialStore {
    /// Create a store; call [`FileCredentialStore::load`] before looking anything up
    pub fn new(config: CredentialsConfig) -> Self {
        Self {
            config,
            file: Arc::new(RwLock::new(CredentialFile::default())),
        }
    }

    /// Create and load in one step
    pub async fn open(config: CredentialsConfig) -> Result<Self> {
        let store = Self::new(config);
        store.load().await?;
        Ok(store)
    }

    /// (Re)load the credentials file from disk
    pub async fn load(&self) -> Result<()> {
        let loaded = load_credential_file(&self.config).await?;
        *self.file.write().await = loaded;
        Ok(())
    }

    /// Ids of all known credentials
    pub async fn ids(&self) -> Vec<String> {
        self.file.read().await.credentials.iter().map(|c| c.id.clone()).collect()
    }
}

#[async_trait]
impl CredentialStore for FileCredentialStore {
    async fn lookup(&self, identifier: &str) -> Result<Credential> {
        let file = self.file.read().await;
        let entry = file
            .find(identifier)
            .ok_or_else(|| Error::CredentialNotFound(identifier.to_string()))?;
        entry.resolve()
    }
}

/// Fixed set of credentials held in memory
#[derive(Debug, Clone, Default)]
pub struct StaticCredentialStore {
    credentials: Vec<Credential>,
}

impl StaticCredentialStore {
    pub fn new(credentials: Vec<Credential>) -> Self {
        Self { credentials }
    }

    pub fn with(mut self, credential: Credential) -> Self {
        self.credentials.push(credential);
        self
    }
}

#[async_trait]
impl CredentialStore for StaticCredentialStore {
    async fn lookup(&self, identifier: &str) -> Result<Credential> {
        self.credentials
            .iter()
            .find(|c| c.id == identifier)
            .cloned()
            .ok_or_else(|| Error::CredentialNotFound(identifier.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn static_store_finds_by_id() {
        let store = StaticCredentialStore::default().with(Credential::new("tfs", "svc", "pat"));
        let cred = store.lookup("tfs").await.unwrap();
        assert_eq!(cred.username, "svc");
        assert!(matches!(
            store.lookup("other").await,
            Err(Error::CredentialNotFound(id)) if id == "other"
        ));
    }

    #[tokio::test]
    async fn unloaded_file_store_is_empty() {
        let store = FileCredentialStore::new(CredentialsConfig::default());
        assert!(store.ids().await.is_empty());
        assert!(matches!(
            store.lookup("tfs").await,
            Err(Error::CredentialNotFound(_))
        ));
    }
}

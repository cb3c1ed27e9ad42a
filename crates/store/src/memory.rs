//! In-memory secret store for tests and local development.
//!
//! Responsibilities:
//! - Hold secret versions in process memory, keyed by (project, name).
//! - Honour the wire contract of [`SecretStore::access_version`]: payloads
//!   are returned as base64 text of the stored bytes.
//!
//! Does NOT handle:
//! - Persistence of any kind; contents are lost when the store is dropped.
//!
//! Invariants:
//! - Version numbers start at 1 and grow monotonically per secret.
//! - The `latest` alias always resolves to the most recently added version.

use std::collections::BTreeMap;
use std::sync::Mutex;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use crate::client::{SecretStore, parse_version_path, secret_version_path};
use crate::error::{Result, StoreError};

/// In-memory [`SecretStore`] implementation.
///
/// Interior mutability through a mutex so the store can be shared by
/// reference between a saver and a loader in the same process.
#[derive(Debug, Default)]
pub struct MemorySecretStore {
    secrets: Mutex<BTreeMap<(String, String), Vec<Vec<u8>>>>,
}

impl MemorySecretStore {
    /// Creates an empty store.
    pub fn new() -> Self {
        Self::default()
    }
}

impl SecretStore for MemorySecretStore {
    fn access_version(&self, path: &str) -> Result<Vec<u8>> {
        let (project, name, version) = parse_version_path(path)
            .ok_or_else(|| StoreError::InvalidResponse(format!("malformed version path: {path}")))?;

        let secrets = self.secrets.lock().expect("secret store mutex poisoned");
        let versions = secrets
            .get(&(project.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::not_found(path))?;

        let payload = if version == "latest" {
            versions.last()
        } else {
            let index: usize = version
                .parse()
                .map_err(|_| StoreError::not_found(path))?;
            index.checked_sub(1).and_then(|i| versions.get(i))
        };

        let payload = payload.ok_or_else(|| StoreError::not_found(path))?;
        Ok(STANDARD.encode(payload).into_bytes())
    }

    fn create_secret(&self, project: &str, name: &str) -> Result<()> {
        let mut secrets = self.secrets.lock().expect("secret store mutex poisoned");
        let key = (project.to_string(), name.to_string());
        if secrets.contains_key(&key) {
            return Err(StoreError::already_exists(name));
        }
        secrets.insert(key, Vec::new());
        Ok(())
    }

    fn add_version(&self, project: &str, name: &str, payload: &[u8]) -> Result<String> {
        let mut secrets = self.secrets.lock().expect("secret store mutex poisoned");
        let versions = secrets
            .get_mut(&(project.to_string(), name.to_string()))
            .ok_or_else(|| StoreError::not_found(name))?;
        versions.push(payload.to_vec());
        Ok(secret_version_path(
            project,
            name,
            &versions.len().to_string(),
        ))
    }
}

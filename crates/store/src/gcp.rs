//! Google Secret Manager backend.
//!
//! Responsibilities:
//! - Implement [`SecretStore`] against the Secret Manager v1 REST API.
//! - Map HTTP status codes onto [`StoreError`] variants.
//!
//! Does NOT handle:
//! - Token acquisition or refresh; callers supply a ready bearer token.
//! - Payload base64 decoding (the config loader owns that step).
//!
//! Invariants:
//! - All requests are blocking; no retries, no internal timeouts beyond
//!   the HTTP client defaults.
//! - The bearer token is held in a `SecretString` and never logged.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::json;

use crate::client::SecretStore;
use crate::error::{Result, StoreError};

/// Production endpoint of the Secret Manager v1 API.
const DEFAULT_BASE_URL: &str = "https://secretmanager.googleapis.com/v1";

/// Secret Manager REST client.
pub struct GcpSecretStore {
    http: reqwest::blocking::Client,
    base_url: String,
    token: SecretString,
}

#[derive(Deserialize)]
struct AccessResponse {
    payload: AccessPayload,
}

#[derive(Deserialize)]
struct AccessPayload {
    data: String,
}

#[derive(Deserialize)]
struct VersionResponse {
    name: String,
}

impl GcpSecretStore {
    /// Creates a client against the production endpoint.
    pub fn new(token: SecretString) -> Self {
        Self {
            http: reqwest::blocking::Client::new(),
            base_url: DEFAULT_BASE_URL.to_string(),
            token,
        }
    }

    /// Overrides the API base URL (primarily for testing).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    fn bearer(&self) -> &str {
        self.token.expose_secret()
    }

    /// Converts a non-success response into a [`StoreError`].
    ///
    /// `name` is the secret or version the request was about, used for the
    /// not-found and already-exists variants.
    fn error_for(name: &str, response: reqwest::blocking::Response) -> StoreError {
        let status = response.status().as_u16();
        let url = response.url().to_string();
        match status {
            404 => StoreError::not_found(name),
            409 => StoreError::already_exists(name),
            401 | 403 => StoreError::auth_failed(format!("status {status} from {url}")),
            _ => {
                let message = response
                    .text()
                    .unwrap_or_else(|_| "<unreadable body>".to_string());
                StoreError::Api {
                    status,
                    url,
                    message,
                }
            }
        }
    }
}

impl SecretStore for GcpSecretStore {
    fn access_version(&self, path: &str) -> Result<Vec<u8>> {
        let url = format!("{}/{}:access", self.base_url, path);
        let response = self.http.get(&url).bearer_auth(self.bearer()).send()?;
        if !response.status().is_success() {
            return Err(Self::error_for(path, response));
        }

        let body: AccessResponse = response
            .json()
            .map_err(|e| StoreError::InvalidResponse(format!("access {path}: {e}")))?;
        tracing::debug!(path, "accessed secret version");
        Ok(body.payload.data.into_bytes())
    }

    fn create_secret(&self, project: &str, name: &str) -> Result<()> {
        let url = format!("{}/projects/{}/secrets", self.base_url, project);
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer())
            .query(&[("secretId", name)])
            .json(&json!({ "replication": { "automatic": {} } }))
            .send()?;
        if !response.status().is_success() {
            return Err(Self::error_for(name, response));
        }
        tracing::debug!(project, name, "created secret container");
        Ok(())
    }

    fn add_version(&self, project: &str, name: &str, payload: &[u8]) -> Result<String> {
        let url = format!(
            "{}/projects/{}/secrets/{}:addVersion",
            self.base_url, project, name
        );
        let response = self
            .http
            .post(&url)
            .bearer_auth(self.bearer())
            .json(&json!({ "payload": { "data": STANDARD.encode(payload) } }))
            .send()?;
        if !response.status().is_success() {
            return Err(Self::error_for(name, response));
        }

        let body: VersionResponse = response
            .json()
            .map_err(|e| StoreError::InvalidResponse(format!("add version {name}: {e}")))?;
        tracing::debug!(project, name, version = %body.name, "added secret version");
        Ok(body.name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_store(server: &mockito::ServerGuard) -> GcpSecretStore {
        GcpSecretStore::new(SecretString::new("test-token".to_string().into()))
            .with_base_url(format!("{}/v1", server.url()))
    }

    #[test]
    fn test_access_version_returns_wire_payload() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("GET", "/v1/projects/p/secrets/cfg/versions/1:access")
            .match_header("authorization", "Bearer test-token")
            .with_status(200)
            .with_body(r#"{"name":"projects/p/secrets/cfg/versions/1","payload":{"data":"aGVsbG8="}}"#)
            .create();

        let store = test_store(&server);
        let payload = store
            .access_version("projects/p/secrets/cfg/versions/1")
            .unwrap();
        // The base64 text itself, not the decoded bytes.
        assert_eq!(payload, b"aGVsbG8=");
        mock.assert();
    }

    #[test]
    fn test_access_version_missing_is_not_found() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/projects/p/secrets/nope/versions/1:access")
            .with_status(404)
            .create();

        let store = test_store(&server);
        let err = store
            .access_version("projects/p/secrets/nope/versions/1")
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_create_secret_conflict_is_already_exists() {
        let mut server = mockito::Server::new();
        server
            .mock("POST", "/v1/projects/p/secrets?secretId=cfg")
            .with_status(409)
            .create();

        let store = test_store(&server);
        let err = store.create_secret("p", "cfg").unwrap_err();
        assert!(err.is_already_exists());
    }

    #[test]
    fn test_add_version_returns_handle() {
        let mut server = mockito::Server::new();
        let mock = server
            .mock("POST", "/v1/projects/p/secrets/cfg:addVersion")
            .with_status(200)
            .with_body(r#"{"name":"projects/p/secrets/cfg/versions/7"}"#)
            .create();

        let store = test_store(&server);
        let handle = store.add_version("p", "cfg", b"payload").unwrap();
        assert_eq!(handle, "projects/p/secrets/cfg/versions/7");
        mock.assert();
    }

    #[test]
    fn test_forbidden_is_auth_failed() {
        let mut server = mockito::Server::new();
        server
            .mock("GET", "/v1/projects/p/secrets/cfg/versions/1:access")
            .with_status(403)
            .create();

        let store = test_store(&server);
        let err = store
            .access_version("projects/p/secrets/cfg/versions/1")
            .unwrap_err();
        assert!(matches!(err, StoreError::AuthFailed { .. }));
    }
}

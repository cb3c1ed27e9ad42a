//! Config source resolution.
//!
//! Responsibilities:
//! - Decide whether a source identifier names a local file or a secret
//!   version, based on the `secretmgr:` prefix.
//! - Fetch and base64-decode secret payloads.
//!
//! Does NOT handle:
//! - Token expansion or JSON decoding (see `expand.rs` / `loader.rs`).
//!
//! Invariants:
//! - Secret payloads arrive as base64 text, possibly wrapped in one extra
//!   pair of quote characters; the quotes are stripped before decoding.
//! - Fetch failures carry the resolved version path.

use std::path::PathBuf;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;

use cloudconf_store::{SecretStore, secret_version_path};

use crate::constants::SECRET_MGR_PREFIX;
use crate::error::ConfigError;

/// Build a secret-backed source identifier,
/// `secretmgr:projects/<p>/secrets/<n>/versions/<v>`.
pub fn secret_source(project: &str, name: &str, version: &str) -> String {
    format!(
        "{SECRET_MGR_PREFIX}{}",
        secret_version_path(project, name, version)
    )
}

/// Resolve a source identifier to raw config bytes.
pub(crate) fn resolve(
    src: &str,
    store: Option<&dyn SecretStore>,
) -> Result<Vec<u8>, ConfigError> {
    if let Some(path) = src.strip_prefix(SECRET_MGR_PREFIX) {
        let store = store.ok_or(ConfigError::StoreUnavailable)?;
        let payload = store
            .access_version(path)
            .map_err(|source| ConfigError::SecretFetch {
                path: path.to_string(),
                source,
            })?;
        let data = decode_payload(path, &payload)?;
        tracing::debug!(path, bytes = data.len(), "loaded config from secret store");
        Ok(data)
    } else {
        let data = std::fs::read(src).map_err(|source| ConfigError::FileRead {
            path: PathBuf::from(src),
            source,
        })?;
        tracing::debug!(path = src, bytes = data.len(), "loaded config from file");
        Ok(data)
    }
}

/// Strip one wrapping pair of quotes, then base64-decode.
fn decode_payload(path: &str, payload: &[u8]) -> Result<Vec<u8>, ConfigError> {
    let mut data = payload;
    if let Some(rest) = data.strip_prefix(b"\"") {
        data = rest;
    }
    if let Some(rest) = data.strip_suffix(b"\"") {
        data = rest;
    }
    STANDARD
        .decode(data)
        .map_err(|source| ConfigError::PayloadDecode {
            path: path.to_string(),
            source,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_source_format() {
        assert_eq!(
            secret_source("my-proj", "app-config", "latest"),
            "secretmgr:projects/my-proj/secrets/app-config/versions/latest"
        );
    }

    #[test]
    fn test_decode_payload_plain_base64() {
        let decoded = decode_payload("p", b"aGVsbG8=").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_decode_payload_strips_wrapping_quotes() {
        let decoded = decode_payload("p", b"\"aGVsbG8=\"").unwrap();
        assert_eq!(decoded, b"hello");
    }

    #[test]
    fn test_decode_payload_invalid_base64() {
        let err = decode_payload("projects/p/secrets/n/versions/1", b"!!!").unwrap_err();
        match err {
            ConfigError::PayloadDecode { path, .. } => {
                assert_eq!(path, "projects/p/secrets/n/versions/1");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_file_is_file_read_error() {
        let err = resolve("/nonexistent/cloudconf-test.json", None).unwrap_err();
        assert!(matches!(err, ConfigError::FileRead { .. }));
    }

    #[test]
    fn test_secret_source_without_store_is_unavailable() {
        let err = resolve("secretmgr:projects/p/secrets/n/versions/1", None).unwrap_err();
        assert!(matches!(err, ConfigError::StoreUnavailable));
    }
}

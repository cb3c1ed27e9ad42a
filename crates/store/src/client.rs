//! Backend-agnostic secret store interface.
//!
//! Responsibilities:
//! - Define the [`SecretStore`] trait implemented by all backends.
//! - Provide helpers for building and parsing secret version paths.
//!
//! Does NOT handle:
//! - Wire protocols (see `gcp.rs`).
//! - Payload base64 decoding (the config loader owns that step).
//!
//! Invariants:
//! - `access_version` returns the payload exactly as the wire delivers it:
//!   base64 text of the stored bytes, possibly wrapped in one extra pair of
//!   quote characters.
//! - Version paths follow `projects/<p>/secrets/<n>/versions/<v>`.

use crate::error::Result;

/// A versioned key/value store holding configuration payloads.
///
/// All operations are synchronous and blocking; a single failed call is
/// surfaced immediately, with no retries.
pub trait SecretStore {
    /// Fetch the payload of a secret version.
    ///
    /// `path` is a full version path such as
    /// `projects/my-proj/secrets/app-config/versions/latest`. The returned
    /// bytes are the payload as delivered on the wire: base64 text of the
    /// stored data.
    fn access_version(&self, path: &str) -> Result<Vec<u8>>;

    /// Create a secret container.
    ///
    /// Returns [`StoreError::AlreadyExists`](crate::StoreError::AlreadyExists)
    /// if a container with this name already exists; callers that only need
    /// the container to exist treat that as success.
    fn create_secret(&self, project: &str, name: &str) -> Result<()>;

    /// Add `payload` as a new version of an existing secret.
    ///
    /// Returns the opaque path of the newly created version.
    fn add_version(&self, project: &str, name: &str, payload: &[u8]) -> Result<String>;
}

/// Build the full path of a secret version.
pub fn secret_version_path(project: &str, name: &str, version: &str) -> String {
    format!("projects/{project}/secrets/{name}/versions/{version}")
}

/// Split a version path into (project, name, version).
///
/// Returns `None` when the path does not match
/// `projects/<p>/secrets/<n>/versions/<v>`.
pub(crate) fn parse_version_path(path: &str) -> Option<(&str, &str, &str)> {
    let mut parts = path.split('/');
    let (Some("projects"), Some(project), Some("secrets"), Some(name), Some("versions"), Some(version), None) = (
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
        parts.next(),
    ) else {
        return None;
    };
    if project.is_empty() || name.is_empty() || version.is_empty() {
        return None;
    }
    Some((project, name, version))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_secret_version_path_format() {
        assert_eq!(
            secret_version_path("my-proj", "app-config", "latest"),
            "projects/my-proj/secrets/app-config/versions/latest"
        );
    }

    #[test]
    fn test_parse_version_path_round_trip() {
        let path = secret_version_path("p", "n", "3");
        assert_eq!(parse_version_path(&path), Some(("p", "n", "3")));
    }

    #[test]
    fn test_parse_version_path_rejects_malformed() {
        assert!(parse_version_path("projects/p/secrets/n").is_none());
        assert!(parse_version_path("projects/p/secrets/n/versions/1/extra").is_none());
        assert!(parse_version_path("foo/p/secrets/n/versions/1").is_none());
        assert!(parse_version_path("projects//secrets/n/versions/1").is_none());
    }
}

//! The configuration loader: parse, serialize, dump, save-secret.
//!
//! Responsibilities:
//! - Drive the parse pipeline: resolve source, expand tokens, decode JSON,
//!   unescape string fields, convert into the caller's record type.
//! - Drive the symmetric path: serialize to indented JSON, dump to disk
//!   with owner-only permissions, or push a new secret version.
//!
//! Does NOT handle:
//! - The individual pipeline steps (see `source.rs`, `expand.rs`,
//!   `walk.rs`, `escape.rs`).
//!
//! Invariants:
//! - Every operation is stateless and self-contained; the loader only
//!   carries the injected capabilities (environment, store) and the
//!   expansion mode.
//! - Dumps are atomic (temp file + rename) and mode 0600 on Unix.

use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use serde::Serialize;
use serde::de::DeserializeOwned;

use cloudconf_store::SecretStore;

use crate::error::ConfigError;
use crate::expand::{Environment, ExpandMode, SystemEnvironment, expand};
use crate::source;
use crate::walk::{unescape_record, value_kind};

/// Loads and saves JSON configuration records.
///
/// By default the loader reads the process environment, runs `${shell ...}`
/// tokens through `/bin/sh`, expands leniently, and has no secret store.
/// Builder methods inject replacements.
pub struct ConfigLoader {
    env: Box<dyn Environment>,
    store: Option<Arc<dyn SecretStore>>,
    mode: ExpandMode,
}

impl Default for ConfigLoader {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigLoader {
    /// Create a loader with the system environment and no secret store.
    pub fn new() -> Self {
        Self {
            env: Box::new(SystemEnvironment),
            store: None,
            mode: ExpandMode::Lenient,
        }
    }

    /// Attach a secret store, enabling `secretmgr:` sources and
    /// [`save_secret`](Self::save_secret).
    pub fn with_store(mut self, store: Arc<dyn SecretStore>) -> Self {
        self.store = Some(store);
        self
    }

    /// Replace the ambient environment (primarily for testing).
    pub fn with_environment(mut self, env: impl Environment + 'static) -> Self {
        self.env = Box::new(env);
        self
    }

    /// Set the expansion failure policy.
    pub fn with_mode(mut self, mode: ExpandMode) -> Self {
        self.mode = mode;
        self
    }

    /// Parse a config source into a record.
    ///
    /// `src` is either a filesystem path or a `secretmgr:`-prefixed secret
    /// version path. The raw text is token-expanded, decoded as JSON,
    /// unescaped field by field, and converted into `T`.
    ///
    /// Members the record type does not declare are ignored; the unescape
    /// walk only sees the declared fields, recovered by serializing the
    /// decoded record (hence the `Serialize` bound).
    pub fn parse<T: DeserializeOwned + Serialize>(&self, src: &str) -> Result<T, ConfigError> {
        let raw = source::resolve(src, self.store.as_deref())?;
        let text = String::from_utf8(raw)?;
        let expanded = expand(&text, self.env.as_ref(), self.mode)?;
        let value: serde_json::Value = serde_json::from_str(&expanded)?;
        if !value.is_object() {
            return Err(ConfigError::NotARecord {
                kind: value_kind(&value),
            });
        }
        let decoded: T = serde_json::from_value(value)?;
        let mut shaped = serde_json::to_value(&decoded)?;
        unescape_record(&mut shaped)?;
        Ok(serde_json::from_value(shaped)?)
    }

    /// Serialize a record and write it to `dst`, replacing any existing
    /// file. The file is written with owner-only read/write permissions via
    /// a temp file and rename.
    pub fn dump<T: Serialize>(&self, config: &T, dst: impl AsRef<Path>) -> Result<(), ConfigError> {
        let dst = dst.as_ref();
        let raw = serialize(config)?;

        // Appended to the full name so "config.json" stages through
        // "config.json.tmp" and never collides with a real "config.tmp".
        let mut temp_name = dst.file_name().map(|n| n.to_os_string()).unwrap_or_default();
        temp_name.push(".tmp");
        let temp_path = dst.with_file_name(temp_name);
        write_owner_only(&temp_path, &raw).map_err(|source| ConfigError::FileWrite {
            path: temp_path.clone(),
            source,
        })?;
        std::fs::rename(&temp_path, dst).map_err(|source| ConfigError::FileWrite {
            path: dst.to_path_buf(),
            source,
        })?;

        tracing::debug!(path = %dst.display(), "config dumped");
        Ok(())
    }

    /// Serialize a record and store it as a new version of the named
    /// secret, creating the secret container if needed. An already-existing
    /// container is fine; a new version is simply added to it.
    ///
    /// Returns the opaque path of the new version.
    pub fn save_secret<T: Serialize>(
        &self,
        project: &str,
        name: &str,
        config: &T,
    ) -> Result<String, ConfigError> {
        let store = self.store.as_deref().ok_or(ConfigError::StoreUnavailable)?;
        let data = serialize(config)?;

        match store.create_secret(project, name) {
            Ok(()) => {}
            Err(e) if e.is_already_exists() => {}
            Err(e) => return Err(ConfigError::Store(e)),
        }

        let version = store.add_version(project, name, &data)?;
        tracing::debug!(project, name, version = %version, "config saved to secret store");
        Ok(version)
    }
}

/// Serialize a record to indented JSON (two-space indent), deterministic in
/// field-declaration order.
pub fn serialize<T: Serialize>(config: &T) -> Result<Vec<u8>, ConfigError> {
    Ok(serde_json::to_vec_pretty(config)?)
}

fn write_owner_only(path: &Path, data: &[u8]) -> std::io::Result<()> {
    let mut options = std::fs::OpenOptions::new();
    options.write(true).create(true).truncate(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::OpenOptionsExt;
        options.mode(crate::constants::CONFIG_FILE_MODE);
    }
    let mut file = options.open(path)?;
    file.write_all(data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;

    #[derive(Debug, Serialize, Deserialize, PartialEq)]
    struct Sample {
        name: String,
        role: String,
    }

    #[test]
    fn test_serialize_uses_declaration_order_and_indent() {
        let sample = Sample {
            name: "alpha".to_string(),
            role: "primary".to_string(),
        };
        let raw = String::from_utf8(serialize(&sample).unwrap()).unwrap();
        assert_eq!(raw, "{\n  \"name\": \"alpha\",\n  \"role\": \"primary\"\n}");
    }

    #[test]
    fn test_save_secret_without_store_fails() {
        let loader = ConfigLoader::new();
        let sample = Sample {
            name: "a".to_string(),
            role: "b".to_string(),
        };
        let err = loader.save_secret("p", "n", &sample).unwrap_err();
        assert!(matches!(err, ConfigError::StoreUnavailable));
    }
}

//! Error types for configuration loading and saving.
//!
//! Responsibilities:
//! - Define error variants for every failure in the parse and dump pipelines.
//! - Preserve context for debugging (source paths, field names, token text).
//!
//! Does NOT handle:
//! - Store backend errors themselves (see `cloudconf-store`); they are
//!   wrapped here with the resolved path where one is available.
//!
//! Invariants:
//! - Secret fetch failures always carry the resolved version path.
//! - Lenient-mode expansion failures never surface as errors; they degrade
//!   to inline diagnostic text in the expanded output.

use std::path::PathBuf;
use thiserror::Error;

use cloudconf_store::StoreError;

/// Errors that can occur during configuration loading and saving.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// Failed to read a config file from disk.
    #[error("failed to read config file at {path}")]
    FileRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Failed to fetch a secret-backed config source.
    #[error("failed to fetch secret {path}: {source}")]
    SecretFetch {
        path: String,
        #[source]
        source: StoreError,
    },

    /// The fetched secret payload was not valid base64.
    #[error("failed to decode secret payload for {path}: {source}")]
    PayloadDecode {
        path: String,
        #[source]
        source: base64::DecodeError,
    },

    /// The config source was not valid UTF-8.
    #[error("config source is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),

    /// Malformed JSON, or a shape mismatch against the target record.
    #[error("failed to decode config JSON: {0}")]
    Decode(#[from] serde_json::Error),

    /// The unescape target is not a record.
    #[error("expected a record, got {kind}")]
    NotARecord { kind: &'static str },

    /// The unescape walk hit a field that is neither a string nor a record.
    #[error("unhandled type {kind} for field {field}")]
    UnhandledField {
        field: String,
        kind: &'static str,
    },

    /// A `${shell ...}` token failed in strict expansion mode.
    #[error("shell token '{token}' failed: {message}")]
    ShellCommand { token: String, message: String },

    /// Failed to write a dumped config file.
    #[error("failed to write config file at {path}")]
    FileWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Secret store operation failed (other than already-exists on create).
    #[error("secret store error: {0}")]
    Store(#[from] StoreError),

    /// A secret-store operation was attempted on a loader built without one.
    #[error("no secret store configured; use ConfigLoader::with_store")]
    StoreUnavailable,
}

//! Versioned secret storage for configuration payloads.
//!
//! This crate provides the remote collaborator behind `secretmgr:` config
//! sources. It defines the [`SecretStore`] trait (fetch a version payload,
//! create a secret container, add a version) together with two
//! implementations: a Google Secret Manager REST client over blocking HTTP
//! and an in-memory store for tests and local development.

pub mod client;
pub mod error;
pub mod gcp;
pub mod memory;

pub use client::{SecretStore, secret_version_path};
pub use error::{Result, StoreError};
pub use gcp::GcpSecretStore;
pub use memory::MemorySecretStore;

//! Configuration loading for cloudconf.
//!
//! This crate reads JSON configuration from a local file or a secret-manager
//! source, expands `${...}` environment and shell tokens in the raw text,
//! decodes the result into a caller-supplied record, and JSON-unescapes its
//! string fields. The symmetric path serializes a record back to indented
//! JSON, to disk, or to a new secret version.

pub mod constants;
mod error;
mod escape;
mod expand;
mod loader;
mod source;
pub mod testing;
mod walk;

pub use constants::SECRET_MGR_PREFIX;
pub use error::ConfigError;
pub use escape::{json_escape, json_unescape};
pub use expand::{Environment, ExpandMode, SystemEnvironment, expand};
pub use loader::{ConfigLoader, serialize};
pub use source::secret_source;
pub use walk::unescape_record;

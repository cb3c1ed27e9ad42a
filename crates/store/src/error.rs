//! Error types for secret store operations.

use thiserror::Error;

/// Result type alias for store operations.
pub type Result<T> = std::result::Result<T, StoreError>;

/// Errors that can occur when talking to a secret store backend.
#[derive(Error, Debug)]
pub enum StoreError {
    /// Secret or secret version not found in the backend.
    #[error("secret not found: {name}")]
    NotFound { name: String },

    /// Secret container already exists.
    #[error("secret already exists: {name}")]
    AlreadyExists { name: String },

    /// Authentication with the backend failed.
    #[error("authentication failed: {message}")]
    AuthFailed { message: String },

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// API error response from the backend.
    #[error("API error ({status}) at {url}: {message}")]
    Api {
        status: u16,
        url: String,
        message: String,
    },

    /// The backend returned a response we could not interpret.
    #[error("invalid response format: {0}")]
    InvalidResponse(String),
}

impl StoreError {
    /// Create a not-found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound { name: name.into() }
    }

    /// Create an already-exists error.
    pub fn already_exists(name: impl Into<String>) -> Self {
        Self::AlreadyExists { name: name.into() }
    }

    /// Create an authentication error.
    pub fn auth_failed(message: impl Into<String>) -> Self {
        Self::AuthFailed {
            message: message.into(),
        }
    }

    /// Check whether this error means the secret container already exists.
    ///
    /// Container creation treats this as success (a new version is simply
    /// added to the existing container).
    pub fn is_already_exists(&self) -> bool {
        matches!(self, Self::AlreadyExists { .. })
    }

    /// Check whether this error means the secret or version does not exist.
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound { .. })
    }
}

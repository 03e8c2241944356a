//! Error types for naming operations.

use ipdns_types::PointerId;
use thiserror::Error;

/// Errors that can occur during naming operations.
#[derive(Debug, Error)]
pub enum NamingError {
    /// A key with this name already exists.
    #[error("key already exists: {name}")]
    AlreadyExists { name: String },

    /// The key name is invalid.
    #[error("invalid key name: {name:?}: {reason}")]
    InvalidKeyName { name: String, reason: String },

    /// No key with this name is known.
    #[error("unknown key name: {name}")]
    UnknownName { name: String },

    /// No key with this identity is known.
    #[error("unknown key: {key}")]
    UnknownKey { key: PointerId },

    /// The backend returned output that could not be understood.
    #[error("unexpected backend output: {0}")]
    Protocol(String),

    /// The backend could not be reached or failed to answer.
    #[error("backend failure: {0}")]
    Backend(String),

    /// I/O error while talking to the backend.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

impl NamingError {
    /// Whether retrying the same call can succeed.
    pub fn is_transient(&self) -> bool {
        matches!(self, Self::Backend(_) | Self::Io(_))
    }
}

/// Convenience type alias for naming operations.
pub type Result<T> = std::result::Result<T, NamingError>;

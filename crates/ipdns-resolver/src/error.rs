use ipdns_naming::NamingError;
use ipdns_store::StoreError;
use ipdns_types::TypeError;

/// Errors from walking a domain name.
///
/// "Not found" is not an error; it is a [`Resolution`](crate::Resolution).
#[derive(Debug, thiserror::Error)]
pub enum ResolveError {
    /// A backend call kept failing after the configured retries.
    #[error("{operation} failed after {attempts} attempt(s): {reason}")]
    Backend {
        operation: &'static str,
        attempts: u32,
        reason: String,
    },
}

/// Errors from publishing records or zones.
#[derive(Debug, thiserror::Error)]
pub enum PublishError {
    #[error("naming error: {0}")]
    Naming(#[from] NamingError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid name in zone: {0}")]
    InvalidName(#[from] TypeError),

    #[error("invalid zone file: {0}")]
    ZoneFile(String),
}

/// Errors a walk treats as retryable.
pub(crate) trait Transient: std::fmt::Display {
    fn is_transient(&self) -> bool;
}

impl Transient for StoreError {
    fn is_transient(&self) -> bool {
        StoreError::is_transient(self)
    }
}

impl Transient for NamingError {
    fn is_transient(&self) -> bool {
        NamingError::is_transient(self)
    }
}

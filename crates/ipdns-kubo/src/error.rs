use ipdns_naming::NamingError;
use ipdns_store::StoreError;

/// Errors from driving the `ipfs` binary.
#[derive(Debug, thiserror::Error)]
pub enum KuboError {
    /// The process could not be spawned or its files could not be accessed.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The command ran and exited unsuccessfully.
    #[error("`ipfs {command}` failed ({status}): {stderr}")]
    Command {
        command: String,
        status: String,
        stderr: String,
    },

    /// The command succeeded but printed something unexpected.
    #[error("unexpected output from `ipfs {command}`: {output:?}")]
    UnexpectedOutput { command: String, output: String },
}

impl KuboError {
    /// Standard error text of a failed command, empty otherwise.
    pub fn stderr(&self) -> &str {
        match self {
            Self::Command { stderr, .. } => stderr,
            _ => "",
        }
    }
}

impl From<KuboError> for StoreError {
    fn from(e: KuboError) -> Self {
        match e {
            KuboError::Io(io) => StoreError::Io(io),
            other => StoreError::Backend(other.to_string()),
        }
    }
}

impl From<KuboError> for NamingError {
    fn from(e: KuboError) -> Self {
        match e {
            KuboError::Io(io) => NamingError::Io(io),
            other @ KuboError::UnexpectedOutput { .. } => NamingError::Protocol(other.to_string()),
            other => NamingError::Backend(other.to_string()),
        }
    }
}

/// Result alias for Kubo operations.
pub type Result<T> = std::result::Result<T, KuboError>;

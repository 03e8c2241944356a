use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid {kind}: {value:?}")]
    InvalidId { kind: &'static str, value: String },

    #[error("empty label in domain name {0:?}")]
    EmptyLabel(String),

    #[error("label is not ASCII: {0:?}")]
    NonAsciiLabel(String),

    #[error("label contains a dot: {0:?}")]
    DotInLabel(String),

    #[error("label exceeds {max} bytes: {actual}")]
    LabelTooLong { max: usize, actual: usize },

    #[error("domain name exceeds {max} bytes: {actual}")]
    NameTooLong { max: usize, actual: usize },
}

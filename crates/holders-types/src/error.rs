use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TypeError {
    #[error("invalid identifier: {0:?}")]
    InvalidIdentifier(String),

    #[error("unknown share class: {0:?}")]
    UnknownShareClass(String),

    #[error("a share cannot have both an organization owner and a person owner")]
    BothOwners,

    #[error("a share must have either an organization owner or a person owner")]
    NoOwner,
}

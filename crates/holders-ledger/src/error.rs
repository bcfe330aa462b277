use holders_types::{OrgNr, PersonId, ShareId, TypeError};

/// Errors produced by canonical store operations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("invalid share: {0}")]
    InvalidShare(#[from] TypeError),

    #[error("organization {0} already exists")]
    DuplicateOrganization(OrgNr),

    #[error("organization {0} does not exist")]
    UnknownOrganization(OrgNr),

    #[error("person {0} does not exist")]
    UnknownPerson(PersonId),

    #[error("share {0} does not exist")]
    ShareNotFound(ShareId),

    #[error("share amount must not be negative, got {0}")]
    NegativeAmount(i64),

    #[error("total shares of organization {0} would overflow")]
    AmountOverflow(OrgNr),

    #[error("organization name must not be empty")]
    EmptyName,
}

pub type LedgerResult<T> = Result<T, LedgerError>;

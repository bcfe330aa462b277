use thiserror::Error;

use holders_types::{OrgNr, OwnerRef, ShareId};

#[derive(Debug, Error)]
pub enum ReplicationError {
    #[error("share not found: {0}")]
    ShareNotFound(ShareId),

    #[error("owner not found: {0}")]
    OwnerNotFound(OwnerRef),

    #[error("owned organization not found: {0}")]
    OrganizationNotFound(OrgNr),

    #[error("total shares of organization {0} overflow")]
    AmountOverflow(OrgNr),

    #[error("document {organization} kept changing underneath us ({attempts} attempts)")]
    Conflict { organization: OrgNr, attempts: u32 },

    #[error("replication task failed: {0}")]
    Worker(String),

    #[error("channel error: {0}")]
    Channel(#[from] holders_channel::ChannelError),

    #[error("ledger error: {0}")]
    Ledger(#[from] holders_ledger::LedgerError),

    #[error("store error: {0}")]
    Store(#[from] holders_store::StoreError),
}

pub type ReplicationResult<T> = Result<T, ReplicationError>;

use holders_types::OrgNr;

/// Errors from read store operations.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// No document exists for the given organization.
    #[error("document not found: {0}")]
    NotFound(OrgNr),

    /// An insert targeted an id that already has a document.
    #[error("document already exists: {0}")]
    AlreadyExists(OrgNr),

    /// A conditional write lost a race with another writer.
    #[error("version conflict on {id}: expected {expected}, found {actual}")]
    VersionConflict { id: OrgNr, expected: u64, actual: u64 },

    /// Serialization or deserialization failure.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The stored document does not decode into an organization snapshot.
    #[error("corrupt document {id}: {reason}")]
    CorruptDocument { id: OrgNr, reason: String },

    /// The backing store cannot be reached.
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Result alias for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

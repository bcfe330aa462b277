use holders_types::OrgNr;

use crate::document::{DocumentFilter, OrganizationSnapshot};
use crate::error::StoreResult;

/// Persistence boundary for organization snapshot documents.
///
/// All implementations must satisfy these invariants:
/// - Documents are keyed by `_id`; at most one document per organization.
/// - Every successful write stores the document with `version` set to the
///   previous stored version plus one (or `1` for a new document).
/// - No transactions are offered. Callers that read-modify-write must use
///   [`ReadStore::upsert`] to detect interleaved writers.
/// - All backend errors are propagated, never silently ignored.
///
/// Methods are synchronous and may block on I/O. Async callers run them on
/// a blocking thread rather than a runtime worker.
pub trait ReadStore: Send + Sync {
    /// Read the document for an organization.
    ///
    /// Returns `Ok(None)` if no document exists.
    fn find_one(&self, id: OrgNr) -> StoreResult<Option<OrganizationSnapshot>>;

    /// All documents matching `filter`, ordered by `_id`.
    fn find_many(&self, filter: &DocumentFilter) -> StoreResult<Vec<OrganizationSnapshot>>;

    /// Store a new document. Fails with `AlreadyExists` if one is present.
    fn insert(&self, document: &OrganizationSnapshot) -> StoreResult<u64>;

    /// Replace an existing document wholesale. Fails with `NotFound` if absent.
    fn replace(&self, id: OrgNr, document: &OrganizationSnapshot) -> StoreResult<u64>;

    /// Insert-or-replace conditioned on `document.version`.
    ///
    /// Succeeds only if the stored version equals `document.version`, where
    /// an absent document counts as version `0`. Returns the new version.
    fn upsert(&self, document: &OrganizationSnapshot) -> StoreResult<u64>;

    /// Number of stored documents.
    fn count(&self) -> StoreResult<usize> {
        Ok(self.find_many(&DocumentFilter::All)?.len())
    }
}

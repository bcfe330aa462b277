//! Read-optimized document store for the shareholder ledger.
//!
//! Every owned organization has exactly one [`OrganizationSnapshot`] document,
//! keyed by its organization number (`_id`). The document denormalizes the
//! organization's identity, a handful of ownership aggregates, and two ordered
//! sequences of [`OwnerSnapshot`] entries, one per owner kind.
//!
//! # Storage Backends
//!
//! All backends implement the [`ReadStore`] trait:
//!
//! - [`InMemoryReadStore`] -- JSON-document map for tests and embedding
//!
//! # Design Rules
//!
//! 1. Owner entries are immutable once appended; only aggregates change.
//! 2. Every successful write bumps the document `version`.
//! 3. `upsert` is a compare-and-swap on `version`; `insert` and `replace`
//!    are unconditional apart from presence checks.
//! 4. There is no delete path.

pub mod document;
pub mod error;
pub mod memory;
pub mod traits;

pub use document::{
    Aggregates, DocumentFilter, OrganizationIdentity, OrganizationSnapshot, OrganizationSummary,
    OwnerEntry, OwnerSnapshot, OwnersView, PersonIdentity,
};
pub use error::{StoreError, StoreResult};
pub use memory::InMemoryReadStore;
pub use traits::ReadStore;

//! Canonical store for the shareholder ledger.
//!
//! This crate is the authoritative side of the system. It provides:
//! - `LedgerWriter` / `LedgerReader` trait boundaries
//! - `InMemoryLedger` implementation for tests and embedding
//! - Enforcement of the relational constraints the read model relies on:
//!   exactly one owner per share, existing foreign keys, unique `orgnr`
//!
//! Rows are append-only. Nothing here is ever updated or deleted.

pub mod error;
pub mod memory;
pub mod traits;

pub use error::{LedgerError, LedgerResult};
pub use memory::InMemoryLedger;
pub use traits::{CanonicalStore, LedgerReader, LedgerWriter};

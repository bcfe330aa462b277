//! Foundation types for the shareholder ledger.
//!
//! This crate provides the identifiers and records shared by the canonical
//! store, the replication pipeline, and the read model. Every other holders
//! crate depends on `holders-types`.
//!
//! # Key Types
//!
//! - [`OrgNr`], [`PersonId`], [`ShareId`] -- numeric primary keys
//! - [`OwnerRef`] -- reference to exactly one owner (organization XOR person)
//! - [`Organization`], [`Person`] -- owner rows with their [`Entity`] fields
//! - [`ShareClass`] -- the fixed share class enumeration
//! - [`Share`] -- a committed ownership record
//! - [`NewShare`] -- the write-side shape, validated into an [`OwnerRef`]

pub mod error;
pub mod identity;
pub mod owner;
pub mod share;

pub use error::TypeError;
pub use identity::{OrgNr, OwnerRef, PersonId, ShareId};
pub use owner::{Entity, NewPerson, Organization, Owner, Person};
pub use share::{NewShare, Share, ShareClass};

//! Replication pipeline for the shareholder ledger.
//!
//! Keeps the read model eventually consistent with the canonical store:
//!
//! 1. [`ShareService`] commits a share and emits a [`ShareCreated`] event.
//! 2. [`ChangePublisher`] either runs the [`Replicator`] inline or publishes
//!    the share id to the message channel.
//! 3. [`ReplicationConsumer`] feeds channel deliveries to the replicator.
//! 4. [`Replicator`] recomputes aggregates with [`ProjectionBuilder`],
//!    projects an owner entry, and merges it into the organization document.
//!
//! Merges for one organization are serialized in-process and guarded across
//! processes by the document version.

pub mod config;
pub mod consumer;
pub mod error;
pub mod events;
pub mod projection;
pub mod publisher;
pub mod replicator;
pub mod service;

pub use config::{ReplayPolicy, ReplicationConfig};
pub use consumer::ReplicationConsumer;
pub use error::{ReplicationError, ReplicationResult};
pub use events::ShareCreated;
pub use projection::ProjectionBuilder;
pub use publisher::{ChangePublisher, Dispatch};
pub use replicator::{ReplicationOutcome, Replicator};
pub use service::{ShareCommit, ShareService};

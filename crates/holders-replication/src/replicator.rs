use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex, PoisonError};

use tracing::{debug, info, warn};

use holders_channel::{Message, ShareEvent};
use holders_ledger::LedgerReader;
use holders_store::{Aggregates, OrganizationSnapshot, ReadStore, StoreError};
use holders_types::{OrgNr, OwnerRef, Share, ShareId};

use crate::config::{ReplayPolicy, ReplicationConfig};
use crate::error::{ReplicationError, ReplicationResult};
use crate::projection::ProjectionBuilder;

/// Result of merging one share into its organization's document.
#[derive(Clone, Debug, PartialEq)]
pub struct ReplicationOutcome {
    pub organization: OrgNr,
    pub share_id: ShareId,
    pub owner: OwnerRef,
    /// The document did not exist before this merge.
    pub created: bool,
    /// The entry was already present and was not appended again.
    pub duplicate: bool,
    /// Document version after the write.
    pub version: u64,
    /// Percentage recorded on the new entry.
    pub percentage: f64,
    pub aggregates: Aggregates,
}

/// One mutex per organization number, created on first use.
///
/// Entries are never evicted: the map grows by one per organization ever
/// replicated and lives as long as the [`Replicator`]. The mutexes guard no
/// data, so a panic inside a merge leaves nothing to recover and poisoning
/// is ignored.
#[derive(Default)]
struct KeyedLocks {
    locks: Mutex<HashMap<OrgNr, Arc<Mutex<()>>>>,
}

impl KeyedLocks {
    fn with_lock<T>(&self, key: OrgNr, f: impl FnOnce() -> T) -> T {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(PoisonError::into_inner);
            Arc::clone(locks.entry(key).or_default())
        };
        let _guard = lock.lock().unwrap_or_else(PoisonError::into_inner);
        f()
    }
}

/// Merges committed shares into the read model.
///
/// Each merge re-reads the canonical store, recomputes the owned
/// organization's aggregates, appends one owner entry, and writes the
/// document back with a version check. Merges touching the same
/// organization never interleave within one replicator; across replicators
/// a lost version race is retried from a fresh read.
pub struct Replicator {
    ledger: Arc<dyn LedgerReader>,
    store: Arc<dyn ReadStore>,
    config: ReplicationConfig,
    locks: KeyedLocks,
}

impl Replicator {
    pub fn new(
        ledger: Arc<dyn LedgerReader>,
        store: Arc<dyn ReadStore>,
        config: ReplicationConfig,
    ) -> Self {
        Self {
            ledger,
            store,
            config,
            locks: KeyedLocks::default(),
        }
    }

    pub fn config(&self) -> &ReplicationConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<dyn ReadStore> {
        &self.store
    }

    /// Handle one channel message carrying a share id.
    pub fn handle_message(&self, message: &Message) -> ReplicationResult<ReplicationOutcome> {
        let event = ShareEvent::decode(&message.body)?;
        debug!(share_id = %event.share_id, message = %message.id, "share event decoded");
        self.replicate_id(event.share_id)
    }

    /// Load a share by id and replicate it.
    pub fn replicate_id(&self, share_id: ShareId) -> ReplicationResult<ReplicationOutcome> {
        let share = self
            .ledger
            .share(share_id)?
            .ok_or(ReplicationError::ShareNotFound(share_id))?;
        self.replicate(&share)
    }

    /// Merge `share` into the document of the organization it belongs to.
    pub fn replicate(&self, share: &Share) -> ReplicationResult<ReplicationOutcome> {
        let organization = share.organization_owned;
        self.locks.with_lock(organization, || {
            let mut attempts = 0u32;
            loop {
                attempts += 1;
                match self.merge(share) {
                    Err(ReplicationError::Store(StoreError::VersionConflict {
                        expected,
                        actual,
                        ..
                    })) => {
                        if attempts > self.config.max_conflict_retries {
                            warn!(%organization, attempts, "giving up after repeated version conflicts");
                            return Err(ReplicationError::Conflict {
                                organization,
                                attempts,
                            });
                        }
                        debug!(%organization, expected, actual, attempts, "version conflict, retrying");
                    }
                    other => return other,
                }
            }
        })
    }

    fn merge(&self, share: &Share) -> ReplicationResult<ReplicationOutcome> {
        let orgnr = share.organization_owned;
        let organization = self
            .ledger
            .organization(orgnr)?
            .ok_or(ReplicationError::OrganizationNotFound(orgnr))?;

        let aggregates =
            ProjectionBuilder::aggregates(self.ledger.as_ref(), orgnr, &self.config.home_country)?;
        let entry = ProjectionBuilder::owner_entry(self.ledger.as_ref(), share, &aggregates)?;
        let percentage = entry.percentage();

        let (mut document, created) = match self.store.find_one(orgnr)? {
            Some(document) => (document, false),
            None => (OrganizationSnapshot::new(&organization, aggregates), true),
        };

        let duplicate = self.config.replay_policy == ReplayPolicy::Deduplicate
            && document.contains(share.owner, share.id);

        document.aggregates = aggregates;
        if !duplicate {
            document.append(entry);
        }
        let version = self.store.upsert(&document)?;

        info!(
            organization = %orgnr,
            share_id = %share.id,
            owner = %share.owner,
            created,
            duplicate,
            version,
            percentage,
            "share replicated"
        );

        Ok(ReplicationOutcome {
            organization: orgnr,
            share_id: share.id,
            owner: share.owner,
            created,
            duplicate,
            version,
            percentage,
            aggregates,
        })
    }
}

impl fmt::Debug for Replicator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Replicator")
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

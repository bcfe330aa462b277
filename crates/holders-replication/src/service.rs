use std::fmt;
use std::sync::Arc;

use tracing::{error, info};

use holders_ledger::CanonicalStore;
use holders_types::{NewPerson, NewShare, Organization, Person, Share};

use crate::error::ReplicationResult;
use crate::events::ShareCreated;
use crate::publisher::{ChangePublisher, Dispatch};

/// A committed share and what became of its change event.
#[derive(Clone, Debug, PartialEq)]
pub struct ShareCommit {
    pub share: Share,
    pub dispatch: Dispatch,
}

/// Write path over the canonical store.
///
/// Organizations and persons are plain inserts. Every committed share is
/// announced through the [`ChangePublisher`], which is the only way the read
/// model learns about it.
pub struct ShareService {
    ledger: Arc<dyn CanonicalStore>,
    publisher: ChangePublisher,
}

impl ShareService {
    pub fn new(ledger: Arc<dyn CanonicalStore>, publisher: ChangePublisher) -> Self {
        Self { ledger, publisher }
    }

    pub fn ledger(&self) -> &Arc<dyn CanonicalStore> {
        &self.ledger
    }

    pub fn create_organization(&self, organization: &Organization) -> ReplicationResult<Organization> {
        let created = self.ledger.create_organization(organization)?;
        info!(orgnr = %created.orgnr, "organization created");
        Ok(created)
    }

    pub fn create_person(&self, person: &NewPerson) -> ReplicationResult<Person> {
        let created = self.ledger.create_person(person)?;
        info!(person_id = %created.id, "person created");
        Ok(created)
    }

    /// Commit a share, then publish its creation.
    ///
    /// The share stays committed even when publishing fails; the error is
    /// returned so the caller can report it.
    pub async fn create_share(&self, share: &NewShare) -> ReplicationResult<ShareCommit> {
        let share = self.ledger.create_share(share)?;
        info!(
            share_id = %share.id,
            owner = %share.owner,
            organization_owned = %share.organization_owned,
            "share committed"
        );

        let event = ShareCreated::new(share.clone());
        let dispatch = self.publisher.publish(&event).await.map_err(|e| {
            error!(share_id = %share.id, error = %e, "share committed but not replicated");
            e
        })?;
        Ok(ShareCommit { share, dispatch })
    }
}

impl fmt::Debug for ShareService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShareService")
            .field("publisher", &self.publisher)
            .finish_non_exhaustive()
    }
}

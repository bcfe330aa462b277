use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use holders_types::{
    NewPerson, NewShare, OrgNr, Organization, OwnerRef, Person, PersonId, Share, ShareId,
};
use tracing::debug;

use crate::error::{LedgerError, LedgerResult};
use crate::traits::{LedgerReader, LedgerWriter};

/// In-memory canonical store for tests, local demos, and embedding.
///
/// Rows live behind a single `RwLock`, so every write is applied atomically
/// together with its constraint checks.
pub struct InMemoryLedger {
    inner: RwLock<LedgerState>,
}

#[derive(Default)]
struct LedgerState {
    organizations: BTreeMap<OrgNr, Organization>,
    persons: BTreeMap<PersonId, Person>,
    shares: BTreeMap<ShareId, Share>,
    owned_index: HashMap<OrgNr, Vec<ShareId>>,
    held_index: HashMap<OrgNr, Vec<ShareId>>,
    last_person_id: i64,
    last_share_id: i64,
}

impl LedgerState {
    fn collect(&self, ids: Option<&Vec<ShareId>>) -> Vec<Share> {
        ids.map(|ids| {
            ids.iter()
                .filter_map(|id| self.shares.get(id).cloned())
                .collect()
        })
        .unwrap_or_default()
    }

    fn check_owner(&self, owner: OwnerRef) -> LedgerResult<()> {
        match owner {
            OwnerRef::Organization(orgnr) if !self.organizations.contains_key(&orgnr) => {
                Err(LedgerError::UnknownOrganization(orgnr))
            }
            OwnerRef::Person(id) if !self.persons.contains_key(&id) => {
                Err(LedgerError::UnknownPerson(id))
            }
            _ => Ok(()),
        }
    }
}

impl InMemoryLedger {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(LedgerState::default()),
        }
    }

    pub fn organization_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").organizations.len()
    }

    pub fn person_count(&self) -> usize {
        self.inner.read().expect("lock poisoned").persons.len()
    }

    /// Every committed share, in commit order.
    pub fn all_shares(&self) -> Vec<Share> {
        let state = self.inner.read().expect("lock poisoned");
        state.shares.values().cloned().collect()
    }
}

impl Default for InMemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl LedgerWriter for InMemoryLedger {
    fn create_organization(&self, organization: &Organization) -> LedgerResult<Organization> {
        if organization.entity.name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let mut state = self.inner.write().expect("lock poisoned");
        if state.organizations.contains_key(&organization.orgnr) {
            return Err(LedgerError::DuplicateOrganization(organization.orgnr));
        }
        state
            .organizations
            .insert(organization.orgnr, organization.clone());
        debug!(orgnr = %organization.orgnr, "organization created");
        Ok(organization.clone())
    }

    fn create_person(&self, person: &NewPerson) -> LedgerResult<Person> {
        if person.entity.name.trim().is_empty() {
            return Err(LedgerError::EmptyName);
        }
        let mut state = self.inner.write().expect("lock poisoned");
        state.last_person_id += 1;
        let stored = person.clone().with_id(PersonId::new(state.last_person_id));
        state.persons.insert(stored.id, stored.clone());
        debug!(person_id = %stored.id, "person created");
        Ok(stored)
    }

    fn create_share(&self, share: &NewShare) -> LedgerResult<Share> {
        let owner = share.owner()?;
        if share.amount < 0 {
            return Err(LedgerError::NegativeAmount(share.amount));
        }

        let mut state = self.inner.write().expect("lock poisoned");
        state.check_owner(owner)?;
        if !state.organizations.contains_key(&share.organization_owned) {
            return Err(LedgerError::UnknownOrganization(share.organization_owned));
        }
        state
            .owned_index
            .get(&share.organization_owned)
            .into_iter()
            .flatten()
            .filter_map(|id| state.shares.get(id))
            .try_fold(share.amount, |total, held| total.checked_add(held.amount))
            .ok_or(LedgerError::AmountOverflow(share.organization_owned))?;

        let id = ShareId::new(state.last_share_id + 1);
        let stored = share.with_id(id)?;
        state.last_share_id = id.get();
        state.shares.insert(id, stored.clone());
        state
            .owned_index
            .entry(stored.organization_owned)
            .or_default()
            .push(id);
        if let Some(holder) = owner.as_organization() {
            state.held_index.entry(holder).or_default().push(id);
        }

        debug!(
            share_id = %id,
            owner = %owner,
            owned = %stored.organization_owned,
            "share committed"
        );
        Ok(stored)
    }
}

impl LedgerReader for InMemoryLedger {
    fn organization(&self, orgnr: OrgNr) -> LedgerResult<Option<Organization>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.organizations.get(&orgnr).cloned())
    }

    fn person(&self, id: PersonId) -> LedgerResult<Option<Person>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.persons.get(&id).cloned())
    }

    fn share(&self, id: ShareId) -> LedgerResult<Option<Share>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.shares.get(&id).cloned())
    }

    fn shares_owned(&self, orgnr: OrgNr) -> LedgerResult<Vec<Share>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.collect(state.owned_index.get(&orgnr)))
    }

    fn shares_held_by(&self, orgnr: OrgNr) -> LedgerResult<Vec<Share>> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.collect(state.held_index.get(&orgnr)))
    }

    fn share_count(&self) -> LedgerResult<u64> {
        let state = self.inner.read().expect("lock poisoned");
        Ok(state.shares.len() as u64)
    }
}

impl std::fmt::Debug for InMemoryLedger {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = self.inner.read().expect("lock poisoned");
        f.debug_struct("InMemoryLedger")
            .field("organizations", &state.organizations.len())
            .field("persons", &state.persons.len())
            .field("shares", &state.shares.len())
            .finish()
    }
}

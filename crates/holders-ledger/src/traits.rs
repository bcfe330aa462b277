use holders_types::{
    NewPerson, NewShare, OrgNr, Organization, Owner, OwnerRef, Person, PersonId, Share, ShareId,
};

use crate::error::LedgerResult;

/// Write boundary for the canonical store.
pub trait LedgerWriter: Send + Sync {
    fn create_organization(&self, organization: &Organization) -> LedgerResult<Organization>;

    fn create_person(&self, person: &NewPerson) -> LedgerResult<Person>;

    /// Commit a new ownership record.
    ///
    /// Fails unless exactly one owner is set and every referenced row exists.
    fn create_share(&self, share: &NewShare) -> LedgerResult<Share>;
}

/// Read boundary for the canonical store.
pub trait LedgerReader: Send + Sync {
    fn organization(&self, orgnr: OrgNr) -> LedgerResult<Option<Organization>>;

    fn person(&self, id: PersonId) -> LedgerResult<Option<Person>>;

    fn share(&self, id: ShareId) -> LedgerResult<Option<Share>>;

    /// Shares whose owned organization is `orgnr`, in commit order.
    fn shares_owned(&self, orgnr: OrgNr) -> LedgerResult<Vec<Share>>;

    /// Shares in which `orgnr` is the organization owner, in commit order.
    fn shares_held_by(&self, orgnr: OrgNr) -> LedgerResult<Vec<Share>>;

    fn share_count(&self) -> LedgerResult<u64>;

    /// Load the row behind an owner reference.
    fn owner(&self, owner: OwnerRef) -> LedgerResult<Option<Owner>> {
        Ok(match owner {
            OwnerRef::Organization(orgnr) => self.organization(orgnr)?.map(Owner::Organization),
            OwnerRef::Person(id) => self.person(id)?.map(Owner::Person),
        })
    }
}

/// Both halves of the canonical store behind one trait object.
pub trait CanonicalStore: LedgerReader + LedgerWriter {}

impl<T: LedgerReader + LedgerWriter> CanonicalStore for T {}

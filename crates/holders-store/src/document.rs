use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use holders_types::{
    Entity, OrgNr, Organization, Owner, OwnerRef, Person, PersonId, Share, ShareClass, ShareId,
};

/// Ownership aggregates stored flat on every organization document.
///
/// Recomputed from the canonical store on every replicated share and then
/// overwritten wholesale.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Aggregates {
    pub total_shares: i64,
    pub number_of_owners: u64,
    pub number_of_holdings: u64,
    pub has_foreign_owners: bool,
    pub has_multiple_share_class: bool,
}

impl Aggregates {
    /// Share of the total held by `amount`, in percent.
    ///
    /// An organization whose shares all have amount zero yields `0.0`
    /// rather than NaN.
    pub fn percentage_of(&self, amount: i64) -> f64 {
        if self.total_shares == 0 {
            0.0
        } else {
            100.0 * amount as f64 / self.total_shares as f64
        }
    }
}

/// Identity fields of an organization owner, keyed by `_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationIdentity {
    #[serde(rename = "_id")]
    pub orgnr: OrgNr,
    #[serde(flatten)]
    pub entity: Entity,
}

impl From<&Organization> for OrganizationIdentity {
    fn from(org: &Organization) -> Self {
        Self {
            orgnr: org.orgnr,
            entity: org.entity.clone(),
        }
    }
}

/// Identity fields of a person owner, keyed by `_id`.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PersonIdentity {
    #[serde(rename = "_id")]
    pub id: PersonId,
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl From<&Person> for PersonIdentity {
    fn from(person: &Person) -> Self {
        Self {
            id: person.id,
            entity: person.entity.clone(),
            birth_date: person.birth_date,
        }
    }
}

/// Point-in-time projection of one owner's stake in an organization.
///
/// `percentage` is fixed at the moment the entry is written and is not
/// refreshed when later shares change the total.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnerSnapshot<I> {
    #[serde(flatten)]
    pub owner: I,
    pub share_class: ShareClass,
    pub amount: i64,
    pub percentage: f64,
    /// The ownership record this entry was projected from.
    pub share_id: ShareId,
}

/// An owner snapshot of either kind, before it is filed into a sequence.
#[derive(Clone, Debug, PartialEq)]
pub enum OwnerEntry {
    Organization(OwnerSnapshot<OrganizationIdentity>),
    Person(OwnerSnapshot<PersonIdentity>),
}

impl OwnerEntry {
    /// Project `owner`'s stake in `share` against `aggregates`.
    pub fn project(owner: &Owner, share: &Share, aggregates: &Aggregates) -> Self {
        let percentage = aggregates.percentage_of(share.amount);
        match owner {
            Owner::Organization(org) => Self::Organization(OwnerSnapshot {
                owner: OrganizationIdentity::from(org),
                share_class: share.share_class,
                amount: share.amount,
                percentage,
                share_id: share.id,
            }),
            Owner::Person(person) => Self::Person(OwnerSnapshot {
                owner: PersonIdentity::from(person),
                share_class: share.share_class,
                amount: share.amount,
                percentage,
                share_id: share.id,
            }),
        }
    }

    pub fn reference(&self) -> OwnerRef {
        match self {
            Self::Organization(s) => OwnerRef::Organization(s.owner.orgnr),
            Self::Person(s) => OwnerRef::Person(s.owner.id),
        }
    }

    pub fn share_id(&self) -> ShareId {
        match self {
            Self::Organization(s) => s.share_id,
            Self::Person(s) => s.share_id,
        }
    }

    pub fn percentage(&self) -> f64 {
        match self {
            Self::Organization(s) => s.percentage,
            Self::Person(s) => s.percentage,
        }
    }
}

/// The read-model document for one owned organization.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OrganizationSnapshot {
    #[serde(rename = "_id")]
    pub id: OrgNr,
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(flatten)]
    pub aggregates: Aggregates,
    #[serde(default)]
    pub organizations_owner: Vec<OwnerSnapshot<OrganizationIdentity>>,
    #[serde(default)]
    pub persons_owner: Vec<OwnerSnapshot<PersonIdentity>>,
    /// Optimistic concurrency token. `0` until the document is first stored.
    #[serde(default)]
    pub version: u64,
}

impl OrganizationSnapshot {
    /// A fresh, never-stored document with empty owner sequences.
    pub fn new(organization: &Organization, aggregates: Aggregates) -> Self {
        Self {
            id: organization.orgnr,
            entity: organization.entity.clone(),
            aggregates,
            organizations_owner: Vec::new(),
            persons_owner: Vec::new(),
            version: 0,
        }
    }

    /// File `entry` at the end of the sequence matching its owner kind.
    pub fn append(&mut self, entry: OwnerEntry) {
        match entry {
            OwnerEntry::Organization(s) => self.organizations_owner.push(s),
            OwnerEntry::Person(s) => self.persons_owner.push(s),
        }
    }

    /// Whether an entry with this idempotency key is already present.
    pub fn contains(&self, owner: OwnerRef, share_id: ShareId) -> bool {
        match owner {
            OwnerRef::Organization(orgnr) => self
                .organizations_owner
                .iter()
                .any(|s| s.owner.orgnr == orgnr && s.share_id == share_id),
            OwnerRef::Person(id) => self
                .persons_owner
                .iter()
                .any(|s| s.owner.id == id && s.share_id == share_id),
        }
    }

    /// Whether `orgnr` appears among this document's organization owners.
    pub fn is_held_by(&self, orgnr: OrgNr) -> bool {
        self.organizations_owner
            .iter()
            .any(|s| s.owner.orgnr == orgnr)
    }

    pub fn entry_count(&self) -> usize {
        self.organizations_owner.len() + self.persons_owner.len()
    }

    pub fn owners(&self) -> OwnersView {
        OwnersView {
            organizations_owner: self.organizations_owner.clone(),
            persons_owner: self.persons_owner.clone(),
        }
    }

    pub fn summary(&self) -> OrganizationSummary {
        OrganizationSummary {
            number_of_owners: self.aggregates.number_of_owners,
            number_of_holdings: self.aggregates.number_of_holdings,
            has_foreign_owners: self.aggregates.has_foreign_owners,
            has_multiple_share_class: self.aggregates.has_multiple_share_class,
        }
    }
}

/// Owner sequences of a document, as served by the owners query.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct OwnersView {
    pub organizations_owner: Vec<OwnerSnapshot<OrganizationIdentity>>,
    pub persons_owner: Vec<OwnerSnapshot<PersonIdentity>>,
}

/// Aggregate flags of a document, as served by the summary query.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct OrganizationSummary {
    pub number_of_owners: u64,
    pub number_of_holdings: u64,
    pub has_foreign_owners: bool,
    pub has_multiple_share_class: bool,
}

/// Selection criteria for [`ReadStore::find_many`](crate::ReadStore::find_many).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum DocumentFilter {
    #[default]
    All,
    /// The document whose `_id` is this organization.
    Id(OrgNr),
    /// Documents listing this organization in `organizations_owner`.
    HeldBy(OrgNr),
}

impl DocumentFilter {
    /// Returns `true` if the given document matches this filter.
    pub fn matches(&self, document: &OrganizationSnapshot) -> bool {
        match self {
            Self::All => true,
            Self::Id(id) => document.id == *id,
            Self::HeldBy(orgnr) => document.is_held_by(*orgnr),
        }
    }
}

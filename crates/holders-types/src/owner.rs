use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::identity::{OrgNr, OwnerRef, PersonId};

/// Identity fields shared by every kind of owner.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entity {
    pub name: String,
    #[serde(default)]
    pub postal_code: String,
    #[serde(default)]
    pub country: String,
}

impl Entity {
    pub fn new(
        name: impl Into<String>,
        postal_code: impl Into<String>,
        country: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            postal_code: postal_code.into(),
            country: country.into(),
        }
    }

    /// Whether this entity is registered outside `home_country`.
    ///
    /// Countries are free text, so the comparison ignores ASCII case and
    /// surrounding whitespace.
    pub fn is_foreign(&self, home_country: &str) -> bool {
        !self
            .country
            .trim()
            .eq_ignore_ascii_case(home_country.trim())
    }
}

/// An organization row. `orgnr` is supplied by the caller, not generated.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Organization {
    pub orgnr: OrgNr,
    #[serde(flatten)]
    pub entity: Entity,
}

impl Organization {
    pub fn new(orgnr: impl Into<OrgNr>, entity: Entity) -> Self {
        Self {
            orgnr: orgnr.into(),
            entity,
        }
    }
}

/// A person row as stored by the canonical store.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    pub id: PersonId,
    #[serde(flatten)]
    pub entity: Entity,
    pub birth_date: Option<NaiveDate>,
}

/// A person before the canonical store assigns its key.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewPerson {
    #[serde(flatten)]
    pub entity: Entity,
    #[serde(default)]
    pub birth_date: Option<NaiveDate>,
}

impl NewPerson {
    pub fn new(entity: Entity, birth_date: Option<NaiveDate>) -> Self {
        Self { entity, birth_date }
    }

    pub fn with_id(self, id: PersonId) -> Person {
        Person {
            id,
            entity: self.entity,
            birth_date: self.birth_date,
        }
    }
}

/// A fully loaded owner row of either kind.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Owner {
    Organization(Organization),
    Person(Person),
}

impl Owner {
    pub fn entity(&self) -> &Entity {
        match self {
            Self::Organization(org) => &org.entity,
            Self::Person(person) => &person.entity,
        }
    }

    pub fn reference(&self) -> OwnerRef {
        match self {
            Self::Organization(org) => OwnerRef::Organization(org.orgnr),
            Self::Person(person) => OwnerRef::Person(person.id),
        }
    }
}

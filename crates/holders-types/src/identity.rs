use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

macro_rules! numeric_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(i64);

        impl $name {
            pub const fn new(value: i64) -> Self {
                Self(value)
            }

            pub const fn get(self) -> i64 {
                self.0
            }
        }

        impl From<i64> for $name {
            fn from(value: i64) -> Self {
                Self(value)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl FromStr for $name {
            type Err = TypeError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                s.trim()
                    .parse::<i64>()
                    .map(Self)
                    .map_err(|_| TypeError::InvalidIdentifier(s.to_string()))
            }
        }
    };
}

numeric_id!(
    /// Organization number. Doubles as the organization's primary key and as
    /// the `_id` of its read-model document.
    OrgNr
);

numeric_id!(
    /// Surrogate key assigned to a person by the canonical store.
    PersonId
);

numeric_id!(
    /// Surrogate key assigned to an ownership record by the canonical store.
    ShareId
);

/// Reference to the single owner of a share.
///
/// The enum makes "both" and "neither" unrepresentable once a write has been
/// validated; see [`NewShare::owner`](crate::NewShare::owner).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum OwnerRef {
    Organization(OrgNr),
    Person(PersonId),
}

impl OwnerRef {
    pub fn is_organization(&self) -> bool {
        matches!(self, Self::Organization(_))
    }

    pub fn as_organization(&self) -> Option<OrgNr> {
        match self {
            Self::Organization(orgnr) => Some(*orgnr),
            Self::Person(_) => None,
        }
    }

    pub fn as_person(&self) -> Option<PersonId> {
        match self {
            Self::Person(id) => Some(*id),
            Self::Organization(_) => None,
        }
    }
}

impl fmt::Display for OwnerRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Organization(orgnr) => write!(f, "org:{orgnr}"),
            Self::Person(id) => write!(f, "person:{id}"),
        }
    }
}

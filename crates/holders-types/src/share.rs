use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;
use crate::identity::{OrgNr, OwnerRef, PersonId, ShareId};

/// Share classes accepted by the ledger. Wire names are kept verbatim.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ShareClass {
    #[serde(rename = "A-aksjer")]
    AAksjer,
    #[serde(rename = "B-aksje")]
    BAksje,
}

impl ShareClass {
    pub const ALL: [ShareClass; 2] = [ShareClass::AAksjer, ShareClass::BAksje];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::AAksjer => "A-aksjer",
            Self::BAksje => "B-aksje",
        }
    }
}

impl fmt::Display for ShareClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ShareClass {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|class| class.as_str() == s)
            .ok_or_else(|| TypeError::UnknownShareClass(s.to_string()))
    }
}

/// A committed ownership record.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Share {
    pub id: ShareId,
    pub owner: OwnerRef,
    pub organization_owned: OrgNr,
    pub share_class: ShareClass,
    pub amount: i64,
}

/// Write-side shape of an ownership record.
///
/// Mirrors the relational row: two nullable owner columns guarded by an
/// "exactly one" constraint. [`NewShare::owner`] enforces that constraint.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewShare {
    #[serde(default)]
    pub organization_owner: Option<OrgNr>,
    #[serde(default)]
    pub person_owner: Option<PersonId>,
    pub organization_owned: OrgNr,
    pub share_class: ShareClass,
    #[serde(default)]
    pub amount: i64,
}

impl NewShare {
    pub fn owned_by(
        owner: OwnerRef,
        organization_owned: OrgNr,
        share_class: ShareClass,
        amount: i64,
    ) -> Self {
        Self {
            organization_owner: owner.as_organization(),
            person_owner: owner.as_person(),
            organization_owned,
            share_class,
            amount,
        }
    }

    /// Resolve the single owner of this share.
    pub fn owner(&self) -> Result<OwnerRef, TypeError> {
        match (self.organization_owner, self.person_owner) {
            (Some(orgnr), None) => Ok(OwnerRef::Organization(orgnr)),
            (None, Some(id)) => Ok(OwnerRef::Person(id)),
            (Some(_), Some(_)) => Err(TypeError::BothOwners),
            (None, None) => Err(TypeError::NoOwner),
        }
    }

    pub fn with_id(&self, id: ShareId) -> Result<Share, TypeError> {
        Ok(Share {
            id,
            owner: self.owner()?,
            organization_owned: self.organization_owned,
            share_class: self.share_class,
            amount: self.amount,
        })
    }
}

impl From<&Share> for NewShare {
    fn from(share: &Share) -> Self {
        Self::owned_by(
            share.owner,
            share.organization_owned,
            share.share_class,
            share.amount,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn draft(org: Option<i64>, person: Option<i64>) -> NewShare {
        NewShare {
            organization_owner: org.map(OrgNr::new),
            person_owner: person.map(PersonId::new),
            organization_owned: OrgNr::new(10),
            share_class: ShareClass::AAksjer,
            amount: 10,
        }
    }

    #[test]
    fn share_class_wire_names() {
        assert_eq!(serde_json::to_string(&ShareClass::AAksjer).unwrap(), "\"A-aksjer\"");
        assert_eq!("B-aksje".parse::<ShareClass>().unwrap(), ShareClass::BAksje);
        assert_eq!(
            "othershare".parse::<ShareClass>().unwrap_err(),
            TypeError::UnknownShareClass("othershare".into())
        );
    }

    #[test]
    fn both_owners_rejected() {
        assert_eq!(draft(Some(10), Some(1)).owner(), Err(TypeError::BothOwners));
    }

    #[test]
    fn no_owner_rejected() {
        assert_eq!(draft(None, None).owner(), Err(TypeError::NoOwner));
    }

    #[test]
    fn amount_defaults_to_zero() {
        let share: NewShare = serde_json::from_str(
            r#"{"organization_owner":10,"organization_owned":10,"share_class":"A-aksjer"}"#,
        )
        .unwrap();
        assert_eq!(share.amount, 0);
        assert_eq!(share.owner(), Ok(OwnerRef::Organization(OrgNr::new(10))));
    }

    #[test]
    fn committed_share_round_trips_to_draft() {
        let share = draft(None, Some(3)).with_id(ShareId::new(1)).unwrap();
        assert_eq!(share.owner, OwnerRef::Person(PersonId::new(3)));
        assert_eq!(NewShare::from(&share), draft(None, Some(3)));
    }

    proptest! {
        #[test]
        fn accepted_iff_exactly_one_owner(org in proptest::option::of(any::<i64>()),
                                          person in proptest::option::of(any::<i64>())) {
            let accepted = draft(org, person).owner().is_ok();
            prop_assert_eq!(accepted, org.is_some() != person.is_some());
        }
    }
}

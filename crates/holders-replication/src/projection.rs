use std::collections::BTreeSet;

use holders_ledger::LedgerReader;
use holders_store::{Aggregates, OwnerEntry};
use holders_types::{OrgNr, Share};

use crate::error::{ReplicationError, ReplicationResult};

/// Deterministic projections from the canonical store into read-model parts.
pub struct ProjectionBuilder;

impl ProjectionBuilder {
    /// Recompute the ownership aggregates of `orgnr` by scanning the ledger.
    ///
    /// - `total_shares`: sum of amounts over shares of `orgnr`.
    /// - `number_of_owners`: distinct owners of those shares.
    /// - `number_of_holdings`: distinct organizations `orgnr` holds shares in.
    /// - `has_foreign_owners`: some owner's country differs from `home_country`.
    /// - `has_multiple_share_class`: more than one class among those shares.
    pub fn aggregates<R: LedgerReader + ?Sized>(
        reader: &R,
        orgnr: OrgNr,
        home_country: &str,
    ) -> ReplicationResult<Aggregates> {
        let owned = reader.shares_owned(orgnr)?;

        let mut total_shares = 0i64;
        let mut owners = BTreeSet::new();
        let mut classes = BTreeSet::new();
        for share in &owned {
            total_shares = total_shares
                .checked_add(share.amount)
                .ok_or(ReplicationError::AmountOverflow(orgnr))?;
            owners.insert(share.owner);
            classes.insert(share.share_class);
        }

        let mut has_foreign_owners = false;
        for owner in &owners {
            let row = reader
                .owner(*owner)?
                .ok_or(ReplicationError::OwnerNotFound(*owner))?;
            if row.entity().is_foreign(home_country) {
                has_foreign_owners = true;
                break;
            }
        }

        let holdings: BTreeSet<OrgNr> = reader
            .shares_held_by(orgnr)?
            .iter()
            .map(|share| share.organization_owned)
            .collect();

        Ok(Aggregates {
            total_shares,
            number_of_owners: owners.len() as u64,
            number_of_holdings: holdings.len() as u64,
            has_foreign_owners,
            has_multiple_share_class: classes.len() > 1,
        })
    }

    /// Project the owner of `share` into a document entry, priced against
    /// `aggregates`.
    pub fn owner_entry<R: LedgerReader + ?Sized>(
        reader: &R,
        share: &Share,
        aggregates: &Aggregates,
    ) -> ReplicationResult<OwnerEntry> {
        let owner = reader
            .owner(share.owner)?
            .ok_or(ReplicationError::OwnerNotFound(share.owner))?;
        Ok(OwnerEntry::project(&owner, share, aggregates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use holders_ledger::{InMemoryLedger, LedgerWriter};
    use holders_types::{Entity, NewPerson, NewShare, Organization, OwnerRef, ShareClass};
    use proptest::prelude::*;

    fn org(ledger: &InMemoryLedger, orgnr: i64, country: &str) -> OrgNr {
        ledger
            .create_organization(&Organization::new(
                orgnr,
                Entity::new(format!("Org {orgnr}"), "0150", country),
            ))
            .unwrap()
            .orgnr
    }

    fn person(ledger: &InMemoryLedger, name: &str, country: &str) -> OwnerRef {
        let p = ledger
            .create_person(&NewPerson::new(Entity::new(name, "0150", country), None))
            .unwrap();
        OwnerRef::Person(p.id)
    }

    fn share(ledger: &InMemoryLedger, owner: OwnerRef, owned: OrgNr, class: ShareClass, amount: i64) {
        ledger
            .create_share(&NewShare::owned_by(owner, owned, class, amount))
            .unwrap();
    }

    // -----------------------------------------------------------------------
    // Aggregates
    // -----------------------------------------------------------------------

    #[test]
    fn organization_without_shares() {
        let ledger = InMemoryLedger::new();
        let a = org(&ledger, 1, "Norway");
        let agg = ProjectionBuilder::aggregates(&ledger, a, "Norway").unwrap();
        assert_eq!(agg, Aggregates::default());
    }

    #[test]
    fn counts_distinct_owners_and_classes() {
        let ledger = InMemoryLedger::new();
        let a = org(&ledger, 1, "Norway");
        let kari = person(&ledger, "Kari", "Norway");
        share(&ledger, kari, a, ShareClass::AAksjer, 50);
        share(&ledger, kari, a, ShareClass::BAksje, 25);

        let agg = ProjectionBuilder::aggregates(&ledger, a, "Norway").unwrap();
        assert_eq!(agg.total_shares, 75);
        assert_eq!(agg.number_of_owners, 1);
        assert!(agg.has_multiple_share_class);
        assert!(!agg.has_foreign_owners);
    }

    #[test]
    fn foreign_owner_detection_ignores_case() {
        let ledger = InMemoryLedger::new();
        let a = org(&ledger, 1, "Norway");
        let ola = person(&ledger, "Ola", " norway ");
        share(&ledger, ola, a, ShareClass::AAksjer, 10);
        assert!(!ProjectionBuilder::aggregates(&ledger, a, "Norway")
            .unwrap()
            .has_foreign_owners);

        let sven = person(&ledger, "Sven", "Sweden");
        share(&ledger, sven, a, ShareClass::AAksjer, 10);
        assert!(ProjectionBuilder::aggregates(&ledger, a, "Norway")
            .unwrap()
            .has_foreign_owners);
    }

    #[test]
    fn holdings_count_distinct_targets() {
        let ledger = InMemoryLedger::new();
        let a = org(&ledger, 1, "Norway");
        let b = org(&ledger, 2, "Norway");
        let c = org(&ledger, 3, "Norway");
        let holder = OwnerRef::Organization(a);
        share(&ledger, holder, b, ShareClass::AAksjer, 1);
        share(&ledger, holder, b, ShareClass::AAksjer, 2);
        share(&ledger, holder, c, ShareClass::AAksjer, 3);

        let agg = ProjectionBuilder::aggregates(&ledger, a, "Norway").unwrap();
        assert_eq!(agg.number_of_holdings, 2);
        assert_eq!(agg.total_shares, 0);
    }

    #[test]
    fn owner_entry_is_priced_against_total() {
        let ledger = InMemoryLedger::new();
        let a = org(&ledger, 1, "Norway");
        let kari = person(&ledger, "Kari", "Norway");
        share(&ledger, kari, a, ShareClass::AAksjer, 30);
        share(&ledger, kari, a, ShareClass::AAksjer, 90);

        let last = ledger.shares_owned(a).unwrap().pop().unwrap();
        let agg = ProjectionBuilder::aggregates(&ledger, a, "Norway").unwrap();
        let entry = ProjectionBuilder::owner_entry(&ledger, &last, &agg).unwrap();
        assert_eq!(entry.reference(), kari);
        assert_eq!(entry.share_id(), last.id);
        assert_eq!(entry.percentage(), 75.0);
    }

    proptest! {
        #[test]
        fn aggregates_match_a_direct_count(
            stakes in proptest::collection::vec((0usize..4, 0i64..1_000, any::<bool>()), 0..24)
        ) {
            let ledger = InMemoryLedger::new();
            let target = org(&ledger, 100, "Norway");
            let people: Vec<OwnerRef> = (0..4)
                .map(|i| person(&ledger, &format!("p{i}"), if i == 3 { "Denmark" } else { "Norway" }))
                .collect();

            for (who, amount, class_b) in &stakes {
                let class = if *class_b { ShareClass::BAksje } else { ShareClass::AAksjer };
                share(&ledger, people[*who], target, class, *amount);
            }

            let agg = ProjectionBuilder::aggregates(&ledger, target, "Norway").unwrap();
            let distinct: BTreeSet<usize> = stakes.iter().map(|s| s.0).collect();
            let classes: BTreeSet<bool> = stakes.iter().map(|s| s.2).collect();

            prop_assert_eq!(agg.total_shares, stakes.iter().map(|s| s.1).sum::<i64>());
            prop_assert_eq!(agg.number_of_owners, distinct.len() as u64);
            prop_assert_eq!(agg.has_foreign_owners, distinct.contains(&3));
            prop_assert_eq!(agg.has_multiple_share_class, classes.len() > 1);
            prop_assert_eq!(agg.number_of_holdings, 0);
        }
    }
}

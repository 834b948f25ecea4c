// 👥 Party Mapper - Legacy parties into companies and contacts
//
// A NALD party is either a person or an organisation. Organisations map to
// a company; people map to a contact and a person-typed company. The two
// projections are computed independently: a party may yield a usable
// company, a usable contact, neither, or both, and mapping one never
// depends on the success of the other.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::records::{LegacyParty, PartyType};
use crate::regions::Region;

// ============================================================================
// MAPPED PROJECTIONS
// ============================================================================

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedCompany {
    pub external_id: String,
    pub name: String,
    pub company_type: PartyType,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MappedContact {
    pub external_id: String,
    pub salutation: Option<String>,
    pub initials: Option<String>,
    pub first_name: Option<String>,
    pub last_name: String,
}

/// The pair of projections for one `(region, party_id)`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MappedParty {
    pub company: Option<MappedCompany>,
    pub contact: Option<MappedContact>,
}

/// Project a party into a company.
///
/// Any party with a usable name becomes a company; for people the company
/// carries the person type so downstream billing can tell them apart.
pub fn map_company(party: &LegacyParty) -> Option<MappedCompany> {
    let name = party.name.clone()?;

    Some(MappedCompany {
        external_id: party.external_id(),
        name,
        company_type: party.party_type,
    })
}

/// Project a party into a contact. Organisations have no contact.
pub fn map_contact(party: &LegacyParty) -> Option<MappedContact> {
    if party.party_type != PartyType::Person {
        return None;
    }

    let last_name = party.name.clone()?;

    Some(MappedContact {
        external_id: party.external_id(),
        salutation: party.salutation.clone(),
        initials: party.initials.clone(),
        first_name: party.forename.clone(),
        last_name,
    })
}

// ============================================================================
// PARTY DIRECTORY
// ============================================================================

/// Region → party id → mapped pair.
///
/// Every one of the eight region buckets exists from construction, so a
/// region with no parties in this extract still reads as an empty map
/// rather than a missing key.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PartyDirectory {
    buckets: BTreeMap<Region, BTreeMap<String, MappedParty>>,
}

impl PartyDirectory {
    pub fn new() -> Self {
        let buckets = Region::ALL
            .into_iter()
            .map(|region| (region, BTreeMap::new()))
            .collect();

        PartyDirectory { buckets }
    }

    /// Map every party into the directory.
    ///
    /// Duplicate `(region, party_id)` keys are last-write-wins; the legacy
    /// extract is assumed deduplicated upstream and this is not re-checked.
    pub fn map_parties(parties: &[LegacyParty]) -> PartyDirectory {
        let mut directory = PartyDirectory::new();

        for party in parties {
            directory.insert(party);
        }

        directory
    }

    pub fn insert(&mut self, party: &LegacyParty) {
        let mapped = MappedParty {
            company: map_company(party),
            contact: map_contact(party),
        };

        // Bucket always exists: new() seeds all eight regions
        self.buckets
            .get_mut(&party.region)
            .expect("region bucket seeded at construction")
            .insert(party.party_id.clone(), mapped);
    }

    pub fn get(&self, region: Region, party_id: &str) -> Option<&MappedParty> {
        self.buckets.get(&region).and_then(|b| b.get(party_id))
    }

    pub fn region(&self, region: Region) -> &BTreeMap<String, MappedParty> {
        &self.buckets[&region]
    }

    pub fn regions(&self) -> impl Iterator<Item = Region> + '_ {
        self.buckets.keys().copied()
    }

    /// All mapped companies across every region, in key order.
    pub fn companies(&self) -> Vec<&MappedCompany> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values())
            .filter_map(|party| party.company.as_ref())
            .collect()
    }

    /// All mapped contacts across every region, in key order.
    pub fn contacts(&self) -> Vec<&MappedContact> {
        self.buckets
            .values()
            .flat_map(|bucket| bucket.values())
            .filter_map(|party| party.contact.as_ref())
            .collect()
    }

    pub fn len(&self) -> usize {
        self.buckets.values().map(|bucket| bucket.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for PartyDirectory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn person(region: Region, id: &str, name: Option<&str>) -> LegacyParty {
        LegacyParty {
            region,
            party_id: id.to_string(),
            party_type: PartyType::Person,
            salutation: Some("Mr".to_string()),
            initials: Some("J".to_string()),
            forename: Some("John".to_string()),
            name: name.map(str::to_string),
        }
    }

    fn organisation(region: Region, id: &str, name: &str) -> LegacyParty {
        LegacyParty {
            region,
            party_id: id.to_string(),
            party_type: PartyType::Organisation,
            salutation: None,
            initials: None,
            forename: None,
            name: Some(name.to_string()),
        }
    }

    #[test]
    fn test_all_region_buckets_always_exist() {
        let directory = PartyDirectory::map_parties(&[]);

        let regions: Vec<Region> = directory.regions().collect();
        assert_eq!(regions, Region::ALL.to_vec());

        for region in Region::ALL {
            assert!(directory.region(region).is_empty());
        }
    }

    #[test]
    fn test_every_party_lands_under_its_key() {
        let parties = vec![
            person(Region::Anglian, "1001", Some("Smith")),
            organisation(Region::Thames, "2002", "Big Farm Co"),
        ];

        let directory = PartyDirectory::map_parties(&parties);

        assert_eq!(directory.len(), 2);
        assert!(directory.get(Region::Anglian, "1001").is_some());
        assert!(directory.get(Region::Thames, "2002").is_some());
        assert!(directory.get(Region::Thames, "1001").is_none());
    }

    #[test]
    fn test_person_maps_to_company_and_contact() {
        let mapped = directory_entry(person(Region::Anglian, "1001", Some("Smith")));

        let company = mapped.company.unwrap();
        assert_eq!(company.external_id, "1:1001");
        assert_eq!(company.name, "Smith");
        assert_eq!(company.company_type, PartyType::Person);

        let contact = mapped.contact.unwrap();
        assert_eq!(contact.external_id, "1:1001");
        assert_eq!(contact.last_name, "Smith");
        assert_eq!(contact.first_name, Some("John".to_string()));
    }

    #[test]
    fn test_organisation_maps_to_company_only() {
        let mapped = directory_entry(organisation(Region::Southern, "3003", "Big Farm Co"));

        assert!(mapped.company.is_some());
        assert!(mapped.contact.is_none());
    }

    #[test]
    fn test_nameless_party_still_occupies_its_key() {
        // Neither projection is usable, but the key must still be present
        let mapped = directory_entry(person(Region::Anglian, "1001", None));

        assert!(mapped.company.is_none());
        assert!(mapped.contact.is_none());
    }

    #[test]
    fn test_duplicate_key_is_last_write_wins() {
        let parties = vec![
            organisation(Region::Thames, "2002", "Old Name Ltd"),
            organisation(Region::Thames, "2002", "New Name Ltd"),
        ];

        let directory = PartyDirectory::map_parties(&parties);

        assert_eq!(directory.len(), 1);
        let company = directory
            .get(Region::Thames, "2002")
            .and_then(|p| p.company.as_ref())
            .unwrap();
        assert_eq!(company.name, "New Name Ltd");
    }

    fn directory_entry(party: LegacyParty) -> MappedParty {
        let directory = PartyDirectory::map_parties(std::slice::from_ref(&party));
        directory
            .get(party.region, &party.party_id)
            .cloned()
            .unwrap()
    }
}

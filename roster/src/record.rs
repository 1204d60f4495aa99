use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::communities::Community;

/// Registration attempted for an address that already appears somewhere in
/// the record.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("Address already registered for clawback")]
pub struct AlreadyRegistered;

/// The aggregate clawback record, keyed by community. Stored as one JSON
/// object under one key so the global-uniqueness check and the insert
/// always see the same snapshot.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RegistrationRecord(BTreeMap<Community, Vec<String>>);

impl RegistrationRecord {
    /// An absent store key reads back as the empty record.
    pub fn from_json(raw: &str) -> serde_json::Result<Self> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }

        serde_json::from_str(raw)
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn is_registered(&self, address: &str) -> bool {
        self.0.values().flatten().any(|existing| existing == address)
    }

    /// An address registers at most once across all communities. Callers
    /// pass normalized (lowercase) addresses.
    pub fn register(
        &mut self,
        community: Community,
        address: &str,
    ) -> Result<(), AlreadyRegistered> {
        if self.is_registered(address) {
            return Err(AlreadyRegistered);
        }

        self.0.entry(community).or_default().push(address.to_string());
        Ok(())
    }

    pub fn addresses(&self, community: Community) -> &[String] {
        self.0.get(&community).map(Vec::as_slice).unwrap_or(&[])
    }
}

#[cfg(test)]
mod tests {
    use super::{AlreadyRegistered, RegistrationRecord};
    use crate::communities::Community;

    const ADDRESS: &str = "0x1111111111111111111111111111111111111111";

    #[test]
    fn test_register_once() {
        let mut record = RegistrationRecord::default();

        assert_eq!(record.register(Community::Mog, ADDRESS), Ok(()));
        assert_eq!(record.addresses(Community::Mog), [ADDRESS]);
    }

    #[test]
    fn test_second_registration_is_rejected_globally() {
        let mut record = RegistrationRecord::default();
        record.register(Community::Aeon, ADDRESS).unwrap();

        // Same address under a different community must not merge in.
        assert_eq!(
            record.register(Community::Sproto, ADDRESS),
            Err(AlreadyRegistered)
        );
        assert_eq!(record.addresses(Community::Aeon), [ADDRESS]);
        assert!(record.addresses(Community::Sproto).is_empty());
    }

    #[test]
    fn test_distinct_addresses_share_a_community() {
        let mut record = RegistrationRecord::default();
        let other = "0x2222222222222222222222222222222222222222";

        record.register(Community::Mog, ADDRESS).unwrap();
        record.register(Community::Mog, other).unwrap();

        assert_eq!(record.addresses(Community::Mog), [ADDRESS, other]);
    }

    #[test]
    fn test_unregistered_community_reads_empty() {
        let record = RegistrationRecord::default();

        assert!(record.addresses(Community::Hpos).is_empty());
        assert!(!record.is_registered(ADDRESS));
    }

    #[test]
    fn test_absent_key_is_the_empty_record() {
        assert_eq!(
            RegistrationRecord::from_json("").unwrap(),
            RegistrationRecord::default()
        );
        assert_eq!(
            RegistrationRecord::from_json("  ").unwrap(),
            RegistrationRecord::default()
        );
    }

    #[test]
    fn test_stored_shape() {
        let mut record = RegistrationRecord::default();
        record.register(Community::Mog, ADDRESS).unwrap();

        assert_eq!(
            record.to_json().unwrap(),
            format!(r#"{{"mog":["{ADDRESS}"]}}"#)
        );
    }

    #[test]
    fn test_json_round_trip() {
        let raw = format!(r#"{{"aeon":["{ADDRESS}"],"spx":[]}}"#);
        let record = RegistrationRecord::from_json(&raw).unwrap();

        assert!(record.is_registered(ADDRESS));
        assert_eq!(record.addresses(Community::Aeon), [ADDRESS]);
        assert!(record.addresses(Community::Spx).is_empty());
    }
}

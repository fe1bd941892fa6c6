//! Identity and credential validation
//!
//! Pure predicates over content-addressed records, public key encodings and
//! uuids. They answer `bool`; callers decide which named condition to raise.

use crate::crypto;
use crate::types::{Good, HashIdentified};
use std::collections::BTreeMap;

/// Shortest accepted uuid
pub const UUID_MIN_LEN: usize = 16;
/// Longest accepted uuid
pub const UUID_MAX_LEN: usize = 64;

/// Whether the stored hash id equals the hash of the record's other fields
pub fn is_valid_hash_id_object<T: HashIdentified>(record: &T) -> bool {
    match record.compute_hash_id() {
        Ok(computed) => computed == record.hash_id(),
        Err(e) => {
            tracing::debug!(error = %e, "record has no canonical form");
            false
        }
    }
}

/// Whether every entry is keyed by its own hash id and that hash id is valid
///
/// Fails closed: one mismatch invalidates the whole collection.
pub fn is_valid_hash_id_object_collection<T: HashIdentified>(
    collection: &BTreeMap<String, T>,
) -> bool {
    first_invalid_hash_id(collection).is_none()
}

/// Key of the first entry that fails hash-identity validation
pub fn first_invalid_hash_id<T: HashIdentified>(collection: &BTreeMap<String, T>) -> Option<&str> {
    collection
        .iter()
        .find(|(key, record)| record.hash_id() != key.as_str() || !is_valid_hash_id_object(*record))
        .map(|(key, _)| key.as_str())
}

/// Whether a hex string decodes as a DER SubjectPublicKeyInfo key
pub fn is_valid_public_key(hex_key: &str) -> bool {
    crypto::import_public_key(hex_key).is_ok()
}

/// Whether every record in a collection carries a decodable public key
pub fn is_valid_public_key_collection<T: HashIdentified>(
    collection: &BTreeMap<String, T>,
) -> bool {
    first_invalid_public_key(collection).is_none()
}

/// Key of the first entry whose public key does not decode
pub fn first_invalid_public_key<T: HashIdentified>(
    collection: &BTreeMap<String, T>,
) -> Option<&str> {
    collection
        .iter()
        .find(|(_, record)| !is_valid_public_key(record.public_key()))
        .map(|(key, _)| key.as_str())
}

/// Whether a string is 16 to 64 ASCII alphanumerics
pub fn is_valid_uuid(candidate: &str) -> bool {
    (UUID_MIN_LEN..=UUID_MAX_LEN).contains(&candidate.len())
        && candidate.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Key of the first good that is mis-keyed or has an invalid uuid
pub fn first_invalid_good(goods: &BTreeMap<String, Good>) -> Option<&str> {
    goods
        .iter()
        .find(|(key, good)| good.uuid != key.as_str() || !is_valid_uuid(&good.uuid))
        .map(|(key, _)| key.as_str())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{Address, Courier};

    #[test]
    fn test_uuid_rules() {
        assert!(is_valid_uuid("abcdefABCDEF0123"));
        assert!(is_valid_uuid(&"a".repeat(64)));
        assert!(!is_valid_uuid("short"));
        assert!(!is_valid_uuid(&"a".repeat(65)));
        assert!(!is_valid_uuid("abcdefgh-ijklmnop"));
        assert!(!is_valid_uuid("abcdefghijklmnopé"));
    }

    #[test]
    fn test_hash_id_object() {
        let mut address = Address::new("1 Main", "", "Ada", "00").unwrap();
        assert!(is_valid_hash_id_object(&address));
        address.recipient = "Eve".into();
        assert!(!is_valid_hash_id_object(&address));
    }

    #[test]
    fn test_collection_requires_matching_key() {
        let courier = Courier::new("Bo", "Fast", "555", "00").unwrap();
        let mut collection = BTreeMap::new();
        collection.insert(courier.hash_id.clone(), courier.clone());
        assert!(is_valid_hash_id_object_collection(&collection));

        collection.insert("wrong-key".into(), courier);
        assert!(!is_valid_hash_id_object_collection(&collection));
        assert_eq!(first_invalid_hash_id(&collection), Some("wrong-key"));
    }

    #[test]
    fn test_public_key_rejects_garbage() {
        assert!(!is_valid_public_key(""));
        assert!(!is_valid_public_key("not hex"));
        assert!(!is_valid_public_key("3056301006072a8648ce3d020106052b8104000a"));
    }

    #[test]
    fn test_goods_keyed_by_uuid() {
        let good = Good {
            uuid: "GOOD000000000001".into(),
            name: "Box".into(),
            barcode: "123".into(),
        };
        let mut goods = BTreeMap::new();
        goods.insert(good.uuid.clone(), good.clone());
        assert_eq!(first_invalid_good(&goods), None);

        goods.insert("GOOD000000000002".into(), good);
        assert_eq!(first_invalid_good(&goods), Some("GOOD000000000002"));
    }
}

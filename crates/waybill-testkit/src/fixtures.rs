//! Party and goods fixtures
//!
//! A [`PartyFixture`] pairs a content-addressed record with the key that
//! signs for it, so tests can produce route signatures and commits without
//! threading keys around separately.

use crate::keys::KeyFixture;
use rand::distributions::Alphanumeric;
use rand::Rng;
use serde::Serialize;
use waybill_core::hash::hash_hex;
use waybill_core::{Address, Commit, CommitDetail, Courier, Good, HashIdentified, Quantities};

/// Length of uuids produced by [`random_uuid`] and [`test_good`]
pub const TEST_UUID_LEN: usize = 32;

/// A party record together with its signing key
#[derive(Debug, Clone)]
pub struct PartyFixture<T> {
    /// The content-addressed record
    pub record: T,
    /// Key matching the record's public key
    pub keys: KeyFixture,
}

impl PartyFixture<Address> {
    /// Address with a seeded key
    pub fn address(seed: u64, label: &str) -> Self {
        let keys = KeyFixture::from_seed(seed);
        let record = Address::new(
            format!("{seed} {label} Road"),
            format!("Dock {seed}"),
            format!("{label} receiving"),
            keys.public_key(),
        )
        .expect("address fixture");
        Self { record, keys }
    }
}

impl PartyFixture<Courier> {
    /// Courier with a seeded key
    pub fn courier(seed: u64, name: &str) -> Self {
        let keys = KeyFixture::from_seed(seed);
        let record = Courier::new(name, "Waybill Freight", format!("555-{seed:04}"), keys.public_key())
            .expect("courier fixture");
        Self { record, keys }
    }
}

impl<T: HashIdentified> PartyFixture<T> {
    /// Content address of the record
    pub fn hash_id(&self) -> &str {
        self.record.hash_id()
    }

    /// Sign any payload with the party's key
    pub fn sign<P: Serialize + ?Sized>(&self, payload: &P) -> String {
        self.keys.sign(payload)
    }

    /// Build a commit signed by this party
    pub fn commit(&self, delta: Quantities, info: &str, timestamp: u64) -> Commit {
        let detail = CommitDetail {
            delta,
            info: info.to_string(),
            timestamp,
        };
        Commit {
            signature: self.sign(&detail),
            detail,
        }
    }
}

/// Random alphanumeric uuid of [`TEST_UUID_LEN`] characters
pub fn random_uuid(rng: &mut impl Rng) -> String {
    rng.sample_iter(&Alphanumeric)
        .take(TEST_UUID_LEN)
        .map(char::from)
        .collect()
}

/// Deterministic good derived from a label
pub fn test_good(label: &str) -> Good {
    let digest = hash_hex(label.as_bytes());
    Good {
        uuid: digest[..TEST_UUID_LEN].to_string(),
        name: label.to_string(),
        barcode: digest[TEST_UUID_LEN..TEST_UUID_LEN + 12].to_string(),
    }
}

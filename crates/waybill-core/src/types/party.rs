//! Content-addressed party records
//!
//! An [`Address`] or [`Courier`] is identified by the SHA-256 digest of its
//! own canonical form minus the `hashId` field. Changing any field yields a
//! different record; there is no update in place.

use crate::canonical;
use crate::errors::Result;
use crate::hash;
use serde::{Deserialize, Serialize};

/// Name of the field excluded from a record's content address
pub const HASH_ID_FIELD: &str = "hashId";

/// A record whose key is the hash of its own content
pub trait HashIdentified: Serialize {
    /// The stored content address
    fn hash_id(&self) -> &str;

    /// Hex-encoded DER public key of the party
    fn public_key(&self) -> &str;

    /// Recompute the content address from the record's fields
    fn compute_hash_id(&self) -> Result<String> {
        let bytes = canonical::to_canonical_bytes_without(self, HASH_ID_FIELD)?;
        Ok(hash::hash_hex(&bytes))
    }
}

/// A delivery location and the party that signs for it
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Address {
    /// Content address
    pub hash_id: String,
    /// First address line
    pub line1: String,
    /// Second address line
    pub line2: String,
    /// Person or organisation receiving goods
    pub recipient: String,
    /// Hex-encoded DER SubjectPublicKeyInfo
    pub public_key: String,
}

impl Address {
    /// Build an address and fill in its content address
    pub fn new(
        line1: impl Into<String>,
        line2: impl Into<String>,
        recipient: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self> {
        let mut address = Self {
            hash_id: String::new(),
            line1: line1.into(),
            line2: line2.into(),
            recipient: recipient.into(),
            public_key: public_key.into(),
        };
        address.hash_id = address.compute_hash_id()?;
        Ok(address)
    }
}

impl HashIdentified for Address {
    fn hash_id(&self) -> &str {
        &self.hash_id
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }
}

/// A carrier moving goods between stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Courier {
    /// Content address
    pub hash_id: String,
    /// Courier name
    pub name: String,
    /// Company the courier works for
    pub company: String,
    /// Contact telephone number
    pub telephone: String,
    /// Hex-encoded DER SubjectPublicKeyInfo
    pub public_key: String,
}

impl Courier {
    /// Build a courier and fill in its content address
    pub fn new(
        name: impl Into<String>,
        company: impl Into<String>,
        telephone: impl Into<String>,
        public_key: impl Into<String>,
    ) -> Result<Self> {
        let mut courier = Self {
            hash_id: String::new(),
            name: name.into(),
            company: company.into(),
            telephone: telephone.into(),
            public_key: public_key.into(),
        };
        courier.hash_id = courier.compute_hash_id()?;
        Ok(courier)
    }
}

impl HashIdentified for Courier {
    fn hash_id(&self) -> &str {
        &self.hash_id
    }

    fn public_key(&self) -> &str {
        &self.public_key
    }
}

/// The party referenced by a hash id inside a route
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity<'a> {
    /// A stop's address
    Address(&'a Address),
    /// A transport's courier
    Courier(&'a Courier),
}

impl<'a> Entity<'a> {
    /// Content address of the entity
    pub fn hash_id(&self) -> &'a str {
        match self {
            Entity::Address(address) => &address.hash_id,
            Entity::Courier(courier) => &courier.hash_id,
        }
    }

    /// Public key the entity signs with
    pub fn public_key(&self) -> &'a str {
        match self {
            Entity::Address(address) => &address.public_key,
            Entity::Courier(courier) => &courier.public_key,
        }
    }
}

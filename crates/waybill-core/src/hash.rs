//! SHA-256 content addressing
//!
//! Hashing is pure and synchronous. This module is the single place that names
//! the digest algorithm, so every content address and every signature digest
//! in the system agrees on it.
//!
//! Current algorithm: **SHA-256** (256-bit / 32-byte output)

use crate::canonical;
use crate::errors::Result;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Hash arbitrary bytes to a 32-byte SHA-256 digest
#[inline]
pub fn hash(data: &[u8]) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hasher.finalize().into()
}

/// Hash arbitrary bytes and return the lowercase hex digest
#[inline]
pub fn hash_hex(data: &[u8]) -> String {
    hex::encode(hash(data))
}

/// Canonically serialize a value and return its hex SHA-256 digest
///
/// This is the content address of a record: two logically equal values
/// always produce the same digest regardless of field or map ordering.
pub fn object_to_sha256_hex<T: Serialize + ?Sized>(value: &T) -> Result<String> {
    let bytes = canonical::to_canonical_bytes(value)?;
    Ok(hash_hex(&bytes))
}

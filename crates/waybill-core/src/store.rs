//! Key-value store interface consumed by the ledger
//!
//! The host ledger owns persistence and transaction serialization. Operations
//! read a consistent snapshot, validate, then write whole records back.

use std::collections::BTreeMap;
use std::ops::Bound;

/// Error reported by a store backend
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{operation} failed for {key}: {reason}")]
pub struct StorageError {
    /// Operation that failed (`get`, `put`, `delete`, `range_scan`)
    pub operation: &'static str,
    /// Key or range involved
    pub key: String,
    /// Backend-specific reason
    pub reason: String,
}

impl StorageError {
    /// Create a storage error
    pub fn new(operation: &'static str, key: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            operation,
            key: key.into(),
            reason: reason.into(),
        }
    }
}

impl From<StorageError> for crate::errors::WaybillError {
    fn from(err: StorageError) -> Self {
        Self::storage(err.to_string())
    }
}

/// Lazy, finite, ordered scan over a key range
pub type RangeScan<'a> = Box<dyn Iterator<Item = Result<(String, Vec<u8>), StorageError>> + 'a>;

/// Ledger key-value substrate
pub trait KeyValueStore {
    /// Read a value; `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError>;

    /// Write a value, replacing any previous one
    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError>;

    /// Remove a key; removing an absent key is not an error
    fn delete(&mut self, key: &str) -> Result<(), StorageError>;

    /// Scan keys in `[start, end)` in key order
    fn range_scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>, StorageError>;
}

/// Ordered in-memory store
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: BTreeMap<String, Vec<u8>>,
}

impl MemoryStore {
    /// Create an empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored keys
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Whether the store holds no keys
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Whether a key is present
    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    /// All stored keys in order
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.data.keys().map(String::as_str)
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        Ok(self.data.get(key).cloned())
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.data.insert(key.to_string(), value);
        Ok(())
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        self.data.remove(key);
        Ok(())
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>, StorageError> {
        if start > end {
            return Err(StorageError::new(
                "range_scan",
                format!("{start}..{end}"),
                "start key is after end key",
            ));
        }
        let range = self.data.range::<str, _>((
            Bound::Included(start),
            Bound::Excluded(end),
        ));
        Ok(Box::new(
            range.map(|(key, value)| Ok((key.clone(), value.clone()))),
        ))
    }
}

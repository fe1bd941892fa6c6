//! The ledger handle, its storage helpers and the identity/goods registry
//!
//! Every operation reloads what it needs from the store, validates fully,
//! then writes whole records back. Nothing is cached between calls, and a
//! rejected operation leaves the store untouched.

use crate::config::LedgerConfig;
use crate::keys::{LedgerRecord, RecordKind};
use serde::de::DeserializeOwned;
use serde::Serialize;
use waybill_core::identity::{is_valid_hash_id_object, is_valid_public_key, is_valid_uuid};
use waybill_core::{
    Address, Clock, Courier, Good, HashIdentified, IdentityViolation, KeyValueStore, Result,
    Route, RouteProposal, SystemClock, WaybillError,
};

/// Delivery-route ledger over a key-value store and a clock
#[derive(Debug)]
pub struct DeliveryLedger<S, C = SystemClock> {
    pub(crate) store: S,
    pub(crate) clock: C,
    pub(crate) config: LedgerConfig,
}

impl<S: KeyValueStore> DeliveryLedger<S, SystemClock> {
    /// Ledger on the host wall clock with default configuration
    pub fn new(store: S) -> Self {
        Self {
            store,
            clock: SystemClock,
            config: LedgerConfig::default(),
        }
    }
}

impl<S: KeyValueStore, C: Clock> DeliveryLedger<S, C> {
    /// Ledger with an explicit clock and configuration
    pub fn with_config(store: S, clock: C, config: LedgerConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            store,
            clock,
            config,
        })
    }

    /// Active configuration
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    /// Underlying store
    pub fn store(&self) -> &S {
        &self.store
    }

    /// Release the underlying store
    pub fn into_store(self) -> S {
        self.store
    }

    // Storage helpers

    pub(crate) fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        match self.store.get(key)? {
            Some(bytes) if !bytes.is_empty() => Ok(Some(serde_json::from_slice(&bytes)?)),
            _ => Ok(None),
        }
    }

    pub(crate) fn load_required<T: DeserializeOwned>(&self, key: &str) -> Result<T> {
        self.load(key)?.ok_or_else(|| {
            tracing::warn!(key, "record not found");
            WaybillError::not_found(key)
        })
    }

    pub(crate) fn save<T: Serialize>(&mut self, key: &str, record: &T) -> Result<()> {
        let bytes = serde_json::to_vec(record)?;
        self.store.put(key, bytes)?;
        Ok(())
    }

    fn exists(&self, key: &str) -> Result<bool> {
        Ok(self
            .store
            .get(key)?
            .is_some_and(|bytes| !bytes.is_empty()))
    }

    fn require_absent(&self, key: &str) -> Result<()> {
        if self.exists(key)? {
            tracing::warn!(key, "record already exists");
            return Err(WaybillError::already_exists(key));
        }
        Ok(())
    }

    pub(crate) fn delete_existing(&mut self, key: &str) -> Result<()> {
        if !self.exists(key)? {
            tracing::warn!(key, "cannot remove missing record");
            return Err(WaybillError::not_found(key));
        }
        self.store.delete(key)?;
        Ok(())
    }

    // Registry

    /// Register an address
    ///
    /// The hash id must match the content and the public key must decode.
    pub fn release_address(&mut self, address: Address) -> Result<Address> {
        check_party(
            &address,
            IdentityViolation::AddressHash,
            IdentityViolation::AddressPublicKey,
        )?;
        let key = RecordKind::Address.key(&address.hash_id);
        self.require_absent(&key)?;
        self.save(&key, &address)?;
        tracing::info!(hash_id = %address.hash_id, "address released");
        Ok(address)
    }

    /// Remove a registered address
    pub fn remove_address(&mut self, hash_id: &str) -> Result<()> {
        self.delete_existing(&RecordKind::Address.key(hash_id))?;
        tracing::info!(hash_id, "address removed");
        Ok(())
    }

    /// Register a courier
    ///
    /// The hash id must match the content and the public key must decode.
    pub fn release_courier(&mut self, courier: Courier) -> Result<Courier> {
        check_party(
            &courier,
            IdentityViolation::CourierHash,
            IdentityViolation::CourierPublicKey,
        )?;
        let key = RecordKind::Courier.key(&courier.hash_id);
        self.require_absent(&key)?;
        self.save(&key, &courier)?;
        tracing::info!(hash_id = %courier.hash_id, "courier released");
        Ok(courier)
    }

    /// Remove a registered courier
    pub fn remove_courier(&mut self, hash_id: &str) -> Result<()> {
        self.delete_existing(&RecordKind::Courier.key(hash_id))?;
        tracing::info!(hash_id, "courier removed");
        Ok(())
    }

    /// Register a good
    pub fn release_good(&mut self, good: Good) -> Result<Good> {
        if !is_valid_uuid(&good.uuid) {
            tracing::warn!(uuid = %good.uuid, "rejected good with invalid uuid");
            return Err(IdentityViolation::Good(good.uuid).into());
        }
        let key = RecordKind::Good.key(&good.uuid);
        self.require_absent(&key)?;
        self.save(&key, &good)?;
        tracing::info!(uuid = %good.uuid, "good released");
        Ok(good)
    }

    /// Remove a registered good
    pub fn remove_good(&mut self, uuid: &str) -> Result<()> {
        self.delete_existing(&RecordKind::Good.key(uuid))?;
        tracing::info!(uuid, "good removed");
        Ok(())
    }

    // Queries

    /// Whether a proposal is pending under `uuid`
    pub fn route_proposal_exists(&self, uuid: &str) -> Result<bool> {
        self.exists(&RecordKind::RouteProposal.key(uuid))
    }

    /// Whether an active route is stored under `uuid`
    pub fn route_exists(&self, uuid: &str) -> Result<bool> {
        self.exists(&RecordKind::Route.key(uuid))
    }

    /// Whether an address is registered
    pub fn address_exists(&self, hash_id: &str) -> Result<bool> {
        self.exists(&RecordKind::Address.key(hash_id))
    }

    /// Whether a courier is registered
    pub fn courier_exists(&self, hash_id: &str) -> Result<bool> {
        self.exists(&RecordKind::Courier.key(hash_id))
    }

    /// Whether a good is registered
    pub fn good_exists(&self, uuid: &str) -> Result<bool> {
        self.exists(&RecordKind::Good.key(uuid))
    }

    /// Load a pending proposal
    pub fn route_proposal(&self, uuid: &str) -> Result<RouteProposal> {
        self.load_required(&RecordKind::RouteProposal.key(uuid))
    }

    /// Load an active route
    pub fn route(&self, uuid: &str) -> Result<Route> {
        self.load_required(&RecordKind::Route.key(uuid))
    }

    /// Read one record by table prefix and id
    pub fn get_data(&self, prefix: &str, id: &str) -> Result<Option<LedgerRecord>> {
        let kind: RecordKind = prefix.parse()?;
        let key = kind.key(id);
        let record = match self.store.get(&key)? {
            Some(bytes) if !bytes.is_empty() => Some(kind.decode(&bytes)?),
            _ => None,
        };
        tracing::debug!(key = %key, found = record.is_some(), "get_data");
        Ok(record)
    }

    /// Read every record in a table, in key order
    pub fn get_all_data(&self, prefix: &str) -> Result<Vec<LedgerRecord>> {
        let kind: RecordKind = prefix.parse()?;
        let (start, end) = kind.scan_range();
        let mut records = Vec::new();
        for entry in self.store.range_scan(&start, &end)? {
            let (_, bytes) = entry?;
            records.push(kind.decode(&bytes)?);
        }
        tracing::debug!(prefix = kind.prefix(), count = records.len(), "get_all_data");
        Ok(records)
    }
}

/// Log a rejected operation and hand the error back
pub(crate) fn rejected(operation: &'static str, id: &str, err: WaybillError) -> WaybillError {
    tracing::warn!(operation, id, error = %err, "operation rejected");
    err
}

fn check_party<T: HashIdentified>(
    record: &T,
    hash_violation: fn(String) -> IdentityViolation,
    key_violation: fn(String) -> IdentityViolation,
) -> Result<()> {
    if !is_valid_hash_id_object(record) {
        tracing::warn!(hash_id = record.hash_id(), "rejected record with mismatched hash id");
        return Err(hash_violation(record.hash_id().to_string()).into());
    }
    if !is_valid_public_key(record.public_key()) {
        tracing::warn!(hash_id = record.hash_id(), "rejected record with invalid public key");
        return Err(key_violation(record.hash_id().to_string()).into());
    }
    Ok(())
}

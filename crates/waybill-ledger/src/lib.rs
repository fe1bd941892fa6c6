//! # Waybill Ledger
//!
//! **Purpose**: The operations a dispatch layer exposes for delivery routes.
//!
//! - Registry: release and remove addresses, couriers and goods
//! - Proposals: create, sign, withdraw and submit multi-party routes
//! - Progress: commit hand-offs in timeline order on active routes
//! - Reads: typed lookups and prefix scans over the ledger tables
//!
//! [`DeliveryLedger`] is generic over a [`waybill_core::KeyValueStore`] and a
//! [`waybill_core::Clock`]. Each call is one read-validate-write transaction;
//! the host serializes calls against the same uuid.
//!
//! ```rust,no_run
//! use waybill_core::MemoryStore;
//! use waybill_ledger::DeliveryLedger;
//!
//! let ledger = DeliveryLedger::new(MemoryStore::new());
//! assert!(ledger.get_all_data("rt").unwrap().is_empty());
//! ```

#![forbid(unsafe_code)]

pub mod config;
pub mod keys;
mod ledger;
mod progress;
mod proposal;

pub use config::LedgerConfig;
pub use keys::{LedgerRecord, RecordKind};
pub use ledger::DeliveryLedger;

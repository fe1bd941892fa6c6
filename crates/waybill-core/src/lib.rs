//! # Waybill Core
//!
//! **Purpose**: Domain records and the cryptographic primitives every other
//! Waybill crate builds on.
//!
//! - Identity records ([`Address`], [`Courier`]) addressed by the SHA-256 of
//!   their canonical JSON form
//! - Route records: goods, the stop/transport chain and commit segments
//! - ECDSA (secp256k1) signing and verification over canonical JSON
//! - The error taxonomy shared by validators and the ledger
//! - Store and clock interfaces the ledger runs against
//!
//! Everything here is synchronous and free of I/O apart from the store trait,
//! whose implementations are supplied by the host.

#![forbid(unsafe_code)]

pub mod canonical;
pub mod crypto;
pub mod errors;
pub mod hash;
pub mod identity;
pub mod store;
pub mod time;
pub mod types;

pub use errors::{
    IdentityViolation, OrderingViolation, RangeViolation, Result, TopologyViolation, WaybillError,
};
pub use store::{KeyValueStore, MemoryStore, RangeScan, StorageError};
pub use time::{Clock, ManualClock, SystemClock};
pub use types::{
    Address, Commit, CommitDetail, Courier, Entity, Good, HashIdentified, Quantities, Route,
    RouteProposal, Segment, Stop, Transport, TransportStep, MAX_ROUTE_STOPS,
};

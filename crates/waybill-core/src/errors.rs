//! Error taxonomy for Waybill operations
//!
//! Every rejected operation maps to exactly one named condition so the
//! dispatch layer can present one message per condition. Conditions with
//! several distinct causes carry a detail enum instead of a free-form string.

use crate::types::TransportStep;
use serde::{Deserialize, Serialize};

/// Unified error type for all Waybill operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum WaybillError {
    /// Referenced proposal, route, address, courier or good does not exist
    #[error("Not found: {key}")]
    NotFound {
        /// Ledger key that was looked up
        key: String,
    },

    /// A record with the same key is already registered
    #[error("Already exists: {key}")]
    AlreadyExists {
        /// Ledger key that is already occupied
        key: String,
    },

    /// The entity already signed this route proposal
    #[error("Entity {entity} already signed route proposal {uuid}")]
    AlreadySigned {
        /// Route uuid
        uuid: String,
        /// Hash id of the signing entity
        entity: String,
    },

    /// The commit slot is already filled
    #[error("Step {step} of segment {segment} in route {uuid} is already committed")]
    AlreadyCommitted {
        /// Route uuid
        uuid: String,
        /// Segment index
        segment: usize,
        /// Step name
        step: TransportStep,
    },

    /// Hash mismatch, malformed public key or malformed uuid
    #[error("Invalid identity: {0}")]
    InvalidIdentity(IdentityViolation),

    /// Broken stop/transport chain or dangling reference
    #[error("Invalid topology: {0}")]
    InvalidTopology(TopologyViolation),

    /// Cryptographic verification failed
    #[error("Invalid signature from {entity}")]
    InvalidSignature {
        /// Hash id of the entity whose key rejected the signature
        entity: String,
    },

    /// Bad segment index, unrecognized step name or record prefix
    #[error("Out of range: {0}")]
    OutOfRange(RangeViolation),

    /// Out-of-sequence or stale commit
    #[error("Ordering violation: {0}")]
    OrderingViolation(OrderingViolation),

    /// Submit attempted before every party signed
    #[error("Route proposal {uuid} has {signed} of {required} required signatures")]
    QuorumNotMet {
        /// Route uuid
        uuid: String,
        /// Signatures collected so far
        signed: usize,
        /// Signatures required (addresses plus couriers)
        required: usize,
    },

    /// Key-value store failure
    #[error("Storage error: {message}")]
    Storage {
        /// Error message from the store
        message: String,
    },

    /// Encoding or decoding failure
    #[error("Serialization error: {message}")]
    Serialization {
        /// Error message describing the serialization failure
        message: String,
    },

    /// Invalid or unreadable configuration
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },
}

/// Causes of [`WaybillError::InvalidIdentity`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum IdentityViolation {
    /// Route uuid is not 16 to 64 ASCII alphanumerics
    #[error("route uuid {0:?} is not valid")]
    RouteUuid(String),
    /// Good is stored under a different key or carries an invalid uuid
    #[error("good {0:?} is keyed incorrectly or has an invalid uuid")]
    Good(String),
    /// Address hash id differs from the hash of its content
    #[error("address {0:?} does not match its content hash")]
    AddressHash(String),
    /// Address public key does not parse
    #[error("address {0:?} has an invalid public key")]
    AddressPublicKey(String),
    /// Courier hash id differs from the hash of its content
    #[error("courier {0:?} does not match its content hash")]
    CourierHash(String),
    /// Courier public key does not parse
    #[error("courier {0:?} has an invalid public key")]
    CourierPublicKey(String),
}

/// Causes of [`WaybillError::InvalidTopology`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum TopologyViolation {
    /// The first stop has no outgoing transport
    #[error("a route needs at least two stops")]
    MissingTransport,
    /// The chain is longer than a stored route can hold
    #[error("route has more than {max} stops")]
    TooManyStops {
        /// Largest accepted stop count
        max: usize,
    },
    /// A stop names an address the route does not carry
    #[error("stop {stop} references unknown address {address}")]
    UnknownAddress {
        /// Stop index in chain order
        stop: usize,
        /// Address hash id
        address: String,
    },
    /// A stop expects arrival before the stop preceding it
    #[error("stop {stop} expects arrival at {timestamp}, before the previous stop at {previous}")]
    DecreasingTimestamp {
        /// Stop index in chain order
        stop: usize,
        /// Expected arrival of this stop
        timestamp: u64,
        /// Expected arrival of the previous stop
        previous: u64,
    },
    /// A stop moves a good the route does not declare
    #[error("stop {stop} references unknown good {good}")]
    UnknownGood {
        /// Stop index in chain order
        stop: usize,
        /// Good uuid
        good: String,
    },
    /// A transport names a courier the route does not carry
    #[error("transport after stop {stop} references unknown courier {courier}")]
    UnknownCourier {
        /// Index of the transport's source stop
        stop: usize,
        /// Courier hash id
        courier: String,
    },
    /// A commit delta moves a good the route does not declare
    #[error("commit for {step} of segment {segment} references unknown good {good}")]
    UnknownCommitGood {
        /// Segment index
        segment: usize,
        /// Step of the commit
        step: TransportStep,
        /// Good uuid
        good: String,
    },
    /// The number of commit segments differs from the number of transports
    #[error("route has {transports} transports but {segments} segments")]
    SegmentCountMismatch {
        /// Transport edges in the chain
        transports: usize,
        /// Commit segments stored
        segments: usize,
    },
}

/// Causes of [`WaybillError::OutOfRange`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum RangeViolation {
    /// Segment index past the last segment
    #[error("segment index {index} is outside 0..{len}")]
    SegmentIndex {
        /// Requested index
        index: usize,
        /// Number of segments
        len: usize,
    },
    /// Step name outside the four protocol steps
    #[error("unrecognized step {0:?}")]
    Step(String),
    /// Record prefix outside the ledger tables
    #[error("unrecognized record prefix {0:?}")]
    Prefix(String),
}

/// Causes of [`WaybillError::OrderingViolation`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, thiserror::Error)]
pub enum OrderingViolation {
    /// The moment before this one has no commit yet
    #[error("previous step {step} of segment {segment} is not committed yet")]
    PredecessorUncommitted {
        /// Segment of the uncommitted moment
        segment: usize,
        /// Step of the uncommitted moment
        step: TransportStep,
    },
    /// The commit is timestamped before the previous commit
    #[error("timestamp {timestamp} is earlier than the previous commit at {previous}")]
    BeforePredecessor {
        /// Timestamp of the rejected commit
        timestamp: u64,
        /// Timestamp of the previous commit
        previous: u64,
    },
    /// The commit timestamp is outside the freshness window
    #[error("timestamp {timestamp} is more than {window_ms}ms away from now ({now})")]
    Stale {
        /// Timestamp of the rejected commit
        timestamp: u64,
        /// Ledger time when the commit was checked
        now: u64,
        /// Configured freshness window
        window_ms: u64,
    },
}

impl WaybillError {
    /// Create a not found error for a ledger key
    pub fn not_found(key: impl Into<String>) -> Self {
        Self::NotFound { key: key.into() }
    }

    /// Create an already exists error for a ledger key
    pub fn already_exists(key: impl Into<String>) -> Self {
        Self::AlreadyExists { key: key.into() }
    }

    /// Create an invalid signature error
    pub fn invalid_signature(entity: impl Into<String>) -> Self {
        Self::InvalidSignature {
            entity: entity.into(),
        }
    }

    /// Create a storage error
    pub fn storage(message: impl Into<String>) -> Self {
        Self::Storage {
            message: message.into(),
        }
    }

    /// Create a serialization error
    pub fn serialization(message: impl Into<String>) -> Self {
        Self::Serialization {
            message: message.into(),
        }
    }

    /// Create a configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config {
            message: message.into(),
        }
    }
}

impl From<IdentityViolation> for WaybillError {
    fn from(violation: IdentityViolation) -> Self {
        Self::InvalidIdentity(violation)
    }
}

impl From<TopologyViolation> for WaybillError {
    fn from(violation: TopologyViolation) -> Self {
        Self::InvalidTopology(violation)
    }
}

impl From<RangeViolation> for WaybillError {
    fn from(violation: RangeViolation) -> Self {
        Self::OutOfRange(violation)
    }
}

impl From<OrderingViolation> for WaybillError {
    fn from(violation: OrderingViolation) -> Self {
        Self::OrderingViolation(violation)
    }
}

impl From<serde_json::Error> for WaybillError {
    fn from(err: serde_json::Error) -> Self {
        Self::serialization(err.to_string())
    }
}

/// Standard Result type for Waybill operations
pub type Result<T> = std::result::Result<T, WaybillError>;

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;

    #[test]
    fn test_error_creation() {
        let err = WaybillError::not_found("rp-abc");
        assert_matches!(err, WaybillError::NotFound { ref key } if key == "rp-abc");
        assert_eq!(err.to_string(), "Not found: rp-abc");
    }

    #[test]
    fn test_violation_conversion() {
        let err: WaybillError = TopologyViolation::MissingTransport.into();
        assert_eq!(
            err.to_string(),
            "Invalid topology: a route needs at least two stops"
        );

        let err: WaybillError = RangeViolation::Step("teleport".into()).into();
        assert_matches!(err, WaybillError::OutOfRange(RangeViolation::Step(_)));
    }

    #[test]
    fn test_json_error_conversion() {
        let json_err = serde_json::from_str::<u64>("nope").unwrap_err();
        let err = WaybillError::from(json_err);
        assert_matches!(err, WaybillError::Serialization { .. });
    }
}

//! Ledger key layout
//!
//! Every record lives under `<prefix>-<id>`. A whole table is scanned with
//! the half-open range `("<prefix>-", "<prefix>.")`, since `.` is the byte
//! after `-`.

use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use waybill_core::{
    Address, Courier, Good, RangeViolation, Result, Route, RouteProposal, WaybillError,
};

/// The logical tables of the ledger
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum RecordKind {
    /// `rp-<uuid>`
    RouteProposal,
    /// `rt-<uuid>`
    Route,
    /// `ad-<hashId>`
    Address,
    /// `cr-<hashId>`
    Courier,
    /// `gs-<uuid>`
    Good,
}

impl RecordKind {
    /// Every table
    pub const ALL: [RecordKind; 5] = [
        RecordKind::RouteProposal,
        RecordKind::Route,
        RecordKind::Address,
        RecordKind::Courier,
        RecordKind::Good,
    ];

    /// Two-letter key prefix
    pub fn prefix(self) -> &'static str {
        match self {
            RecordKind::RouteProposal => "rp",
            RecordKind::Route => "rt",
            RecordKind::Address => "ad",
            RecordKind::Courier => "cr",
            RecordKind::Good => "gs",
        }
    }

    /// Full key for a record id
    pub fn key(self, id: &str) -> String {
        format!("{}-{id}", self.prefix())
    }

    /// Half-open key range covering the whole table
    pub fn scan_range(self) -> (String, String) {
        (format!("{}-", self.prefix()), format!("{}.", self.prefix()))
    }

    /// Decode stored bytes as a record of this kind
    pub fn decode(self, bytes: &[u8]) -> Result<LedgerRecord> {
        Ok(match self {
            RecordKind::RouteProposal => LedgerRecord::RouteProposal(serde_json::from_slice(bytes)?),
            RecordKind::Route => LedgerRecord::Route(serde_json::from_slice(bytes)?),
            RecordKind::Address => LedgerRecord::Address(serde_json::from_slice(bytes)?),
            RecordKind::Courier => LedgerRecord::Courier(serde_json::from_slice(bytes)?),
            RecordKind::Good => LedgerRecord::Good(serde_json::from_slice(bytes)?),
        })
    }
}

impl fmt::Display for RecordKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.prefix())
    }
}

impl FromStr for RecordKind {
    type Err = WaybillError;

    fn from_str(s: &str) -> Result<Self> {
        RecordKind::ALL
            .into_iter()
            .find(|kind| kind.prefix() == s)
            .ok_or_else(|| RangeViolation::Prefix(s.to_string()).into())
    }
}

/// A record read back from the ledger
///
/// Serializes as the bare inner record, the shape the dispatch layer returns.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum LedgerRecord {
    /// Pending proposal
    RouteProposal(RouteProposal),
    /// Active route
    Route(Route),
    /// Registered address
    Address(Address),
    /// Registered courier
    Courier(Courier),
    /// Registered good
    Good(Good),
}

impl LedgerRecord {
    /// Table the record belongs to
    pub fn kind(&self) -> RecordKind {
        match self {
            LedgerRecord::RouteProposal(_) => RecordKind::RouteProposal,
            LedgerRecord::Route(_) => RecordKind::Route,
            LedgerRecord::Address(_) => RecordKind::Address,
            LedgerRecord::Courier(_) => RecordKind::Courier,
            LedgerRecord::Good(_) => RecordKind::Good,
        }
    }

    /// Id the record is stored under
    pub fn id(&self) -> &str {
        match self {
            LedgerRecord::RouteProposal(proposal) => &proposal.route.uuid,
            LedgerRecord::Route(route) => &route.uuid,
            LedgerRecord::Address(address) => &address.hash_id,
            LedgerRecord::Courier(courier) => &courier.hash_id,
            LedgerRecord::Good(good) => &good.uuid,
        }
    }
}

//! Route records: goods, the stop/transport chain and commit segments

use super::party::{Address, Courier, Entity};
use crate::errors::{RangeViolation, WaybillError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Longest stop chain a route may carry
///
/// Each stop adds two levels of JSON nesting to the stored record and
/// `serde_json` refuses input nested deeper than 128 levels.
pub const MAX_ROUTE_STOPS: usize = 48;

/// Good uuid to signed quantity
pub type Quantities = BTreeMap<String, i64>;

/// Inventory unit referenced by quantity maps
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Good {
    /// Alphanumeric identifier, 16 to 64 characters
    pub uuid: String,
    /// Display name
    pub name: String,
    /// Barcode printed on the unit
    pub barcode: String,
}

/// A location node in the forward stop chain
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stop {
    /// Hash id of the stop's address
    pub address: String,
    /// Expected arrival, Unix milliseconds
    pub expected_arrival_timestamp: u64,
    /// Goods expected to arrive at this stop
    #[serde(default)]
    pub input: Quantities,
    /// Goods expected to leave this stop
    #[serde(default)]
    pub output: Quantities,
    /// Transport to the following stop; absent on the last stop
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<Box<Transport>>,
}

impl Stop {
    /// Walk this stop and every stop reachable through its transports
    pub fn walk(&self) -> StopWalk<'_> {
        StopWalk { next: Some(self) }
    }

    /// Number of transport edges from this stop to the end of the chain
    pub fn transport_count(&self) -> usize {
        self.walk().filter(|stop| stop.next.is_some()).count()
    }
}

/// Iterator over a stop chain, head first
#[derive(Debug, Clone)]
pub struct StopWalk<'a> {
    next: Option<&'a Stop>,
}

impl<'a> Iterator for StopWalk<'a> {
    type Item = &'a Stop;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.next?;
        self.next = current.next.as_deref().map(|transport| &transport.destination);
        Some(current)
    }
}

/// An edge between two adjacent stops
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transport {
    /// Hash id of the courier carrying the goods
    pub courier: String,
    /// Free-text notes
    pub info: String,
    /// Stop the goods travel to
    pub destination: Stop,
}

/// Payload a party signs when attesting to a hand-off
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitDetail {
    /// Good uuid to signed quantity actually moved
    pub delta: Quantities,
    /// Free-text notes
    pub info: String,
    /// When the hand-off happened, Unix milliseconds
    pub timestamp: u64,
}

/// One party's signed attestation of a transfer event
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Commit {
    /// The attested event
    pub detail: CommitDetail,
    /// Hex DER ECDSA signature over the canonical detail
    pub signature: String,
}

/// The four hand-off steps of a transport edge, in protocol order
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TransportStep {
    /// Source address releases goods
    SrcOutgoing,
    /// Courier picks goods up
    CourierReceiving,
    /// Courier hands goods over
    CourierDelivering,
    /// Destination address accepts goods
    DstIncoming,
}

impl TransportStep {
    /// Every step in protocol order
    pub const ALL: [TransportStep; 4] = [
        TransportStep::SrcOutgoing,
        TransportStep::CourierReceiving,
        TransportStep::CourierDelivering,
        TransportStep::DstIncoming,
    ];

    /// Position of the step within its segment
    pub fn index(self) -> usize {
        match self {
            TransportStep::SrcOutgoing => 0,
            TransportStep::CourierReceiving => 1,
            TransportStep::CourierDelivering => 2,
            TransportStep::DstIncoming => 3,
        }
    }

    /// Wire name of the step
    pub fn as_str(self) -> &'static str {
        match self {
            TransportStep::SrcOutgoing => "srcOutgoing",
            TransportStep::CourierReceiving => "courierReceiving",
            TransportStep::CourierDelivering => "courierDelivering",
            TransportStep::DstIncoming => "dstIncoming",
        }
    }

    /// Whether the courier, rather than an address, signs this step
    pub fn is_courier_step(self) -> bool {
        matches!(
            self,
            TransportStep::CourierReceiving | TransportStep::CourierDelivering
        )
    }
}

impl fmt::Display for TransportStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransportStep {
    type Err = WaybillError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TransportStep::ALL
            .into_iter()
            .find(|step| step.as_str() == s)
            .ok_or_else(|| RangeViolation::Step(s.to_string()).into())
    }
}

/// Commit slots for one transport edge
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Segment {
    /// Source address releases goods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub src_outgoing: Option<Commit>,
    /// Courier picks goods up
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_receiving: Option<Commit>,
    /// Courier hands goods over
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub courier_delivering: Option<Commit>,
    /// Destination address accepts goods
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub dst_incoming: Option<Commit>,
}

impl Segment {
    /// Commit recorded for a step, if any
    pub fn get(&self, step: TransportStep) -> Option<&Commit> {
        match step {
            TransportStep::SrcOutgoing => self.src_outgoing.as_ref(),
            TransportStep::CourierReceiving => self.courier_receiving.as_ref(),
            TransportStep::CourierDelivering => self.courier_delivering.as_ref(),
            TransportStep::DstIncoming => self.dst_incoming.as_ref(),
        }
    }

    /// Mutable slot for a step
    pub fn slot_mut(&mut self, step: TransportStep) -> &mut Option<Commit> {
        match step {
            TransportStep::SrcOutgoing => &mut self.src_outgoing,
            TransportStep::CourierReceiving => &mut self.courier_receiving,
            TransportStep::CourierDelivering => &mut self.courier_delivering,
            TransportStep::DstIncoming => &mut self.dst_incoming,
        }
    }

    /// True when no step has been committed
    pub fn is_empty(&self) -> bool {
        TransportStep::ALL.iter().all(|step| self.get(*step).is_none())
    }
}

/// A multi-stop delivery route
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Route {
    /// Alphanumeric identifier, 16 to 64 characters
    pub uuid: String,
    /// Goods referenced by the route, keyed by uuid
    pub goods: BTreeMap<String, Good>,
    /// Addresses referenced by the route, keyed by hash id
    pub addresses: BTreeMap<String, Address>,
    /// Couriers referenced by the route, keyed by hash id
    pub couriers: BTreeMap<String, Courier>,
    /// Head of the stop chain
    pub source: Stop,
    /// One segment per transport edge
    pub commits: Vec<Segment>,
}

impl Route {
    /// Resolve a hash id against the route's addresses, then its couriers
    pub fn entity(&self, hash_id: &str) -> Option<Entity<'_>> {
        self.addresses
            .get(hash_id)
            .map(Entity::Address)
            .or_else(|| self.couriers.get(hash_id).map(Entity::Courier))
    }

    /// Number of parties that must sign before the route activates
    pub fn party_count(&self) -> usize {
        self.addresses.len() + self.couriers.len()
    }

    /// Committed events in protocol order, skipping empty slots
    pub fn commit_timeline(&self) -> Vec<&Commit> {
        self.commits
            .iter()
            .flat_map(|segment| {
                TransportStep::ALL
                    .into_iter()
                    .filter_map(move |step| segment.get(step))
            })
            .collect()
    }
}

/// A route awaiting consent from every party it references
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteProposal {
    /// Proposed route
    pub route: Route,
    /// Entity hash id to hex signature over the canonical route
    pub signatures: BTreeMap<String, String>,
}

impl RouteProposal {
    /// Wrap a route with no signatures yet
    pub fn new(route: Route) -> Self {
        Self {
            route,
            signatures: BTreeMap::new(),
        }
    }

    /// Whether every address and courier has signed
    pub fn is_fully_signed(&self) -> bool {
        self.signatures.len() == self.route.party_count()
    }
}

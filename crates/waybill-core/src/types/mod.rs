//! Domain records exchanged with the dispatch layer and persisted in the ledger

pub mod party;
pub mod route;

pub use party::{Address, Courier, Entity, HashIdentified, HASH_ID_FIELD};
pub use route::{
    Commit, CommitDetail, Good, Quantities, Route, RouteProposal, Segment, Stop, StopWalk,
    Transport, TransportStep, MAX_ROUTE_STOPS,
};

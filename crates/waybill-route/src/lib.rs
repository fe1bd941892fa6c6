//! # Waybill Route
//!
//! Structural rules for delivery routes and the timeline projection the
//! ledger orders commits against.
//!
//! - [`topology`]: pure validators for identities, the stop chain and
//!   segment parity
//! - [`view`]: [`RouteView`], an index-based projection of stops,
//!   transports and the four-moments-per-segment timeline

#![forbid(unsafe_code)]

pub mod topology;
pub mod view;

pub use topology::{
    check_route_detail, is_empty_segment, is_empty_segment_list, is_valid_route_detail,
    validate_route,
};
pub use view::{
    moment_index, GoodMoment, Moment, RouteView, StopPosition, StopView, TransportView,
    STEPS_PER_SEGMENT,
};

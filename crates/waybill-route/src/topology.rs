//! Route topology validation
//!
//! [`validate_route`] is pure and fail-fast: the first violated condition is
//! returned and nothing else is checked. It is cheap enough to re-run on
//! every mutating ledger operation.

use std::collections::BTreeMap;
use waybill_core::identity::{
    first_invalid_good, first_invalid_hash_id, first_invalid_public_key, is_valid_uuid,
};
use waybill_core::{
    IdentityViolation, Result, Route, Segment, Stop, TopologyViolation, MAX_ROUTE_STOPS,
};

/// Validate identities, chain structure and segment parity of a route
///
/// Checks run in this order:
/// 1. route uuid
/// 2. goods keyed by their own valid uuid
/// 3. address and courier hash identities
/// 4. address and courier public keys
/// 5. the stop/transport chain ([`check_route_detail`])
/// 6. one segment per transport edge
pub fn validate_route(route: &Route) -> Result<()> {
    if !is_valid_uuid(&route.uuid) {
        return Err(IdentityViolation::RouteUuid(route.uuid.clone()).into());
    }

    if let Some(uuid) = first_invalid_good(&route.goods) {
        return Err(IdentityViolation::Good(uuid.to_string()).into());
    }

    if let Some(hash_id) = first_invalid_hash_id(&route.addresses) {
        return Err(IdentityViolation::AddressHash(hash_id.to_string()).into());
    }
    if let Some(hash_id) = first_invalid_hash_id(&route.couriers) {
        return Err(IdentityViolation::CourierHash(hash_id.to_string()).into());
    }

    if let Some(hash_id) = first_invalid_public_key(&route.addresses) {
        return Err(IdentityViolation::AddressPublicKey(hash_id.to_string()).into());
    }
    if let Some(hash_id) = first_invalid_public_key(&route.couriers) {
        return Err(IdentityViolation::CourierPublicKey(hash_id.to_string()).into());
    }

    let transports = check_route_detail(
        &route.addresses,
        &route.couriers,
        &route.goods,
        &route.source,
    )?;

    if transports != route.commits.len() {
        return Err(TopologyViolation::SegmentCountMismatch {
            transports,
            segments: route.commits.len(),
        }
        .into());
    }

    tracing::trace!(uuid = %route.uuid, transports, "route topology valid");
    Ok(())
}

/// Walk the stop chain and check every reference and timestamp
///
/// Every stop, the last included, must name a known address, expect arrival
/// no earlier than the stop before it and only mention known goods. Every
/// transport must name a known courier. Chains longer than
/// [`MAX_ROUTE_STOPS`] are rejected. Returns the number of transport edges
/// walked.
pub fn check_route_detail<A, C, G>(
    addresses: &BTreeMap<String, A>,
    couriers: &BTreeMap<String, C>,
    goods: &BTreeMap<String, G>,
    first_stop: &Stop,
) -> std::result::Result<usize, TopologyViolation> {
    if first_stop.next.is_none() {
        return Err(TopologyViolation::MissingTransport);
    }

    let mut previous = 0u64;
    let mut transports = 0usize;

    for (index, stop) in first_stop.walk().enumerate() {
        if index == MAX_ROUTE_STOPS {
            return Err(TopologyViolation::TooManyStops {
                max: MAX_ROUTE_STOPS,
            });
        }

        if !addresses.contains_key(&stop.address) {
            return Err(TopologyViolation::UnknownAddress {
                stop: index,
                address: stop.address.clone(),
            });
        }

        if stop.expected_arrival_timestamp < previous {
            return Err(TopologyViolation::DecreasingTimestamp {
                stop: index,
                timestamp: stop.expected_arrival_timestamp,
                previous,
            });
        }
        previous = stop.expected_arrival_timestamp;

        if let Some(good) = stop
            .input
            .keys()
            .chain(stop.output.keys())
            .find(|uuid| !goods.contains_key(*uuid))
        {
            return Err(TopologyViolation::UnknownGood {
                stop: index,
                good: good.clone(),
            });
        }

        if let Some(transport) = stop.next.as_deref() {
            if !couriers.contains_key(&transport.courier) {
                return Err(TopologyViolation::UnknownCourier {
                    stop: index,
                    courier: transport.courier.clone(),
                });
            }
            transports += 1;
        }
    }

    Ok(transports)
}

/// Boolean form of [`check_route_detail`]
pub fn is_valid_route_detail<A, C, G>(
    addresses: &BTreeMap<String, A>,
    couriers: &BTreeMap<String, C>,
    goods: &BTreeMap<String, G>,
    first_stop: &Stop,
) -> bool {
    check_route_detail(addresses, couriers, goods, first_stop).is_ok()
}

/// True when no step of the segment has been committed
pub fn is_empty_segment(segment: &Segment) -> bool {
    segment.is_empty()
}

/// True when no step of any segment has been committed
pub fn is_empty_segment_list(segments: &[Segment]) -> bool {
    segments.iter().all(is_empty_segment)
}

//! Route validation properties.

#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]

use assert_matches::assert_matches;
use proptest::prelude::*;
use waybill_core::{
    Commit, CommitDetail, IdentityViolation, Quantities, Route, Stop, TopologyViolation,
    WaybillError,
};
use waybill_route::{is_empty_segment_list, validate_route};
use waybill_testkit::strategies::{arb_invalid_uuid, arb_scenario, arb_step, arb_uuid};
use waybill_testkit::{DeliveryScenario, PartyFixture};

fn blank_commit() -> Commit {
    Commit {
        detail: CommitDetail {
            delta: Quantities::new(),
            info: String::new(),
            timestamp: 0,
        },
        signature: String::new(),
    }
}

fn second_stop(route: &mut Route) -> &mut Stop {
    &mut route.source.next.as_mut().unwrap().destination
}

proptest! {
    #[test]
    fn scenarios_validate(scenario in arb_scenario()) {
        prop_assert!(validate_route(&scenario.route).is_ok());
        prop_assert!(is_empty_segment_list(&scenario.route.commits));
    }

    #[test]
    fn any_accepted_uuid_validates(uuid in arb_uuid()) {
        let mut scenario = DeliveryScenario::two_stop(0);
        scenario.route.uuid = uuid;
        prop_assert!(validate_route(&scenario.route).is_ok());
    }

    #[test]
    fn rejected_uuids_fail_first(uuid in arb_invalid_uuid()) {
        let mut scenario = DeliveryScenario::two_stop(0);
        scenario.route.uuid = uuid;
        scenario.route.commits.clear();
        prop_assert!(matches!(
            validate_route(&scenario.route),
            Err(WaybillError::InvalidIdentity(IdentityViolation::RouteUuid(_)))
        ));
    }

    #[test]
    fn extra_segments_are_rejected(scenario in arb_scenario(), extra in 1usize..3) {
        let mut scenario = scenario;
        let transports = scenario.route.commits.len();
        for _ in 0..extra {
            scenario.route.commits.push(Default::default());
        }
        let is_mismatch = matches!(
            validate_route(&scenario.route),
            Err(WaybillError::InvalidTopology(TopologyViolation::SegmentCountMismatch {
                transports: t,
                segments: s,
            })) if t == transports && s == transports + extra
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn missing_segments_are_rejected(scenario in arb_scenario(), missing in 1usize..=5) {
        let mut scenario = scenario;
        let transports = scenario.route.commits.len();
        let kept = transports.saturating_sub(missing);
        scenario.route.commits.truncate(kept);
        let is_mismatch = matches!(
            validate_route(&scenario.route),
            Err(WaybillError::InvalidTopology(TopologyViolation::SegmentCountMismatch {
                transports: t,
                segments: s,
            })) if t == transports && s == kept
        );
        prop_assert!(is_mismatch);
    }

    #[test]
    fn committed_slots_do_not_affect_topology(scenario in arb_scenario(), step in arb_step()) {
        let mut scenario = scenario;
        *scenario.route.commits[0].slot_mut(step) = Some(blank_commit());
        prop_assert!(validate_route(&scenario.route).is_ok());
        prop_assert!(!is_empty_segment_list(&scenario.route.commits));
    }
}

#[test]
fn tampered_address_is_identity_violation() {
    let mut scenario = DeliveryScenario::two_stop(0);
    let hash_id = scenario.addresses[0].hash_id().to_string();
    scenario
        .route
        .addresses
        .get_mut(&hash_id)
        .unwrap()
        .recipient
        .push_str(" (changed)");
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidIdentity(IdentityViolation::AddressHash(h))) if h == hash_id
    );
}

#[test]
fn bad_courier_key_is_identity_violation() {
    let mut scenario = DeliveryScenario::two_stop(0);
    let courier = waybill_core::Courier::new("Eve", "Nowhere", "0", "not-hex").unwrap();
    scenario
        .route
        .couriers
        .insert(courier.hash_id.clone(), courier);
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidIdentity(IdentityViolation::CourierPublicKey(_)))
    );
}

#[test]
fn mis_keyed_good_is_identity_violation() {
    let mut scenario = DeliveryScenario::two_stop(0);
    let mut good = scenario.good.clone();
    good.uuid = "short".into();
    scenario.route.goods.insert(scenario.good.uuid.clone(), good);
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidIdentity(IdentityViolation::Good(_)))
    );
}

#[test]
fn last_stop_references_are_checked() {
    let mut scenario = DeliveryScenario::two_stop(0);
    let stranger = PartyFixture::address(77, "Stranger");
    second_stop(&mut scenario.route).address = stranger.hash_id().to_string();
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidTopology(TopologyViolation::UnknownAddress { stop: 1, .. }))
    );
}

#[test]
fn single_stop_route_is_rejected() {
    let mut scenario = DeliveryScenario::two_stop(0);
    scenario.route.source.next = None;
    scenario.route.commits.clear();
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidTopology(TopologyViolation::MissingTransport))
    );
}

#[test]
fn arrival_times_may_repeat_but_not_decrease() {
    let mut scenario = DeliveryScenario::with_stops(3, 10_000);
    second_stop(&mut scenario.route).expected_arrival_timestamp = 10_000;
    assert!(validate_route(&scenario.route).is_ok());

    second_stop(&mut scenario.route).expected_arrival_timestamp = 9_999;
    assert_matches!(
        validate_route(&scenario.route),
        Err(WaybillError::InvalidTopology(TopologyViolation::DecreasingTimestamp {
            stop: 1,
            ..
        }))
    );
}

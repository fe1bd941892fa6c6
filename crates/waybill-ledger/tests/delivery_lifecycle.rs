//! End-to-end proposal, consent and progress scenarios.

#![allow(clippy::expect_used, clippy::unwrap_used, missing_docs)]

use assert_matches::assert_matches;
use waybill_core::{
    KeyValueStore, ManualClock, MemoryStore, OrderingViolation, RangeScan, RouteProposal,
    StorageError, TopologyViolation, TransportStep, WaybillError, MAX_ROUTE_STOPS,
};
use waybill_ledger::{DeliveryLedger, LedgerConfig, LedgerRecord};
use waybill_testkit::{init_test_tracing, DeliveryScenario};

const NOW: u64 = 1_700_000_000_000;

type TestLedger = DeliveryLedger<MemoryStore, ManualClock>;

fn ledger_at(now: u64) -> (TestLedger, ManualClock) {
    init_test_tracing();
    let clock = ManualClock::new(now);
    let ledger =
        DeliveryLedger::with_config(MemoryStore::new(), clock.clone(), LedgerConfig::default())
            .unwrap();
    (ledger, clock)
}

fn activate(ledger: &mut TestLedger, scenario: &DeliveryScenario) {
    let uuid = &scenario.route.uuid;
    ledger.create_route_proposal(scenario.route.clone()).unwrap();
    for (hash_id, signature) in scenario.route_signatures() {
        ledger.sign_route_proposal(uuid, &hash_id, &signature).unwrap();
    }
    ledger.submit_route_proposal(uuid).unwrap();
}

#[test]
fn proposal_reads_back_unsigned() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    ledger.create_route_proposal(scenario.route.clone()).unwrap();

    let expected = LedgerRecord::RouteProposal(RouteProposal::new(scenario.route.clone()));
    assert_eq!(
        ledger.get_data("rp", &scenario.route.uuid).unwrap(),
        Some(expected)
    );
}

#[test]
fn reproposing_resets_signatures() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    ledger.create_route_proposal(scenario.route.clone()).unwrap();

    let (hash_id, signature) = scenario.route_signatures().remove(0);
    let signed = ledger.sign_route_proposal(&uuid, &hash_id, &signature).unwrap();
    assert_eq!(signed.signatures.len(), 1);

    let mut changed = scenario.route.clone();
    changed.source.next.as_mut().unwrap().info = "use the loading bay".into();
    let fresh = ledger.create_route_proposal(changed.clone()).unwrap();
    assert!(fresh.signatures.is_empty());
    assert_eq!(ledger.route_proposal(&uuid).unwrap().route, changed);

    // the old signature covered the old route content
    assert_matches!(
        ledger.sign_route_proposal(&uuid, &hash_id, &signature),
        Err(WaybillError::InvalidSignature { .. })
    );
}

#[test]
fn full_consent_activates_route() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    let signatures = scenario.route_signatures();
    ledger.create_route_proposal(scenario.route.clone()).unwrap();

    for (hash_id, signature) in &signatures {
        ledger.sign_route_proposal(&uuid, hash_id, signature).unwrap();
    }

    let (first, first_signature) = &signatures[0];
    assert_matches!(
        ledger.sign_route_proposal(&uuid, first, first_signature),
        Err(WaybillError::AlreadySigned { entity, .. }) if &entity == first
    );

    let route = ledger.submit_route_proposal(&uuid).unwrap();
    assert_eq!(route, scenario.route);
    assert!(!ledger.route_proposal_exists(&uuid).unwrap());
    assert_eq!(
        ledger.get_data("rt", &uuid).unwrap(),
        Some(LedgerRecord::Route(scenario.route.clone()))
    );
    assert_matches!(
        ledger.submit_route_proposal(&uuid),
        Err(WaybillError::NotFound { key }) if key == format!("rp-{uuid}")
    );
}

#[test]
fn commit_progress_ordering_rules() {
    let (mut ledger, clock) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    activate(&mut ledger, &scenario);

    let outgoing = scenario.commit(0, TransportStep::SrcOutgoing, NOW);
    ledger
        .commit_progress(&uuid, 0, TransportStep::SrcOutgoing, outgoing.clone())
        .unwrap();

    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::SrcOutgoing, outgoing),
        Err(WaybillError::AlreadyCommitted {
            segment: 0,
            step: TransportStep::SrcOutgoing,
            ..
        })
    );

    let skipped = scenario.commit(0, TransportStep::CourierDelivering, NOW + 10);
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::CourierDelivering, skipped),
        Err(WaybillError::OrderingViolation(
            OrderingViolation::PredecessorUncommitted {
                segment: 0,
                step: TransportStep::CourierReceiving
            }
        ))
    );

    let mut backdated = scenario.commit(0, TransportStep::CourierReceiving, NOW - 1);
    backdated.signature = String::new();
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::CourierReceiving, backdated),
        Err(WaybillError::OrderingViolation(
            OrderingViolation::BeforePredecessor {
                timestamp,
                previous: NOW
            }
        )) if timestamp == NOW - 1
    );

    clock.advance_ms(120_000);
    let stale = scenario.commit(0, TransportStep::CourierReceiving, NOW + 5);
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::CourierReceiving, stale),
        Err(WaybillError::OrderingViolation(OrderingViolation::Stale { .. }))
    );

    let future = scenario.commit(0, TransportStep::CourierReceiving, NOW + 120_000 + 60_001);
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::CourierReceiving, future),
        Err(WaybillError::OrderingViolation(OrderingViolation::Stale { .. }))
    );

    let forged = scenario.forged_commit(0, TransportStep::CourierReceiving, NOW + 120_000);
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::CourierReceiving, forged),
        Err(WaybillError::InvalidSignature { .. })
    );

    let route = ledger.route(&uuid).unwrap();
    assert_eq!(route.commit_timeline().len(), 1);
}

#[test]
fn ordering_carries_across_segments() {
    let (mut ledger, clock) = ledger_at(NOW);
    let scenario = DeliveryScenario::with_stops(3, NOW);
    let uuid = scenario.route.uuid.clone();
    activate(&mut ledger, &scenario);

    let early = scenario.commit(1, TransportStep::SrcOutgoing, NOW);
    assert_matches!(
        ledger.commit_progress(&uuid, 1, TransportStep::SrcOutgoing, early),
        Err(WaybillError::OrderingViolation(
            OrderingViolation::PredecessorUncommitted {
                segment: 0,
                step: TransportStep::DstIncoming
            }
        ))
    );

    let mut at = NOW;
    for segment in 0..2 {
        for step in TransportStep::ALL {
            at += 1_000;
            clock.set_ms(at);
            let commit = scenario.commit(segment, step, at);
            ledger.commit_progress(&uuid, segment, step, commit).unwrap();
        }
    }

    let route = ledger.route(&uuid).unwrap();
    let timeline: Vec<_> = route
        .commit_timeline()
        .iter()
        .map(|c| c.detail.timestamp)
        .collect();
    assert_eq!(timeline.len(), 8);
    assert!(timeline.windows(2).all(|pair| pair[0] < pair[1]));
}

#[test]
fn equal_timestamps_are_in_order() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    activate(&mut ledger, &scenario);

    for step in TransportStep::ALL {
        let commit = scenario.commit(0, step, NOW);
        ledger.commit_progress(&uuid, 0, step, commit).unwrap();
    }
    assert!(ledger
        .route(&uuid)
        .unwrap()
        .commits
        .iter()
        .all(|segment| TransportStep::ALL
            .iter()
            .all(|step| segment.get(*step).is_some())));
}

#[test]
fn rejected_operations_leave_store_untouched() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    activate(&mut ledger, &scenario);

    let before = ledger.store().clone();
    let skipped = scenario.commit(0, TransportStep::DstIncoming, NOW);
    assert!(ledger
        .commit_progress(&uuid, 0, TransportStep::DstIncoming, skipped)
        .is_err());
    let outgoing = scenario.commit(0, TransportStep::SrcOutgoing, NOW);
    assert!(ledger
        .commit_progress_named(&uuid, 0, "unload", outgoing)
        .is_err());

    let after = ledger.store();
    assert_eq!(
        before.keys().collect::<Vec<_>>(),
        after.keys().collect::<Vec<_>>()
    );
    assert_eq!(ledger.route(&uuid).unwrap(), scenario.route);
}

#[test]
fn revalidation_catches_tampered_store() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    activate(&mut ledger, &scenario);

    let mut route = ledger.route(&uuid).unwrap();
    route.commits.push(Default::default());
    let mut store = ledger.into_store();
    KeyValueStore::put(
        &mut store,
        &format!("rt-{uuid}"),
        serde_json::to_vec(&route).unwrap(),
    )
    .unwrap();

    let mut ledger =
        DeliveryLedger::with_config(store, ManualClock::new(NOW), LedgerConfig::default())
            .unwrap();
    let commit = scenario.commit(0, TransportStep::SrcOutgoing, NOW);
    assert_matches!(
        ledger.commit_progress(&uuid, 0, TransportStep::SrcOutgoing, commit),
        Err(WaybillError::InvalidTopology(_))
    );
}

#[test]
fn missing_route_is_not_found() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::two_stop(NOW);
    let commit = scenario.commit(0, TransportStep::SrcOutgoing, NOW);
    assert_matches!(
        ledger.commit_progress("NOSUCHROUTE00000", 0, TransportStep::SrcOutgoing, commit),
        Err(WaybillError::NotFound { key }) if key == "rt-NOSUCHROUTE00000"
    );
    assert_matches!(
        ledger.sign_route_proposal("NOSUCHROUTE00000", "x", "y"),
        Err(WaybillError::NotFound { .. })
    );
}

/// Memory store whose next `failing_deletes` deletes report an error
#[derive(Default)]
struct DeleteFailingStore {
    inner: MemoryStore,
    failing_deletes: usize,
}

impl KeyValueStore for DeleteFailingStore {
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, StorageError> {
        self.inner.get(key)
    }

    fn put(&mut self, key: &str, value: Vec<u8>) -> Result<(), StorageError> {
        self.inner.put(key, value)
    }

    fn delete(&mut self, key: &str) -> Result<(), StorageError> {
        if self.failing_deletes > 0 {
            self.failing_deletes -= 1;
            return Err(StorageError::new("delete", key, "disk unavailable"));
        }
        self.inner.delete(key)
    }

    fn range_scan(&self, start: &str, end: &str) -> Result<RangeScan<'_>, StorageError> {
        self.inner.range_scan(start, end)
    }
}

#[test]
fn interrupted_submit_never_overwrites_progress() {
    init_test_tracing();
    let store = DeleteFailingStore {
        inner: MemoryStore::new(),
        failing_deletes: 1,
    };
    let mut ledger =
        DeliveryLedger::with_config(store, ManualClock::new(NOW), LedgerConfig::default())
            .unwrap();
    let scenario = DeliveryScenario::two_stop(NOW);
    let uuid = scenario.route.uuid.clone();
    ledger.create_route_proposal(scenario.route.clone()).unwrap();
    for (hash_id, signature) in scenario.route_signatures() {
        ledger.sign_route_proposal(&uuid, &hash_id, &signature).unwrap();
    }

    assert_matches!(
        ledger.submit_route_proposal(&uuid),
        Err(WaybillError::Storage { .. })
    );
    assert!(ledger.route_exists(&uuid).unwrap());
    assert!(ledger.route_proposal_exists(&uuid).unwrap());

    let outgoing = scenario.commit(0, TransportStep::SrcOutgoing, NOW);
    ledger
        .commit_progress(&uuid, 0, TransportStep::SrcOutgoing, outgoing)
        .unwrap();

    assert_matches!(
        ledger.submit_route_proposal(&uuid),
        Err(WaybillError::AlreadyExists { key }) if key == format!("rt-{uuid}")
    );
    assert_eq!(ledger.route_timeline(&uuid).unwrap().len(), 1);

    ledger.remove_route_proposal(&uuid).unwrap();
    assert!(!ledger.route_proposal_exists(&uuid).unwrap());
}

#[test]
fn longest_route_reads_back() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::with_stops(MAX_ROUTE_STOPS, NOW);
    let uuid = scenario.route.uuid.clone();
    ledger.create_route_proposal(scenario.route.clone()).unwrap();
    for (hash_id, signature) in scenario.route_signatures() {
        ledger.sign_route_proposal(&uuid, &hash_id, &signature).unwrap();
    }

    let proposals = ledger.get_all_data("rp").unwrap();
    assert_eq!(proposals.len(), 1);

    let route = ledger.submit_route_proposal(&uuid).unwrap();
    assert_eq!(route.commits.len(), MAX_ROUTE_STOPS - 1);
    assert_eq!(ledger.route(&uuid).unwrap(), scenario.route);
}

#[test]
fn overlong_route_is_rejected_up_front() {
    let (mut ledger, _) = ledger_at(NOW);
    let scenario = DeliveryScenario::with_stops(MAX_ROUTE_STOPS + 1, NOW);
    assert_matches!(
        ledger.create_route_proposal(scenario.route),
        Err(WaybillError::InvalidTopology(TopologyViolation::TooManyStops { max }))
            if max == MAX_ROUTE_STOPS
    );
    assert!(ledger.store().is_empty());
    assert!(ledger.get_all_data("rp").unwrap().is_empty());
}

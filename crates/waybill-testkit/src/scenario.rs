//! Ready-made delivery scenarios
//!
//! A linear chain of `n` addresses joined by `n - 1` couriers, moving one
//! good from the first stop to the last. Stops are an hour apart.

use crate::builders::RouteBuilder;
use crate::fixtures::{test_good, PartyFixture};
use crate::keys::KeyFixture;
use waybill_core::{Address, Commit, Courier, Good, Quantities, Route, TransportStep};

/// Gap between consecutive expected arrivals
pub const STOP_INTERVAL_MS: u64 = 60 * 60 * 1_000;

/// Quantity of the scenario good carried along the chain
pub const SCENARIO_QUANTITY: i64 = 12;

/// Uuid of scenario routes
pub const SCENARIO_ROUTE_UUID: &str = "ROUTE2024DELIVERY0001";

/// A route plus every party needed to sign and progress it
#[derive(Debug, Clone)]
pub struct DeliveryScenario {
    /// Stops in chain order
    pub addresses: Vec<PartyFixture<Address>>,
    /// Couriers in chain order, one per transport
    pub couriers: Vec<PartyFixture<Courier>>,
    /// The good carried
    pub good: Good,
    /// The route, with empty segments
    pub route: Route,
}

impl DeliveryScenario {
    /// Source, one courier, destination
    pub fn two_stop(start_ms: u64) -> Self {
        Self::with_stops(2, start_ms)
    }

    /// Linear chain with `stops` addresses
    ///
    /// Panics if `stops < 2`.
    pub fn with_stops(stops: usize, start_ms: u64) -> Self {
        assert!(stops >= 2, "a delivery needs at least two stops");
        let good = test_good("scenario-pallet");
        let addresses: Vec<_> = (0..stops)
            .map(|i| PartyFixture::address(100 + i as u64, &format!("Stop{i}")))
            .collect();
        let couriers: Vec<_> = (0..stops - 1)
            .map(|i| PartyFixture::courier(200 + i as u64, &format!("Driver{i}")))
            .collect();

        let mut builder = RouteBuilder::new(SCENARIO_ROUTE_UUID)
            .good(good.clone())
            .start(&addresses[0].record, start_ms)
            .output(&good.uuid, SCENARIO_QUANTITY);
        for (i, courier) in couriers.iter().enumerate() {
            let arrival = start_ms + STOP_INTERVAL_MS * (i as u64 + 1);
            builder = builder
                .leg(&courier.record, &addresses[i + 1].record, arrival)
                .input(&good.uuid, SCENARIO_QUANTITY);
            if i + 2 < stops {
                builder = builder.output(&good.uuid, SCENARIO_QUANTITY);
            }
        }

        Self {
            addresses,
            couriers,
            good,
            route: builder.build(),
        }
    }

    /// Every party's signature over the route, addresses first
    pub fn route_signatures(&self) -> Vec<(String, String)> {
        self.addresses
            .iter()
            .map(|p| (p.hash_id().to_string(), p.sign(&self.route)))
            .chain(
                self.couriers
                    .iter()
                    .map(|p| (p.hash_id().to_string(), p.sign(&self.route))),
            )
            .collect()
    }

    /// Public key of the party responsible for a (segment, step) slot
    pub fn signer_public_key(&self, segment: usize, step: TransportStep) -> &str {
        match step {
            TransportStep::SrcOutgoing => self.addresses[segment].keys.public_key(),
            TransportStep::CourierReceiving | TransportStep::CourierDelivering => {
                self.couriers[segment].keys.public_key()
            }
            TransportStep::DstIncoming => self.addresses[segment + 1].keys.public_key(),
        }
    }

    /// The scenario good moved in full
    pub fn full_delta(&self) -> Quantities {
        [(self.good.uuid.clone(), SCENARIO_QUANTITY)]
            .into_iter()
            .collect()
    }

    /// Commit for a slot, signed by the responsible party
    pub fn commit(&self, segment: usize, step: TransportStep, timestamp: u64) -> Commit {
        self.commit_with_delta(segment, step, self.full_delta(), timestamp)
    }

    /// Commit for a slot with a custom delta, signed by the responsible party
    pub fn commit_with_delta(
        &self,
        segment: usize,
        step: TransportStep,
        delta: Quantities,
        timestamp: u64,
    ) -> Commit {
        let info = format!("{step} on segment {segment}");
        match step {
            TransportStep::SrcOutgoing => self.addresses[segment].commit(delta, &info, timestamp),
            TransportStep::CourierReceiving | TransportStep::CourierDelivering => {
                self.couriers[segment].commit(delta, &info, timestamp)
            }
            TransportStep::DstIncoming => {
                self.addresses[segment + 1].commit(delta, &info, timestamp)
            }
        }
    }

    /// Commit for a slot signed by a key outside the route
    pub fn forged_commit(&self, segment: usize, step: TransportStep, timestamp: u64) -> Commit {
        let mut commit = self.commit(segment, step, timestamp);
        commit.signature = KeyFixture::from_label("impostor").sign(&commit.detail);
        commit
    }
}

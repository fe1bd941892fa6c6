//! Route builder
//!
//! Assembles the nested stop/transport chain from a flat list of legs and
//! fills in the party maps and one empty segment per transport.

use std::collections::BTreeMap;
use waybill_core::{Address, Courier, Good, Quantities, Route, Segment, Stop, Transport};

struct PendingStop {
    address: String,
    expected_arrival_timestamp: u64,
    input: Quantities,
    output: Quantities,
}

/// Builder for [`Route`] records
///
/// ```rust,no_run
/// # use waybill_testkit::{PartyFixture, RouteBuilder, test_good};
/// let depot = PartyFixture::address(1, "Depot");
/// let shop = PartyFixture::address(2, "Shop");
/// let driver = PartyFixture::courier(3, "Sam");
/// let crate_of_apples = test_good("apples");
///
/// let route = RouteBuilder::new("ROUTE00000000001")
///     .good(crate_of_apples.clone())
///     .start(&depot.record, 1_000)
///     .output(&crate_of_apples.uuid, 4)
///     .leg(&driver.record, &shop.record, 2_000)
///     .input(&crate_of_apples.uuid, 4)
///     .build();
/// assert_eq!(route.commits.len(), 1);
/// ```
#[derive(Default)]
pub struct RouteBuilder {
    uuid: String,
    goods: BTreeMap<String, Good>,
    addresses: BTreeMap<String, Address>,
    couriers: BTreeMap<String, Courier>,
    stops: Vec<PendingStop>,
    transports: Vec<(String, String)>,
}

impl RouteBuilder {
    /// Start a route with the given uuid
    pub fn new(uuid: impl Into<String>) -> Self {
        Self {
            uuid: uuid.into(),
            ..Self::default()
        }
    }

    /// Register a good
    pub fn good(mut self, good: Good) -> Self {
        self.goods.insert(good.uuid.clone(), good);
        self
    }

    /// Register an address without placing it on the chain
    pub fn address(mut self, address: &Address) -> Self {
        self.addresses
            .insert(address.hash_id.clone(), address.clone());
        self
    }

    /// Register a courier without placing it on the chain
    pub fn courier(mut self, courier: &Courier) -> Self {
        self.couriers
            .insert(courier.hash_id.clone(), courier.clone());
        self
    }

    /// Set the first stop
    pub fn start(self, address: &Address, expected_arrival_timestamp: u64) -> Self {
        let mut builder = self.address(address);
        builder.stops.push(PendingStop {
            address: address.hash_id.clone(),
            expected_arrival_timestamp,
            input: Quantities::new(),
            output: Quantities::new(),
        });
        builder
    }

    /// Append a transport and the stop it delivers to
    pub fn leg(self, courier: &Courier, destination: &Address, expected_arrival_timestamp: u64) -> Self {
        self.leg_with_info(courier, "", destination, expected_arrival_timestamp)
    }

    /// Append a transport with notes and the stop it delivers to
    pub fn leg_with_info(
        self,
        courier: &Courier,
        info: &str,
        destination: &Address,
        expected_arrival_timestamp: u64,
    ) -> Self {
        let mut builder = self.courier(courier).address(destination);
        builder
            .transports
            .push((courier.hash_id.clone(), info.to_string()));
        builder.stops.push(PendingStop {
            address: destination.hash_id.clone(),
            expected_arrival_timestamp,
            input: Quantities::new(),
            output: Quantities::new(),
        });
        builder
    }

    /// Expect goods to arrive at the most recently added stop
    pub fn input(mut self, good: &str, quantity: i64) -> Self {
        if let Some(stop) = self.stops.last_mut() {
            stop.input.insert(good.to_string(), quantity);
        }
        self
    }

    /// Expect goods to leave the most recently added stop
    pub fn output(mut self, good: &str, quantity: i64) -> Self {
        if let Some(stop) = self.stops.last_mut() {
            stop.output.insert(good.to_string(), quantity);
        }
        self
    }

    /// Assemble the route
    ///
    /// Panics if no stop was added.
    pub fn build(self) -> Route {
        let mut stops = self.stops.into_iter().rev();
        let last = stops.next().expect("route needs a first stop");
        let mut head = into_stop(last, None);

        for (pending, (courier, info)) in stops.zip(self.transports.into_iter().rev()) {
            let transport = Transport {
                courier,
                info,
                destination: head,
            };
            head = into_stop(pending, Some(Box::new(transport)));
        }

        let segments = head.transport_count();
        Route {
            uuid: self.uuid,
            goods: self.goods,
            addresses: self.addresses,
            couriers: self.couriers,
            source: head,
            commits: vec![Segment::default(); segments],
        }
    }
}

fn into_stop(pending: PendingStop, next: Option<Box<Transport>>) -> Stop {
    Stop {
        address: pending.address,
        expected_arrival_timestamp: pending.expected_arrival_timestamp,
        input: pending.input,
        output: pending.output,
        next,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::{test_good, PartyFixture};

    #[test]
    fn test_builds_three_stop_chain() {
        let a = PartyFixture::address(1, "A");
        let b = PartyFixture::address(2, "B");
        let c = PartyFixture::address(3, "C");
        let x = PartyFixture::courier(4, "X");
        let y = PartyFixture::courier(5, "Y");
        let good = test_good("boxes");

        let route = RouteBuilder::new("ROUTE00000000001")
            .good(good.clone())
            .start(&a.record, 10)
            .output(&good.uuid, 2)
            .leg(&x.record, &b.record, 20)
            .input(&good.uuid, 2)
            .output(&good.uuid, 2)
            .leg_with_info(&y.record, "fragile", &c.record, 30)
            .input(&good.uuid, 2)
            .build();

        let addresses: Vec<_> = route.source.walk().map(|s| s.address.clone()).collect();
        assert_eq!(addresses, [a.hash_id(), b.hash_id(), c.hash_id()]);
        assert_eq!(route.commits.len(), 2);
        assert_eq!(route.party_count(), 5);

        let second = route.source.next.as_ref().unwrap();
        assert_eq!(second.courier, x.hash_id());
        let third = second.destination.next.as_ref().unwrap();
        assert_eq!(third.info, "fragile");
        assert_eq!(third.destination.input.get(&good.uuid), Some(&2));
    }
}

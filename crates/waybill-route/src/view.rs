//! Read-only projection of a route into stops, transports and moments
//!
//! The view borrows the route and refers to neighbours by index rather than
//! by pointer. For segment `s` and step index `i` the moment lives at
//! `moments[4 * s + i]`; ledger ordering checks rely on that layout.
//!
//! Always rebuild the view from the authoritative route. It reflects one
//! snapshot and is never cached across operations.

use serde::Serialize;
use waybill_core::{
    Address, Commit, Courier, Entity, Good, Quantities, Result, Route, TopologyViolation,
    TransportStep,
};

/// Number of moments per transport edge
pub const STEPS_PER_SEGMENT: usize = TransportStep::ALL.len();

/// Index of a moment in the flat timeline
pub fn moment_index(segment: usize, step: TransportStep) -> usize {
    STEPS_PER_SEGMENT * segment + step.index()
}

/// A good and a quantity, resolved from a good-uuid map
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct GoodMoment<'a> {
    /// Resolved good record
    pub good: &'a Good,
    /// Signed quantity
    pub quantity: i64,
}

/// Where a stop sits in the chain
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StopPosition {
    /// No incoming transport
    First,
    /// Both incoming and outgoing transports
    Middle,
    /// No outgoing transport
    Last,
}

/// Projection of one stop
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StopView<'a> {
    /// Position in `RouteView::stops`
    pub index: usize,
    /// First, middle or last
    pub position: StopPosition,
    /// Resolved address record
    pub address: &'a Address,
    /// Expected arrival, Unix milliseconds
    pub expected_arrival_timestamp: u64,
    /// Goods expected to arrive
    pub expected_input: Vec<GoodMoment<'a>>,
    /// Goods expected to leave
    pub expected_output: Vec<GoodMoment<'a>>,
    /// Index of the transport arriving here
    pub previous_transport: Option<usize>,
    /// Index of the transport leaving here
    pub next_transport: Option<usize>,
}

impl StopView<'_> {
    /// Index of the stop before this one
    pub fn previous_stop(&self) -> Option<usize> {
        self.previous_transport.map(|_| self.index - 1)
    }

    /// Index of the stop after this one
    pub fn next_stop(&self) -> Option<usize> {
        self.next_transport.map(|_| self.index + 1)
    }
}

/// Projection of one transport edge and its segment
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TransportView<'a> {
    /// Position in `RouteView::transports`, equal to the segment index
    pub index: usize,
    /// Resolved courier record
    pub courier: &'a Courier,
    /// Free-text notes
    pub info: &'a str,
    /// Index of the source stop
    pub source: usize,
    /// Index of the destination stop
    pub destination: usize,
    /// Destination expected arrival minus source expected arrival
    pub expected_duration: u64,
    /// Delivery time from the srcOutgoing commit to the dstIncoming commit
    pub actual_duration: Option<u64>,
}

/// One (segment, step) slot of the timeline
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Moment<'a> {
    /// Segment (transport) index
    pub segment: usize,
    /// Step within the segment
    pub step: TransportStep,
    /// Stop whose expectations govern this moment
    pub stop: usize,
    /// Party responsible for committing this moment
    #[serde(skip)]
    pub entity: Entity<'a>,
    /// Expected goods movement
    pub expected_delta: Vec<GoodMoment<'a>>,
    /// Expected time, Unix milliseconds
    pub expected_timestamp: u64,
    /// Goods movement actually committed
    pub actual_delta: Option<Vec<GoodMoment<'a>>>,
    /// Underlying commit, once recorded
    pub commit: Option<&'a Commit>,
}

impl Moment<'_> {
    /// Time the moment was committed, if it has been
    pub fn actual_timestamp(&self) -> Option<u64> {
        self.commit.map(|commit| commit.detail.timestamp)
    }

    /// Whether a commit is recorded for this moment
    pub fn is_committed(&self) -> bool {
        self.commit.is_some()
    }

    /// Hash id of the responsible party
    pub fn entity_hash_id(&self) -> &str {
        self.entity.hash_id()
    }
}

/// Derived, read-only projection of a [`Route`]
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteView<'a> {
    #[serde(skip)]
    route: &'a Route,
    stops: Vec<StopView<'a>>,
    transports: Vec<TransportView<'a>>,
    moments: Vec<Moment<'a>>,
}

impl<'a> RouteView<'a> {
    /// Build the view from a route
    ///
    /// The route should already pass `validate_route`; any reference the view
    /// cannot resolve is reported as a topology violation rather than a panic.
    pub fn new(route: &'a Route) -> Result<Self> {
        let mut stops = Vec::new();
        let mut transports = Vec::new();

        for (index, stop) in route.source.walk().enumerate() {
            let address = route.addresses.get(&stop.address).ok_or_else(|| {
                TopologyViolation::UnknownAddress {
                    stop: index,
                    address: stop.address.clone(),
                }
            })?;

            let unknown_good = |good: String| TopologyViolation::UnknownGood { stop: index, good };
            let previous_transport = index.checked_sub(1);
            let next_transport = stop.next.as_ref().map(|_| index);
            let position = match (previous_transport, next_transport) {
                (None, _) => StopPosition::First,
                (Some(_), Some(_)) => StopPosition::Middle,
                (Some(_), None) => StopPosition::Last,
            };

            stops.push(StopView {
                index,
                position,
                address,
                expected_arrival_timestamp: stop.expected_arrival_timestamp,
                expected_input: resolve_goods(route, &stop.input, unknown_good)?,
                expected_output: resolve_goods(route, &stop.output, unknown_good)?,
                previous_transport,
                next_transport,
            });

            if let Some(transport) = stop.next.as_deref() {
                let courier = route.couriers.get(&transport.courier).ok_or_else(|| {
                    TopologyViolation::UnknownCourier {
                        stop: index,
                        courier: transport.courier.clone(),
                    }
                })?;
                transports.push(TransportView {
                    index,
                    courier,
                    info: &transport.info,
                    source: index,
                    destination: index + 1,
                    expected_duration: transport
                        .destination
                        .expected_arrival_timestamp
                        .saturating_sub(stop.expected_arrival_timestamp),
                    actual_duration: None,
                });
            }
        }

        if transports.is_empty() {
            return Err(TopologyViolation::MissingTransport.into());
        }
        if transports.len() != route.commits.len() {
            return Err(TopologyViolation::SegmentCountMismatch {
                transports: transports.len(),
                segments: route.commits.len(),
            }
            .into());
        }

        let mut moments = Vec::with_capacity(STEPS_PER_SEGMENT * transports.len());
        for (transport, segment) in transports.iter_mut().zip(&route.commits) {
            let source = &stops[transport.source];
            let destination = &stops[transport.destination];

            for step in TransportStep::ALL {
                let (stop, expected_delta) = match step {
                    TransportStep::SrcOutgoing | TransportStep::CourierReceiving => {
                        (source, &source.expected_output)
                    }
                    TransportStep::CourierDelivering | TransportStep::DstIncoming => {
                        (destination, &destination.expected_input)
                    }
                };
                let entity = if step.is_courier_step() {
                    Entity::Courier(transport.courier)
                } else {
                    Entity::Address(stop.address)
                };
                let commit = segment.get(step);
                let actual_delta = commit
                    .map(|commit| {
                        resolve_goods(route, &commit.detail.delta, |good: String| {
                            TopologyViolation::UnknownCommitGood {
                                segment: transport.index,
                                step,
                                good,
                            }
                        })
                    })
                    .transpose()?;

                moments.push(Moment {
                    segment: transport.index,
                    step,
                    stop: stop.index,
                    entity,
                    expected_delta: expected_delta.clone(),
                    expected_timestamp: stop.expected_arrival_timestamp,
                    actual_delta,
                    commit,
                });
            }

            let outgoing = segment.get(TransportStep::SrcOutgoing);
            let incoming = segment.get(TransportStep::DstIncoming);
            transport.actual_duration = match (outgoing, incoming) {
                (Some(start), Some(end)) => {
                    end.detail.timestamp.checked_sub(start.detail.timestamp)
                }
                _ => None,
            };
        }

        Ok(Self {
            route,
            stops,
            transports,
            moments,
        })
    }

    /// Uuid of the underlying route
    pub fn uuid(&self) -> &'a str {
        &self.route.uuid
    }

    /// The route this view projects
    pub fn route(&self) -> &'a Route {
        self.route
    }

    /// Stops in chain order
    pub fn stops(&self) -> &[StopView<'a>] {
        &self.stops
    }

    /// Transports in chain order
    pub fn transports(&self) -> &[TransportView<'a>] {
        &self.transports
    }

    /// Flat timeline, four moments per segment
    pub fn moments(&self) -> &[Moment<'a>] {
        &self.moments
    }

    /// Moment for a (segment, step) slot
    pub fn moment(&self, segment: usize, step: TransportStep) -> Option<&Moment<'a>> {
        self.moments.get(moment_index(segment, step))
    }

    /// The moment immediately before a slot in the timeline
    pub fn previous_moment(&self, segment: usize, step: TransportStep) -> Option<&Moment<'a>> {
        moment_index(segment, step)
            .checked_sub(1)
            .and_then(|index| self.moments.get(index))
    }

    /// The four moments of one transport, in step order
    pub fn transport_moments(&self, transport: usize) -> &[Moment<'a>] {
        let start = (STEPS_PER_SEGMENT * transport).min(self.moments.len());
        let end = (start + STEPS_PER_SEGMENT).min(self.moments.len());
        &self.moments[start..end]
    }

    /// Moments that touch a stop: its incoming pair, then its outgoing pair
    pub fn stop_moments(&self, stop: usize) -> impl Iterator<Item = &Moment<'a>> + '_ {
        self.moments.iter().filter(move |moment| moment.stop == stop)
    }

    /// First moment in timeline order that has not been committed
    pub fn next_pending(&self) -> Option<&Moment<'a>> {
        self.moments.iter().find(|moment| !moment.is_committed())
    }

    /// Whether every moment of every segment is committed
    pub fn is_complete(&self) -> bool {
        self.moments.iter().all(Moment::is_committed)
    }
}

fn resolve_goods<'a>(
    route: &'a Route,
    quantities: &Quantities,
    unknown: impl Fn(String) -> TopologyViolation,
) -> Result<Vec<GoodMoment<'a>>> {
    quantities
        .iter()
        .map(|(uuid, quantity)| -> Result<GoodMoment<'a>> {
            let good = route
                .goods
                .get(uuid)
                .ok_or_else(|| unknown(uuid.clone()))?;
            Ok(GoodMoment {
                good,
                quantity: *quantity,
            })
        })
        .collect()
}

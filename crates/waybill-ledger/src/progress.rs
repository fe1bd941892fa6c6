//! Commit progress on active routes
//!
//! Commits fill the timeline strictly in order: a slot can only be set once
//! the moment before it is committed, and never with an earlier timestamp.
//! The moment before `(s, i)` is `moments[4s + i - 1]`, so ordering carries
//! across segment boundaries. The very first moment has no predecessor and is
//! bounded only by the freshness window.

use crate::keys::RecordKind;
use crate::ledger::{rejected, DeliveryLedger};
use waybill_core::crypto::verify_object;
use waybill_core::{
    Clock, Commit, KeyValueStore, OrderingViolation, RangeViolation, Result, Route,
    TopologyViolation, TransportStep, WaybillError,
};
use waybill_route::{validate_route, RouteView};

impl<S: KeyValueStore, C: Clock> DeliveryLedger<S, C> {
    /// Record one hand-off on an active route
    ///
    /// Checks run in order: route exists, segment index in range, delta goods
    /// known, slot empty, predecessor committed and not later, timestamp
    /// fresh, signature from the responsible party. Returns the updated route.
    pub fn commit_progress(
        &mut self,
        uuid: &str,
        segment_index: usize,
        step: TransportStep,
        commit: Commit,
    ) -> Result<Route> {
        const OP: &str = "commit_progress";
        let key = RecordKind::Route.key(uuid);
        let mut route: Route = self.load_required(&key)?;

        if self.config.revalidate_routes {
            validate_route(&route).map_err(|e| rejected(OP, uuid, e))?;
        }

        if segment_index >= route.commits.len() {
            let violation = RangeViolation::SegmentIndex {
                index: segment_index,
                len: route.commits.len(),
            };
            return Err(rejected(OP, uuid, violation.into()));
        }

        if let Some(good) = commit
            .detail
            .delta
            .keys()
            .find(|good| !route.goods.contains_key(*good))
        {
            let violation = TopologyViolation::UnknownCommitGood {
                segment: segment_index,
                step,
                good: good.clone(),
            };
            return Err(rejected(OP, uuid, violation.into()));
        }

        let timestamp = commit.detail.timestamp;
        let entity = {
            let view = RouteView::new(&route).map_err(|e| rejected(OP, uuid, e))?;
            let current = view.moment(segment_index, step).ok_or_else(|| {
                rejected(
                    OP,
                    uuid,
                    RangeViolation::SegmentIndex {
                        index: segment_index,
                        len: view.transports().len(),
                    }
                    .into(),
                )
            })?;

            if current.is_committed() {
                return Err(rejected(
                    OP,
                    uuid,
                    WaybillError::AlreadyCommitted {
                        uuid: uuid.to_string(),
                        segment: segment_index,
                        step,
                    },
                ));
            }

            if let Some(previous) = view.previous_moment(segment_index, step) {
                match previous.actual_timestamp() {
                    None => {
                        let violation = OrderingViolation::PredecessorUncommitted {
                            segment: previous.segment,
                            step: previous.step,
                        };
                        return Err(rejected(OP, uuid, violation.into()));
                    }
                    Some(before) if before > timestamp => {
                        let violation = OrderingViolation::BeforePredecessor {
                            timestamp,
                            previous: before,
                        };
                        return Err(rejected(OP, uuid, violation.into()));
                    }
                    Some(_) => {}
                }
            }

            let now = self.clock.now_ms();
            let window_ms = self.config.freshness_window_ms;
            if now.abs_diff(timestamp) > window_ms {
                let violation = OrderingViolation::Stale {
                    timestamp,
                    now,
                    window_ms,
                };
                return Err(rejected(OP, uuid, violation.into()));
            }

            if !verify_object(&commit.detail, &commit.signature, current.entity.public_key()) {
                let hash_id = current.entity_hash_id();
                return Err(rejected(OP, uuid, WaybillError::invalid_signature(hash_id)));
            }

            current.entity_hash_id().to_string()
        };

        *route.commits[segment_index].slot_mut(step) = Some(commit);
        self.save(&key, &route)?;
        tracing::info!(
            uuid,
            segment = segment_index,
            step = %step,
            hash_id = %entity,
            timestamp,
            "progress committed"
        );
        Ok(route)
    }

    /// [`Self::commit_progress`] with the step given by its wire name
    pub fn commit_progress_named(
        &mut self,
        uuid: &str,
        segment_index: usize,
        step: &str,
        commit: Commit,
    ) -> Result<Route> {
        let step: TransportStep = step
            .parse()
            .map_err(|e| rejected("commit_progress", uuid, e))?;
        self.commit_progress(uuid, segment_index, step, commit)
    }

    /// Commits of an active route in protocol order, skipping empty slots
    pub fn route_timeline(&self, uuid: &str) -> Result<Vec<Commit>> {
        let route = self.route(uuid)?;
        tracing::debug!(uuid, "route_timeline");
        Ok(route.commit_timeline().into_iter().cloned().collect())
    }
}

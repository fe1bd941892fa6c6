//! Route proposals: creation, consent collection and activation
//!
//! A proposal accumulates one signature per address and courier named by its
//! route. Only full consent activates it; there is no threshold.

use crate::keys::RecordKind;
use crate::ledger::{rejected, DeliveryLedger};
use waybill_core::crypto::verify_object;
use waybill_core::{
    Clock, KeyValueStore, Result, Route, RouteProposal, TransportStep, WaybillError,
};
use waybill_route::validate_route;

impl<S: KeyValueStore, C: Clock> DeliveryLedger<S, C> {
    /// Propose a route, replacing any pending proposal with the same uuid
    ///
    /// Re-proposing discards every signature collected so far. A uuid that
    /// already names an active route cannot be proposed again.
    pub fn create_route_proposal(&mut self, route: Route) -> Result<RouteProposal> {
        const OP: &str = "create_route_proposal";
        validate_route(&route).map_err(|e| rejected(OP, &route.uuid, e))?;

        if let Some((segment, step)) = first_committed_slot(&route) {
            return Err(rejected(
                OP,
                &route.uuid,
                WaybillError::AlreadyCommitted {
                    uuid: route.uuid.clone(),
                    segment,
                    step,
                },
            ));
        }

        let active = RecordKind::Route.key(&route.uuid);
        if self.route_exists(&route.uuid)? {
            return Err(rejected(OP, &route.uuid, WaybillError::already_exists(active)));
        }

        let proposal = RouteProposal::new(route);
        self.save(&RecordKind::RouteProposal.key(&proposal.route.uuid), &proposal)?;
        tracing::info!(
            uuid = %proposal.route.uuid,
            parties = proposal.route.party_count(),
            segments = proposal.route.commits.len(),
            "route proposal created"
        );
        Ok(proposal)
    }

    /// Withdraw a pending proposal
    pub fn remove_route_proposal(&mut self, uuid: &str) -> Result<()> {
        self.delete_existing(&RecordKind::RouteProposal.key(uuid))?;
        tracing::info!(uuid, "route proposal removed");
        Ok(())
    }

    /// Record one party's consent
    ///
    /// `signature` must verify over the canonical route with the public key
    /// of the address or courier named by `entity_hash_id`.
    pub fn sign_route_proposal(
        &mut self,
        uuid: &str,
        entity_hash_id: &str,
        signature: &str,
    ) -> Result<RouteProposal> {
        const OP: &str = "sign_route_proposal";
        let key = RecordKind::RouteProposal.key(uuid);
        let mut proposal: RouteProposal = self.load_required(&key)?;

        let Some(entity) = proposal.route.entity(entity_hash_id) else {
            return Err(rejected(OP, uuid, WaybillError::not_found(entity_hash_id)));
        };

        if proposal.signatures.contains_key(entity_hash_id) {
            return Err(rejected(
                OP,
                uuid,
                WaybillError::AlreadySigned {
                    uuid: uuid.to_string(),
                    entity: entity_hash_id.to_string(),
                },
            ));
        }

        if !verify_object(&proposal.route, signature, entity.public_key()) {
            return Err(rejected(OP, uuid, WaybillError::invalid_signature(entity_hash_id)));
        }

        proposal
            .signatures
            .insert(entity_hash_id.to_string(), signature.to_string());
        self.save(&key, &proposal)?;
        tracing::info!(
            uuid,
            hash_id = entity_hash_id,
            signed = proposal.signatures.len(),
            required = proposal.route.party_count(),
            "route proposal signed"
        );
        Ok(proposal)
    }

    /// Activate a fully signed proposal
    ///
    /// The proposal is deleted and its bare route stored as the active route
    /// under the same uuid. An existing active route is never replaced.
    pub fn submit_route_proposal(&mut self, uuid: &str) -> Result<Route> {
        const OP: &str = "submit_route_proposal";
        let key = RecordKind::RouteProposal.key(uuid);
        let proposal: RouteProposal = self.load_required(&key)?;

        let active = RecordKind::Route.key(uuid);
        if self.route_exists(uuid)? {
            return Err(rejected(OP, uuid, WaybillError::already_exists(active)));
        }

        if !proposal.is_fully_signed() {
            return Err(rejected(
                OP,
                uuid,
                WaybillError::QuorumNotMet {
                    uuid: uuid.to_string(),
                    signed: proposal.signatures.len(),
                    required: proposal.route.party_count(),
                },
            ));
        }

        if self.config.revalidate_routes {
            validate_route(&proposal.route).map_err(|e| rejected(OP, uuid, e))?;
        }

        let route = proposal.route;
        self.save(&active, &route)?;
        self.store.delete(&key)?;
        tracing::info!(uuid, segments = route.commits.len(), "route activated");
        Ok(route)
    }
}

fn first_committed_slot(route: &Route) -> Option<(usize, TransportStep)> {
    route.commits.iter().enumerate().find_map(|(segment, slots)| {
        TransportStep::ALL
            .into_iter()
            .find(|step| slots.get(*step).is_some())
            .map(|step| (segment, step))
    })
}

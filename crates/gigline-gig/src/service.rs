//! Gig operations against live collaborators.
//!
//! [`GigService`] reads the gig, gathers what the transition rules need from
//! the trust directory and the deputy store, runs the pure rules in
//! [`crate::machine`], then writes the result with a revision check.

use gigline_deputy::{eligible_deputies, DeputyStore};
use gigline_trust::TrustDirectory;
use gigline_types::{
    Availability, DeputyRelationship, Feature, Gig, GigId, Role, UserId,
};
use tracing::{debug, info, warn};

use crate::machine::{self, Applied, AvailabilityChange, Transition, TransitionContext, TransitionRequest};
use crate::store::GigStore;
use crate::{GigError, Result};

/// A transition's effect.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TransitionOutcome {
    pub gig: Gig,
    /// False when the request repeated the last recorded action.
    pub applied: bool,
}

pub struct GigService<'a, G, D, T> {
    gigs: &'a G,
    deputies: &'a D,
    trust: &'a T,
}

impl<'a, G: GigStore, D: DeputyStore, T: TrustDirectory> GigService<'a, G, D, T> {
    pub fn new(gigs: &'a G, deputies: &'a D, trust: &'a T) -> Self {
        Self {
            gigs,
            deputies,
            trust,
        }
    }

    pub fn get_gig(&self, gig_id: &GigId) -> Result<Gig> {
        self.gigs
            .get(gig_id)?
            .ok_or_else(|| GigError::NotFound(format!("gig {gig_id}")))
    }

    pub fn gigs_for(&self, user_id: &UserId) -> Result<Vec<Gig>> {
        Ok(self.gigs.list_for_user(user_id)?)
    }

    /// Invite `musician_id` to a new `pending` gig on behalf of a client or
    /// booker. No history is recorded until the first transition.
    ///
    /// # Errors
    ///
    /// - [`GigError::InvalidTarget`] if the client invites themselves or the
    ///   invitee is not a musician
    /// - [`GigError::Forbidden`] if the creator is neither client nor booker
    /// - [`GigError::NotFound`] if either user is unknown
    pub fn create_gig(
        &self,
        gig_id: GigId,
        client_id: &UserId,
        musician_id: &UserId,
        now: u64,
    ) -> Result<Gig> {
        if client_id == musician_id {
            return Err(GigError::InvalidTarget(
                "a gig needs two different parties".into(),
            ));
        }

        let client = self
            .trust
            .lookup(client_id)?
            .ok_or_else(|| GigError::NotFound(format!("user {client_id}")))?;
        if !(client.roles.contains(Role::Client) || client.roles.contains(Role::Booker)) {
            return Err(GigError::Forbidden(format!(
                "{client_id} cannot book musicians"
            )));
        }

        let musician = self
            .trust
            .lookup(musician_id)?
            .ok_or_else(|| GigError::NotFound(format!("user {musician_id}")))?;
        if !musician.roles.contains(Role::Musician) {
            return Err(GigError::InvalidTarget(format!(
                "{musician_id} is not a musician"
            )));
        }

        let gig = Gig::new(gig_id, client_id.clone(), musician_id.clone(), now);
        self.gigs.insert(&gig)?;

        info!(gig_id = %gig.id, client = %client_id, musician = %musician_id, "gig created");
        Ok(gig)
    }

    /// Bookable deputies of the gig's current musician.
    pub fn eligible_deputies(&self, gig_id: &GigId) -> Result<Vec<DeputyRelationship>> {
        let gig = self.get_gig(gig_id)?;
        Ok(eligible_deputies(self.deputies, &gig.invited_musician_id)?)
    }

    fn context_for(&self, gig: &Gig, transition: &Transition) -> Result<TransitionContext> {
        let mut context = TransitionContext::default();

        let musician_after = match transition {
            Transition::AcceptDeputy { deputy_id } => deputy_id,
            _ => &gig.invited_musician_id,
        };
        context.musician_name = self
            .trust
            .lookup(musician_after)?
            .and_then(|u| u.display_name);

        match transition {
            Transition::SuggestDeputy { .. } => {
                context.may_delegate = self
                    .trust
                    .lookup(&gig.invited_musician_id)?
                    .is_some_and(|u| u.gate().can_access(Feature::BeDual));
                context.eligible_deputies =
                    eligible_deputies(self.deputies, &gig.invited_musician_id)?;
            }
            Transition::AcceptDeputy { .. } => {
                context.eligible_deputies =
                    eligible_deputies(self.deputies, &gig.invited_musician_id)?;
            }
            _ => {}
        }
        Ok(context)
    }

    /// Apply a status transition.
    ///
    /// # Errors
    ///
    /// Everything [`machine::apply`] reports, plus [`GigError::NotFound`] for
    /// an unknown gig and a `conflict` store error if another writer got
    /// there first.
    pub fn transition(&self, gig_id: &GigId, request: &TransitionRequest) -> Result<TransitionOutcome> {
        let gig = self.get_gig(gig_id)?;
        let context = self.context_for(&gig, &request.transition)?;

        match machine::apply(&gig, request, &context)? {
            Applied::Unchanged => {
                debug!(gig_id = %gig.id, action = request.transition.name(), "transition already applied");
                Ok(TransitionOutcome {
                    gig,
                    applied: false,
                })
            }
            Applied::Changed(next) => {
                self.gigs.update(&next, gig.revision)?;
                info!(
                    gig_id = %next.id,
                    action = request.transition.name(),
                    from = %gig.status,
                    to = %next.status,
                    actor = %request.actor,
                    "gig status changed"
                );
                Ok(TransitionOutcome {
                    gig: next,
                    applied: true,
                })
            }
        }
    }

    /// Record the invited musician's availability, declining automatically
    /// when they become unavailable with no bookable deputies.
    pub fn update_gig_availability(
        &self,
        gig_id: &GigId,
        actor: &UserId,
        availability: Availability,
        now: u64,
    ) -> Result<AvailabilityChange> {
        let gig = self.get_gig(gig_id)?;
        let has_deputies = availability == Availability::NotAvailable
            && !eligible_deputies(self.deputies, &gig.invited_musician_id)?.is_empty();

        let change = machine::update_availability(&gig, actor, availability, has_deputies, now)?;
        if !change.changed {
            return Ok(change);
        }

        self.gigs.update(&change.gig, gig.revision)?;
        if change.auto_declined {
            warn!(
                gig_id = %gig.id,
                musician = %gig.invited_musician_id,
                "gig declined automatically, musician unavailable without deputies"
            );
        } else {
            info!(gig_id = %gig.id, availability = availability.as_str(), "availability updated");
        }
        Ok(change)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::InMemoryGigStore;
    use gigline_deputy::{DeputyManager, DeputyRequest, InMemoryDeputyStore};
    use gigline_trust::UserTrust;
    use gigline_types::{
        ActionBy, DeputySettings, DeputyStatus, ErrorKind, GigStatus, RoleSet,
    };
    use std::collections::HashMap;

    const NOW: u64 = 1_700_000_000;

    struct Fixture {
        gigs: InMemoryGigStore,
        deputies: InMemoryDeputyStore,
        trust: HashMap<UserId, UserTrust>,
    }

    impl Fixture {
        /// Musician `mus` at 4.0 stars, deputy `dep` at 3.0, client `client`.
        fn new() -> Self {
            let users = [
                UserTrust::with_score("mus".into(), RoleSet::single(Role::Musician), 80),
                UserTrust::with_score("dep".into(), RoleSet::single(Role::Musician), 60),
                UserTrust::with_score("client".into(), RoleSet::single(Role::Client), 40),
            ];
            Self {
                gigs: InMemoryGigStore::new(),
                deputies: InMemoryDeputyStore::new(),
                trust: users.into_iter().map(|u| (u.user_id.clone(), u)).collect(),
            }
        }

        fn service(&self) -> GigService<'_, InMemoryGigStore, InMemoryDeputyStore, HashMap<UserId, UserTrust>> {
            GigService::new(&self.gigs, &self.deputies, &self.trust)
        }

        fn with_bookable_deputy(self) -> Self {
            let manager = DeputyManager::new(&self.deputies, &self.trust);
            manager
                .send_deputy_request(
                    DeputyRequest {
                        principal_id: "mus".into(),
                        deputy_id: "dep".into(),
                        for_skill: "keys".into(),
                        gig_type: None,
                        note: None,
                    },
                    NOW,
                )
                .expect("send");
            manager
                .respond_to_deputy_request(&"dep".into(), &"dep".into(), &"mus".into(), DeputyStatus::Accepted, NOW)
                .expect("accept");
            manager
                .update_deputy_settings(
                    &"mus".into(),
                    &"mus".into(),
                    &"dep".into(),
                    DeputySettings {
                        can_be_booked: Some(true),
                        ..Default::default()
                    },
                )
                .expect("bookable");
            self
        }

        fn gig(&self) -> Gig {
            self.service()
                .create_gig("g1".into(), &"client".into(), &"mus".into(), NOW)
                .expect("create")
        }
    }

    fn request(transition: Transition, actor: &str, expected: GigStatus) -> TransitionRequest {
        TransitionRequest {
            transition,
            actor: actor.into(),
            expected_status: expected,
            notes: None,
            timestamp: NOW + 60,
        }
    }

    #[test]
    fn test_create_gig_checks_parties() {
        let fx = Fixture::new();
        let service = fx.service();
        let gig = fx.gig();
        assert_eq!(gig.status, GigStatus::Pending);
        assert!(gig.booking_history.is_empty());

        let err = service
            .create_gig("g2".into(), &"mus".into(), &"dep".into(), NOW)
            .expect_err("musician-only user cannot book");
        assert_eq!(err.kind(), ErrorKind::Forbidden);

        let err = service
            .create_gig("g2".into(), &"client".into(), &"client".into(), NOW)
            .expect_err("self");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let err = service
            .create_gig("g1".into(), &"client".into(), &"mus".into(), NOW)
            .expect_err("duplicate id");
        assert_eq!(err.kind(), ErrorKind::Conflict);
    }

    #[test]
    fn test_accept_and_idempotent_retry() {
        let fx = Fixture::new();
        let service = fx.service();
        fx.gig();

        let req = request(Transition::Accept, "mus", GigStatus::Pending);
        let first = service.transition(&"g1".into(), &req).expect("accept");
        assert!(first.applied);
        let second = service.transition(&"g1".into(), &req).expect("retry");
        assert!(!second.applied);

        let stored = service.get_gig(&"g1".into()).expect("get");
        assert_eq!(stored.booking_history.len(), 1);
        assert_eq!(stored.booking_history[0].action_by, ActionBy::Musician);
        assert_eq!(stored.revision, 1);
    }

    #[test]
    fn test_deputy_substitution() {
        let fx = Fixture::new().with_bookable_deputy();
        let service = fx.service();
        fx.gig();

        assert_eq!(service.eligible_deputies(&"g1".into()).expect("eligible").len(), 1);

        service
            .transition(
                &"g1".into(),
                &request(
                    Transition::SuggestDeputy { deputy_id: Some("dep".into()) },
                    "mus",
                    GigStatus::Pending,
                ),
            )
            .expect("suggest");
        let outcome = service
            .transition(
                &"g1".into(),
                &request(
                    Transition::AcceptDeputy { deputy_id: "dep".into() },
                    "client",
                    GigStatus::DeputySuggested,
                ),
            )
            .expect("accept deputy");

        let gig = outcome.gig;
        assert_eq!(gig.status, GigStatus::Accepted);
        assert_eq!(gig.invited_musician_id, UserId::from("dep"));
        assert_eq!(gig.original_musician_id, Some(UserId::from("mus")));
        assert_eq!(gig.booking_history.len(), 2);
        assert_eq!(service.get_gig(&"g1".into()).expect("get"), gig);
    }

    #[test]
    fn test_removed_deputy_cannot_be_booked() {
        let fx = Fixture::new().with_bookable_deputy();
        let service = fx.service();
        fx.gig();
        service
            .transition(
                &"g1".into(),
                &request(
                    Transition::SuggestDeputy { deputy_id: Some("dep".into()) },
                    "mus",
                    GigStatus::Pending,
                ),
            )
            .expect("suggest");

        DeputyManager::new(&fx.deputies, &fx.trust)
            .remove_deputy(&"mus".into(), &"mus".into(), &"dep".into())
            .expect("remove");

        let err = service
            .transition(
                &"g1".into(),
                &request(
                    Transition::AcceptDeputy { deputy_id: "dep".into() },
                    "client",
                    GigStatus::DeputySuggested,
                ),
            )
            .expect_err("removed deputy");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let stored = service.get_gig(&"g1".into()).expect("get");
        assert_eq!(stored.status, GigStatus::DeputySuggested);
        assert_eq!(stored.invited_musician_id, UserId::from("mus"));
        assert_eq!(stored.booking_history.len(), 1);
    }

    #[test]
    fn test_suggest_without_bookable_deputy() {
        let fx = Fixture::new();
        let service = fx.service();
        fx.gig();
        let err = service
            .transition(
                &"g1".into(),
                &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
            )
            .expect_err("no deputies");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);
        assert!(service.get_gig(&"g1".into()).expect("get").booking_history.is_empty());
    }

    #[test]
    fn test_auto_decline_persisted() {
        let fx = Fixture::new();
        let service = fx.service();
        fx.gig();

        let change = service
            .update_gig_availability(&"g1".into(), &"mus".into(), Availability::NotAvailable, NOW)
            .expect("unavailable");
        assert!(change.auto_declined);

        let stored = service.get_gig(&"g1".into()).expect("get");
        assert_eq!(stored.status, GigStatus::Declined);
        assert_eq!(stored.booking_history[0].action_by, ActionBy::System);
    }

    #[test]
    fn test_unavailable_with_deputy_keeps_pending() {
        let fx = Fixture::new().with_bookable_deputy();
        let service = fx.service();
        fx.gig();

        let change = service
            .update_gig_availability(&"g1".into(), &"mus".into(), Availability::NotAvailable, NOW)
            .expect("unavailable");
        assert!(!change.auto_declined);
        assert_eq!(service.get_gig(&"g1".into()).expect("get").status, GigStatus::Pending);
    }

    #[test]
    fn test_unknown_gig() {
        let fx = Fixture::new();
        let err = fx
            .service()
            .transition(&"nope".into(), &request(Transition::Accept, "mus", GigStatus::Pending))
            .expect_err("missing");
        assert_eq!(err.kind(), ErrorKind::NotFound);
    }
}

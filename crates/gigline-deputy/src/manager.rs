//! Trust-gated deputy delegation.
//!
//! Two different principal floors exist and both are kept on purpose:
//!
//! - [`check_deputy_eligibility`] is the lenient pre-flight hint shown in the
//!   UI (principal and deputy both at 2.0 stars).
//! - [`DeputyManager::send_deputy_request`] is the authoritative path: the
//!   principal needs the `canBeDual` feature AND 4.0 stars.

use gigline_trust::{TrustDirectory, UserTrust};
use gigline_types::thresholds::{
    ADD_DEPUTY_MIN_STARS, BE_DEPUTY_MIN_STARS, BOOKABLE_MIN_STARS, PRINCIPAL_HINT_MIN_STARS,
};
use gigline_types::{
    DeputyRelationship, DeputySettings, DeputyStatus, Feature, StoreError, UserId,
};
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::store::{DeputyStore, Insertion};
use crate::{DeputyError, Result};

/// Parameters of a new deputy request.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeputyRequest {
    pub principal_id: UserId,
    pub deputy_id: UserId,
    pub for_skill: String,
    #[serde(default)]
    pub gig_type: Option<String>,
    #[serde(default)]
    pub note: Option<String>,
}

/// Why the pre-flight check failed.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IneligibleReason {
    SelfReference,
    DeputyTrustTooLow,
    PrincipalTrustTooLow,
    SkillMismatch,
}

/// Outcome of [`check_deputy_eligibility`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeputyEligibility {
    pub eligible: bool,
    pub reason: Option<IneligibleReason>,
}

impl DeputyEligibility {
    fn ok() -> Self {
        Self {
            eligible: true,
            reason: None,
        }
    }

    fn denied(reason: IneligibleReason) -> Self {
        Self {
            eligible: false,
            reason: Some(reason),
        }
    }
}

/// A relationship after a write, and whether this call changed it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct DeputyOutcome {
    pub relationship: DeputyRelationship,
    pub changed: bool,
}

impl DeputyOutcome {
    fn changed(relationship: DeputyRelationship) -> Self {
        Self {
            relationship,
            changed: true,
        }
    }

    fn unchanged(relationship: DeputyRelationship) -> Self {
        Self {
            relationship,
            changed: false,
        }
    }
}

/// A response to a request that is no longer pending.
fn already_answered(current: DeputyRelationship, status: DeputyStatus) -> Result<DeputyOutcome> {
    if current.status == status {
        return Ok(DeputyOutcome::unchanged(current));
    }
    Err(DeputyError::InvalidTransition(format!(
        "request already {}",
        current.status.as_str()
    )))
}

/// Pre-flight hint: could `principal` add `deputy` to cover `skill`?
///
/// This is deliberately looser than [`DeputyManager::send_deputy_request`]
/// and must not be used to authorize anything.
pub fn check_deputy_eligibility(
    deputy: &UserTrust,
    principal: &UserTrust,
    skill: &str,
) -> DeputyEligibility {
    if deputy.user_id == principal.user_id {
        return DeputyEligibility::denied(IneligibleReason::SelfReference);
    }
    if deputy.stars() < BE_DEPUTY_MIN_STARS {
        return DeputyEligibility::denied(IneligibleReason::DeputyTrustTooLow);
    }
    if principal.stars() < PRINCIPAL_HINT_MIN_STARS {
        return DeputyEligibility::denied(IneligibleReason::PrincipalTrustTooLow);
    }
    if !deputy.has_skill(skill) {
        return DeputyEligibility::denied(IneligibleReason::SkillMismatch);
    }
    DeputyEligibility::ok()
}

/// Executes deputy lifecycle operations against a store.
pub struct DeputyManager<'a, S, T> {
    store: &'a S,
    trust: &'a T,
}

impl<'a, S: DeputyStore, T: TrustDirectory> DeputyManager<'a, S, T> {
    pub fn new(store: &'a S, trust: &'a T) -> Self {
        Self { store, trust }
    }

    fn lookup(&self, user_id: &UserId) -> Result<UserTrust> {
        self.trust
            .lookup(user_id)?
            .ok_or_else(|| DeputyError::NotFound(format!("user {user_id}")))
    }

    fn relationship(&self, principal_id: &UserId, deputy_id: &UserId) -> Result<DeputyRelationship> {
        self.store.get(principal_id, deputy_id)?.ok_or_else(|| {
            DeputyError::NotFound(format!("deputy relationship {principal_id} -> {deputy_id}"))
        })
    }

    /// Ask `deputy_id` to become a deputy of `principal_id`.
    ///
    /// A request for a pair that already has a relationship returns that
    /// relationship with `changed == false`.
    ///
    /// # Errors
    ///
    /// - [`DeputyError::InvalidTarget`] for a self-request or a cycle
    /// - [`DeputyError::Forbidden`] unless the principal has `canBeDual` and 4.0 stars
    /// - [`DeputyError::InsufficientTrust`] if the deputy is below 2.0 stars
    /// - [`DeputyError::NotFound`] if either user is unknown
    pub fn send_deputy_request(
        &self,
        request: DeputyRequest,
        now: u64,
    ) -> Result<DeputyOutcome> {
        if request.principal_id == request.deputy_id {
            return Err(DeputyError::InvalidTarget(
                "a user cannot be their own deputy".into(),
            ));
        }

        let principal = self.lookup(&request.principal_id)?;
        if !principal.gate().can_access(Feature::BeDual) {
            debug!(principal = %principal.user_id, score = principal.score(), "deputy request gated");
            return Err(DeputyError::Forbidden(format!(
                "{} is not available at trust score {}",
                Feature::BeDual,
                principal.score()
            )));
        }
        if principal.stars() < ADD_DEPUTY_MIN_STARS {
            debug!(principal = %principal.user_id, stars = %principal.stars(), "deputy request gated");
            return Err(DeputyError::Forbidden(format!(
                "adding deputies requires {ADD_DEPUTY_MIN_STARS} stars, have {}",
                principal.stars()
            )));
        }

        let deputy = self.lookup(&request.deputy_id)?;
        if deputy.stars() < BE_DEPUTY_MIN_STARS {
            return Err(DeputyError::InsufficientTrust {
                required: BE_DEPUTY_MIN_STARS,
                actual: deputy.stars(),
            });
        }

        let mut relationship = DeputyRelationship::pending(
            request.principal_id,
            request.deputy_id,
            request.for_skill,
            now,
        );
        relationship.gig_type = request.gig_type;
        relationship.note = request.note;

        match self.store.insert_if_acyclic(relationship.clone())? {
            Insertion::Created(stored) => {
                info!(
                    principal = %stored.principal_id,
                    deputy = %stored.deputy_id,
                    skill = %stored.for_skill,
                    "deputy request sent"
                );
                Ok(DeputyOutcome::changed(stored))
            }
            Insertion::Existing(stored) => Ok(DeputyOutcome::unchanged(stored)),
            Insertion::WouldCycle => Err(DeputyError::InvalidTarget(format!(
                "{} already delegates to {} through a deputy chain",
                relationship.deputy_id, relationship.principal_id
            ))),
        }
    }

    /// The named deputy accepts or rejects a pending request.
    ///
    /// Repeating the response already recorded is a no-op and reports
    /// `changed == false`, including when a concurrent caller recorded it.
    ///
    /// # Errors
    ///
    /// - [`DeputyError::Forbidden`] if `actor` is not the deputy
    /// - [`DeputyError::InvalidTransition`] for `pending` as a response, or
    ///   for flipping an already answered request
    /// - [`DeputyError::NotFound`] if no request exists
    pub fn respond_to_deputy_request(
        &self,
        actor: &UserId,
        deputy_id: &UserId,
        principal_id: &UserId,
        status: DeputyStatus,
        now: u64,
    ) -> Result<DeputyOutcome> {
        if status == DeputyStatus::Pending {
            return Err(DeputyError::InvalidTransition(
                "a response must accept or reject".into(),
            ));
        }
        if actor != deputy_id {
            return Err(DeputyError::Forbidden(
                "only the requested deputy may respond".into(),
            ));
        }

        let current = self.relationship(principal_id, deputy_id)?;
        if current.status != DeputyStatus::Pending {
            return already_answered(current, status);
        }

        let mut answered = current;
        answered.status = status;
        answered.responded_at = Some(now);
        match self.store.replace(&answered, DeputyStatus::Pending) {
            Ok(()) => {}
            Err(StoreError::Conflict(_)) => {
                return already_answered(self.relationship(principal_id, deputy_id)?, status);
            }
            Err(e) => return Err(e.into()),
        }

        info!(
            principal = %principal_id,
            deputy = %deputy_id,
            status = status.as_str(),
            "deputy request answered"
        );
        Ok(DeputyOutcome::changed(answered))
    }

    /// The principal drops a relationship, whatever its status.
    ///
    /// # Errors
    ///
    /// - [`DeputyError::Forbidden`] if `actor` is not the principal
    /// - [`DeputyError::NotFound`] if no relationship exists
    pub fn remove_deputy(
        &self,
        actor: &UserId,
        principal_id: &UserId,
        deputy_id: &UserId,
    ) -> Result<()> {
        if actor != principal_id {
            return Err(DeputyError::Forbidden(
                "only the principal may remove a deputy".into(),
            ));
        }
        if !self.store.delete(principal_id, deputy_id)? {
            return Err(DeputyError::NotFound(format!(
                "deputy relationship {principal_id} -> {deputy_id}"
            )));
        }
        info!(principal = %principal_id, deputy = %deputy_id, "deputy removed");
        Ok(())
    }

    /// The principal edits bookability, note or gig type.
    ///
    /// # Errors
    ///
    /// - [`DeputyError::Forbidden`] if `actor` is not the principal
    /// - [`DeputyError::InsufficientTrust`] when enabling `can_be_booked` for a
    ///   deputy below 3.0 stars
    /// - [`DeputyError::NotFound`] if no relationship exists
    pub fn update_deputy_settings(
        &self,
        actor: &UserId,
        principal_id: &UserId,
        deputy_id: &UserId,
        settings: DeputySettings,
    ) -> Result<DeputyRelationship> {
        if actor != principal_id {
            return Err(DeputyError::Forbidden(
                "only the principal may change deputy settings".into(),
            ));
        }
        let current = self.relationship(principal_id, deputy_id)?;

        if settings.can_be_booked == Some(true) {
            let deputy = self.lookup(deputy_id)?;
            if deputy.stars() < BOOKABLE_MIN_STARS {
                return Err(DeputyError::InsufficientTrust {
                    required: BOOKABLE_MIN_STARS,
                    actual: deputy.stars(),
                });
            }
        }

        let expected = current.status;
        let mut updated = current;
        if let Some(can_be_booked) = settings.can_be_booked {
            updated.can_be_booked = can_be_booked;
        }
        if let Some(note) = settings.note {
            updated.note = Some(note);
        }
        if let Some(gig_type) = settings.gig_type {
            updated.gig_type = Some(gig_type);
        }
        self.store.replace(&updated, expected)?;

        info!(
            principal = %principal_id,
            deputy = %deputy_id,
            can_be_booked = updated.can_be_booked,
            "deputy settings updated"
        );
        Ok(updated)
    }

    /// Every relationship the principal has created.
    pub fn deputies_of(&self, principal_id: &UserId) -> Result<Vec<DeputyRelationship>> {
        Ok(self.store.list_by_principal(principal_id)?)
    }

    /// Requests still awaiting the deputy's answer.
    pub fn pending_requests_for(&self, deputy_id: &UserId) -> Result<Vec<DeputyRelationship>> {
        Ok(self
            .store
            .list_by_deputy(deputy_id)?
            .into_iter()
            .filter(|r| r.status == DeputyStatus::Pending)
            .collect())
    }

    /// Deputies the principal may currently suggest for a gig.
    pub fn eligible_deputies(&self, principal_id: &UserId) -> Result<Vec<DeputyRelationship>> {
        eligible_deputies(self.store, principal_id).map_err(DeputyError::from)
    }
}

/// Accepted, bookable deputies of `principal_id`.
pub fn eligible_deputies<S: DeputyStore + ?Sized>(
    store: &S,
    principal_id: &UserId,
) -> std::result::Result<Vec<DeputyRelationship>, StoreError> {
    Ok(store
        .list_by_principal(principal_id)?
        .into_iter()
        .filter(DeputyRelationship::is_suggestable)
        .collect())
}

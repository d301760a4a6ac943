//! Gig status transitions.
//!
//! ```text
//! pending ──accept──────────────▶ accepted
//!    │ ───decline───────────────▶ declined
//!    │ ───cancel────────────────▶ cancelled
//!    └────suggest_deputy──▶ deputy-suggested ──accept_deputy───────▶ accepted
//!                                   │ ──────decline────────────────▶ declined
//!                                   │ ──────decline_all_deputies───▶ cancelled
//!                                   └───────cancel─────────────────▶ cancelled
//! ```
//!
//! Everything here is pure: [`apply`] and [`update_availability`] read a gig
//! and return the next version without touching storage. Checks always run
//! before the copy is modified.

use gigline_types::{
    ActionBy, Availability, BookingHistoryEntry, DeputyRelationship, Gig, GigStatus, UserId,
};
use serde::{Deserialize, Serialize};

use crate::{GigError, Result};

/// Note recorded on the system decline triggered by unavailability.
pub const AUTO_DECLINE_NOTE: &str =
    "Automatically declined: musician marked unavailable and has no deputies";

/// A requested status change.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Transition {
    /// Invited musician takes the gig.
    Accept,
    /// Invited musician turns the gig down.
    Decline,
    /// Invited musician proposes one deputy, or any eligible deputy when
    /// `deputy_id` is `None`.
    SuggestDeputy {
        #[serde(default)]
        deputy_id: Option<UserId>,
    },
    /// Client books a suggested deputy instead.
    AcceptDeputy { deputy_id: UserId },
    /// Client refuses the deputy suggestion.
    DeclineAllDeputies,
    /// Client withdraws the invitation.
    Cancel,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Party {
    Musician,
    Client,
}

impl Transition {
    pub fn name(&self) -> &'static str {
        match self {
            Transition::Accept => "accept",
            Transition::Decline => "decline",
            Transition::SuggestDeputy { .. } => "suggest_deputy",
            Transition::AcceptDeputy { .. } => "accept_deputy",
            Transition::DeclineAllDeputies => "decline_all_deputies",
            Transition::Cancel => "cancel",
        }
    }

    /// Status the gig ends in.
    pub fn target(&self) -> GigStatus {
        match self {
            Transition::Accept | Transition::AcceptDeputy { .. } => GigStatus::Accepted,
            Transition::Decline => GigStatus::Declined,
            Transition::SuggestDeputy { .. } => GigStatus::DeputySuggested,
            Transition::DeclineAllDeputies | Transition::Cancel => GigStatus::Cancelled,
        }
    }

    fn party(&self) -> Party {
        match self {
            Transition::Accept | Transition::Decline | Transition::SuggestDeputy { .. } => {
                Party::Musician
            }
            Transition::AcceptDeputy { .. } | Transition::DeclineAllDeputies | Transition::Cancel => {
                Party::Client
            }
        }
    }

    /// Whether this transition leaves `from`.
    pub fn is_legal_from(&self, from: GigStatus) -> bool {
        match self {
            Transition::Accept | Transition::SuggestDeputy { .. } => from == GigStatus::Pending,
            Transition::AcceptDeputy { .. } | Transition::DeclineAllDeputies => {
                from == GigStatus::DeputySuggested
            }
            Transition::Decline | Transition::Cancel => {
                matches!(from, GigStatus::Pending | GigStatus::DeputySuggested)
            }
        }
    }
}

/// A transition as submitted by a caller.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRequest {
    #[serde(flatten)]
    pub transition: Transition,
    pub actor: UserId,
    /// Status the caller last saw. A mismatch is a conflict.
    pub expected_status: GigStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub timestamp: u64,
}

/// Facts gathered outside the gig that some transitions depend on.
#[derive(Clone, Debug, Default)]
pub struct TransitionContext {
    /// Accepted, bookable deputies of the invited musician.
    pub eligible_deputies: Vec<DeputyRelationship>,
    /// Whether the invited musician may hand gigs to deputies.
    pub may_delegate: bool,
    /// Display name of the musician the gig will be with afterwards.
    pub musician_name: Option<String>,
}

impl TransitionContext {
    fn is_eligible(&self, deputy_id: &UserId) -> bool {
        self.eligible_deputies
            .iter()
            .any(|rel| &rel.deputy_id == deputy_id && rel.is_suggestable())
    }
}

/// Result of applying a request.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Applied {
    /// The gig changed; persist this version.
    Changed(Gig),
    /// A retry of the last recorded action. Nothing to persist.
    Unchanged,
}

fn party_of(gig: &Gig, actor: &UserId) -> Option<Party> {
    if actor == &gig.invited_musician_id {
        Some(Party::Musician)
    } else if actor == &gig.client_id {
        Some(Party::Client)
    } else {
        None
    }
}

fn action_by(party: Party) -> ActionBy {
    match party {
        Party::Musician => ActionBy::Musician,
        Party::Client => ActionBy::Client,
    }
}

/// True when the gig already shows this exact action as its last change.
fn is_retry(gig: &Gig, request: &TransitionRequest, by: ActionBy) -> bool {
    let target = request.transition.target();
    if gig.status != target {
        return false;
    }
    let Some(last) = gig.last_entry() else {
        return false;
    };
    if last.status != target || last.action_by != by || last.actor_id.as_ref() != Some(&request.actor)
    {
        return false;
    }
    match &request.transition {
        Transition::SuggestDeputy { deputy_id } => gig.deputy_suggested_id == *deputy_id,
        Transition::AcceptDeputy { deputy_id } => &gig.invited_musician_id == deputy_id,
        _ => true,
    }
}

/// Validate `request` against `gig` and build the next version.
///
/// Checks run in this order: party, retry, expected status, legality,
/// deputy target. The first failure wins and nothing is modified.
///
/// # Errors
///
/// - [`GigError::Forbidden`] if the actor is not the party the transition
///   belongs to, or cannot delegate
/// - [`GigError::Conflict`] if `expected_status` is stale
/// - [`GigError::InvalidTransition`] if the transition does not leave the
///   current status, or the musician is marked unavailable on accept
/// - [`GigError::InvalidTarget`] if the deputy is not eligible
pub fn apply(gig: &Gig, request: &TransitionRequest, context: &TransitionContext) -> Result<Applied> {
    let transition = &request.transition;
    let party = party_of(gig, &request.actor).filter(|p| *p == transition.party());
    let Some(party) = party else {
        return Err(GigError::Forbidden(format!(
            "{} may not {} gig {}",
            request.actor,
            transition.name(),
            gig.id
        )));
    };
    let by = action_by(party);

    if is_retry(gig, request, by) {
        return Ok(Applied::Unchanged);
    }

    if request.expected_status != gig.status {
        return Err(GigError::Conflict {
            expected: request.expected_status,
            actual: gig.status,
        });
    }

    let invalid = || GigError::InvalidTransition {
        transition: transition.name(),
        from: gig.status,
    };
    if !transition.is_legal_from(gig.status) {
        return Err(invalid());
    }

    let mut next = gig.clone();
    let mut entry = BookingHistoryEntry {
        status: transition.target(),
        musician_id: gig.invited_musician_id.clone(),
        musician_name: context.musician_name.clone(),
        original_musician_id: None,
        action_by: by,
        actor_id: Some(request.actor.clone()),
        notes: request.notes.clone(),
        timestamp: request.timestamp,
    };

    match transition {
        Transition::Accept => {
            if gig.musician_availability == Availability::NotAvailable {
                return Err(invalid());
            }
        }
        Transition::Decline | Transition::DeclineAllDeputies | Transition::Cancel => {
            next.deputy_suggested_id = None;
        }
        Transition::SuggestDeputy { deputy_id } => {
            if !context.may_delegate {
                return Err(GigError::Forbidden(format!(
                    "{} may not hand gigs to deputies",
                    request.actor
                )));
            }
            match deputy_id {
                Some(id) if !context.is_eligible(id) => {
                    return Err(GigError::InvalidTarget(format!(
                        "{id} is not a bookable deputy of {}",
                        gig.invited_musician_id
                    )));
                }
                None if context.eligible_deputies.is_empty() => {
                    return Err(GigError::InvalidTarget(format!(
                        "{} has no bookable deputies",
                        gig.invited_musician_id
                    )));
                }
                _ => {}
            }
            next.deputy_suggested_id = deputy_id.clone();
        }
        Transition::AcceptDeputy { deputy_id } => {
            if let Some(suggested) = &gig.deputy_suggested_id {
                if suggested != deputy_id {
                    return Err(GigError::InvalidTarget(format!(
                        "{deputy_id} was not offered for gig {}",
                        gig.id
                    )));
                }
            }
            if !context.is_eligible(deputy_id) {
                return Err(GigError::InvalidTarget(format!(
                    "{deputy_id} is no longer a bookable deputy of {}",
                    gig.invited_musician_id
                )));
            }
            next.original_musician_id = Some(gig.invited_musician_id.clone());
            next.invited_musician_id = deputy_id.clone();
            next.deputy_suggested_id = None;
            entry.musician_id = deputy_id.clone();
            entry.original_musician_id = Some(gig.invited_musician_id.clone());
        }
    }

    next.status = transition.target();
    next.booking_history.push(entry);
    next.revision = gig.revision + 1;
    Ok(Applied::Changed(next))
}

/// Result of an availability update.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AvailabilityChange {
    pub gig: Gig,
    /// Whether anything differs from the stored gig.
    pub changed: bool,
    /// Whether the update triggered the system decline.
    pub auto_declined: bool,
}

/// Record the invited musician's availability.
///
/// Availability is independent of status, except that turning unavailable
/// on a `pending` gig with no bookable deputies declines it on the
/// musician's behalf. A gig declined that way stays declined when the
/// musician becomes available again.
///
/// # Errors
///
/// - [`GigError::Forbidden`] if `actor` is not the invited musician
pub fn update_availability(
    gig: &Gig,
    actor: &UserId,
    availability: Availability,
    has_eligible_deputies: bool,
    timestamp: u64,
) -> Result<AvailabilityChange> {
    if actor != &gig.invited_musician_id {
        return Err(GigError::Forbidden(
            "only the invited musician sets availability".into(),
        ));
    }

    if gig.musician_availability == availability {
        return Ok(AvailabilityChange {
            gig: gig.clone(),
            changed: false,
            auto_declined: false,
        });
    }

    let mut next = gig.clone();
    next.musician_availability = availability;
    next.revision = gig.revision + 1;

    let auto_declined = availability == Availability::NotAvailable
        && gig.status == GigStatus::Pending
        && !has_eligible_deputies;
    if auto_declined {
        next.status = GigStatus::Declined;
        next.booking_history.push(BookingHistoryEntry {
            status: GigStatus::Declined,
            musician_id: gig.invited_musician_id.clone(),
            musician_name: None,
            original_musician_id: None,
            action_by: ActionBy::System,
            actor_id: None,
            notes: Some(AUTO_DECLINE_NOTE.to_string()),
            timestamp,
        });
    }

    Ok(AvailabilityChange {
        gig: next,
        changed: true,
        auto_declined,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use gigline_types::{DeputyStatus, ErrorKind};

    const NOW: u64 = 1_700_000_000;

    fn gig() -> Gig {
        Gig::new("g1".into(), "client".into(), "mus".into(), NOW)
    }

    fn request(transition: Transition, actor: &str, expected: GigStatus) -> TransitionRequest {
        TransitionRequest {
            transition,
            actor: actor.into(),
            expected_status: expected,
            notes: None,
            timestamp: NOW + 10,
        }
    }

    fn bookable(deputy: &str) -> DeputyRelationship {
        let mut rel = DeputyRelationship::pending("mus".into(), deputy.into(), "keys", NOW);
        rel.status = DeputyStatus::Accepted;
        rel.can_be_booked = true;
        rel
    }

    fn delegating(deputies: &[&str]) -> TransitionContext {
        TransitionContext {
            eligible_deputies: deputies.iter().map(|d| bookable(d)).collect(),
            may_delegate: true,
            musician_name: None,
        }
    }

    fn changed(applied: Applied) -> Gig {
        match applied {
            Applied::Changed(gig) => gig,
            Applied::Unchanged => unreachable!("expected a change"),
        }
    }

    #[test]
    fn test_accept_happy_path() {
        let next = changed(
            apply(
                &gig(),
                &request(Transition::Accept, "mus", GigStatus::Pending),
                &TransitionContext::default(),
            )
            .expect("accept"),
        );
        assert_eq!(next.status, GigStatus::Accepted);
        assert_eq!(next.booking_history.len(), 1);
        let entry = &next.booking_history[0];
        assert_eq!(entry.status, GigStatus::Accepted);
        assert_eq!(entry.action_by, ActionBy::Musician);
        assert_eq!(entry.actor_id, Some(UserId::from("mus")));
        assert_eq!(next.revision, 1);
    }

    #[test]
    fn test_accept_blocked_when_unavailable() {
        let mut g = gig();
        g.musician_availability = Availability::NotAvailable;
        let err = apply(
            &g,
            &request(Transition::Accept, "mus", GigStatus::Pending),
            &TransitionContext::default(),
        )
        .expect_err("unavailable");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);

        g.musician_availability = Availability::Available;
        assert!(apply(
            &g,
            &request(Transition::Accept, "mus", GigStatus::Pending),
            &TransitionContext::default(),
        )
        .is_ok());
    }

    #[test]
    fn test_wrong_party_forbidden() {
        let ctx = delegating(&["dep"]);
        for (transition, actor) in [
            (Transition::Accept, "client"),
            (Transition::Decline, "stranger"),
            (Transition::SuggestDeputy { deputy_id: None }, "client"),
            (Transition::Cancel, "mus"),
        ] {
            let err = apply(&gig(), &request(transition, actor, GigStatus::Pending), &ctx)
                .expect_err("wrong party");
            assert_eq!(err.kind(), ErrorKind::Forbidden);
        }
    }

    #[test]
    fn test_terminal_states_reject_everything() {
        let ctx = delegating(&["dep"]);
        for status in [GigStatus::Declined, GigStatus::Cancelled, GigStatus::Accepted] {
            let mut g = gig();
            g.status = status;
            for (transition, actor) in [
                (Transition::Accept, "mus"),
                (Transition::Decline, "mus"),
                (Transition::SuggestDeputy { deputy_id: None }, "mus"),
                (Transition::AcceptDeputy { deputy_id: "dep".into() }, "client"),
                (Transition::DeclineAllDeputies, "client"),
                (Transition::Cancel, "client"),
            ] {
                if transition.target() == status {
                    continue;
                }
                let err = apply(&g, &request(transition, actor, status), &ctx)
                    .expect_err("terminal");
                assert_eq!(err.kind(), ErrorKind::InvalidTransition);
            }
        }
    }

    #[test]
    fn test_terminal_state_rejects_other_party_action() {
        // Declined by the musician, then the client tries to cancel.
        let mut g = gig();
        g.status = GigStatus::Declined;
        let err = apply(
            &g,
            &request(Transition::Cancel, "client", GigStatus::Declined),
            &TransitionContext::default(),
        )
        .expect_err("declined is terminal");
        assert_eq!(err.kind(), ErrorKind::InvalidTransition);
    }

    #[test]
    fn test_retry_is_unchanged() {
        let req = request(Transition::Accept, "mus", GigStatus::Pending);
        let ctx = TransitionContext::default();
        let once = changed(apply(&gig(), &req, &ctx).expect("first"));
        assert_eq!(apply(&once, &req, &ctx).expect("retry"), Applied::Unchanged);
    }

    #[test]
    fn test_stale_expected_status_conflicts() {
        let ctx = delegating(&["dep"]);
        let suggested = changed(
            apply(
                &gig(),
                &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
                &ctx,
            )
            .expect("suggest"),
        );
        let err = apply(
            &suggested,
            &request(Transition::Decline, "mus", GigStatus::Pending),
            &ctx,
        )
        .expect_err("stale");
        assert_eq!(err.kind(), ErrorKind::Conflict);
        assert_eq!(suggested.booking_history.len(), 1);
    }

    #[test]
    fn test_suggest_and_accept_deputy() {
        let ctx = delegating(&["dep"]);
        let suggested = changed(
            apply(
                &gig(),
                &request(
                    Transition::SuggestDeputy { deputy_id: Some("dep".into()) },
                    "mus",
                    GigStatus::Pending,
                ),
                &ctx,
            )
            .expect("suggest"),
        );
        assert_eq!(suggested.status, GigStatus::DeputySuggested);
        assert_eq!(suggested.deputy_suggested_id, Some(UserId::from("dep")));

        let accepted = changed(
            apply(
                &suggested,
                &request(
                    Transition::AcceptDeputy { deputy_id: "dep".into() },
                    "client",
                    GigStatus::DeputySuggested,
                ),
                &ctx,
            )
            .expect("accept deputy"),
        );
        assert_eq!(accepted.status, GigStatus::Accepted);
        assert_eq!(accepted.invited_musician_id, UserId::from("dep"));
        assert_eq!(accepted.original_musician_id, Some(UserId::from("mus")));
        assert_eq!(accepted.booking_history.len(), 2);
        let last = &accepted.booking_history[1];
        assert_eq!(last.musician_id, UserId::from("dep"));
        assert_eq!(last.original_musician_id, Some(UserId::from("mus")));
        assert_eq!(last.action_by, ActionBy::Client);
        assert_eq!(accepted.booking_history[0], suggested.booking_history[0]);
    }

    #[test]
    fn test_suggest_requires_eligible_deputy() {
        let ctx = delegating(&["dep"]);
        let err = apply(
            &gig(),
            &request(
                Transition::SuggestDeputy { deputy_id: Some("other".into()) },
                "mus",
                GigStatus::Pending,
            ),
            &ctx,
        )
        .expect_err("not a deputy");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let err = apply(
            &gig(),
            &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
            &delegating(&[]),
        )
        .expect_err("no deputies");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let mut ctx = delegating(&["dep"]);
        ctx.may_delegate = false;
        let err = apply(
            &gig(),
            &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
            &ctx,
        )
        .expect_err("cannot delegate");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_accept_deputy_must_match_suggestion() {
        let ctx = delegating(&["dep", "dep2"]);
        let suggested = changed(
            apply(
                &gig(),
                &request(
                    Transition::SuggestDeputy { deputy_id: Some("dep".into()) },
                    "mus",
                    GigStatus::Pending,
                ),
                &ctx,
            )
            .expect("suggest"),
        );
        let err = apply(
            &suggested,
            &request(
                Transition::AcceptDeputy { deputy_id: "dep2".into() },
                "client",
                GigStatus::DeputySuggested,
            ),
            &ctx,
        )
        .expect_err("different deputy");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);
    }

    #[test]
    fn test_accept_deputy_rechecks_eligibility() {
        let suggested = changed(
            apply(
                &gig(),
                &request(
                    Transition::SuggestDeputy { deputy_id: Some("dep".into()) },
                    "mus",
                    GigStatus::Pending,
                ),
                &delegating(&["dep"]),
            )
            .expect("suggest"),
        );
        let accept = request(
            Transition::AcceptDeputy { deputy_id: "dep".into() },
            "client",
            GigStatus::DeputySuggested,
        );

        let err = apply(&suggested, &accept, &delegating(&[]))
            .expect_err("deputy was removed after the suggestion");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let mut unbookable = delegating(&[]);
        let mut rel = bookable("dep");
        rel.can_be_booked = false;
        unbookable.eligible_deputies.push(rel);
        let err = apply(&suggested, &accept, &unbookable)
            .expect_err("deputy is no longer bookable");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);

        let err = apply(&suggested, &accept, &delegating(&["other"]))
            .expect_err("only other deputies remain");
        assert_eq!(err.kind(), ErrorKind::InvalidTarget);
    }

    #[test]
    fn test_open_suggestion_accepts_any_eligible() {
        let ctx = delegating(&["dep", "dep2"]);
        let suggested = changed(
            apply(
                &gig(),
                &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
                &ctx,
            )
            .expect("suggest"),
        );
        assert!(suggested.deputy_suggested_id.is_none());
        let accepted = changed(
            apply(
                &suggested,
                &request(
                    Transition::AcceptDeputy { deputy_id: "dep2".into() },
                    "client",
                    GigStatus::DeputySuggested,
                ),
                &ctx,
            )
            .expect("accept"),
        );
        assert_eq!(accepted.invited_musician_id, UserId::from("dep2"));
    }

    #[test]
    fn test_deputy_suggested_resolutions() {
        let ctx = delegating(&["dep"]);
        let suggested = changed(
            apply(
                &gig(),
                &request(Transition::SuggestDeputy { deputy_id: None }, "mus", GigStatus::Pending),
                &ctx,
            )
            .expect("suggest"),
        );

        let cancelled = changed(
            apply(
                &suggested,
                &request(Transition::DeclineAllDeputies, "client", GigStatus::DeputySuggested),
                &ctx,
            )
            .expect("decline all"),
        );
        assert_eq!(cancelled.status, GigStatus::Cancelled);
        assert_eq!(cancelled.booking_history[1].action_by, ActionBy::Client);

        let declined = changed(
            apply(
                &suggested,
                &request(Transition::Decline, "mus", GigStatus::DeputySuggested),
                &ctx,
            )
            .expect("withdraw"),
        );
        assert_eq!(declined.status, GigStatus::Declined);
        assert!(declined.deputy_suggested_id.is_none());
    }

    #[test]
    fn test_auto_decline_without_deputies() {
        let change = update_availability(
            &gig(),
            &"mus".into(),
            Availability::NotAvailable,
            false,
            NOW + 5,
        )
        .expect("update");
        assert!(change.changed);
        assert!(change.auto_declined);
        assert_eq!(change.gig.status, GigStatus::Declined);
        let entry = change.gig.last_entry().expect("entry");
        assert_eq!(entry.action_by, ActionBy::System);
        assert!(entry.actor_id.is_none());
        assert_eq!(entry.notes.as_deref(), Some(AUTO_DECLINE_NOTE));
    }

    #[test]
    fn test_unavailable_with_deputies_stays_pending() {
        let change = update_availability(
            &gig(),
            &"mus".into(),
            Availability::NotAvailable,
            true,
            NOW,
        )
        .expect("update");
        assert!(!change.auto_declined);
        assert_eq!(change.gig.status, GigStatus::Pending);
        assert!(change.gig.booking_history.is_empty());
        assert_eq!(change.gig.musician_availability, Availability::NotAvailable);
    }

    #[test]
    fn test_available_again_after_auto_decline_stays_declined() {
        let mus = UserId::from("mus");
        let declined = update_availability(&gig(), &mus, Availability::NotAvailable, false, NOW)
            .expect("decline")
            .gig;
        let back = update_availability(&declined, &mus, Availability::Available, false, NOW + 1)
            .expect("available");
        assert!(back.changed);
        assert!(!back.auto_declined);
        assert_eq!(back.gig.status, GigStatus::Declined);
        assert_eq!(back.gig.booking_history.len(), 1);
    }

    #[test]
    fn test_availability_noop_and_forbidden() {
        let same = update_availability(
            &gig(),
            &"mus".into(),
            Availability::Undefined,
            false,
            NOW,
        )
        .expect("noop");
        assert!(!same.changed);
        assert_eq!(same.gig.revision, 0);

        let err = update_availability(
            &gig(),
            &"client".into(),
            Availability::Available,
            false,
            NOW,
        )
        .expect_err("client");
        assert_eq!(err.kind(), ErrorKind::Forbidden);
    }

    #[test]
    fn test_request_wire_format() {
        let json = r#"{"action":"accept_deputy","deputy_id":"d1","actor":"c1","expected_status":"deputy-suggested","timestamp":5}"#;
        let req: TransitionRequest = serde_json::from_str(json).expect("parse");
        assert_eq!(req.transition, Transition::AcceptDeputy { deputy_id: "d1".into() });
        assert_eq!(req.expected_status, GigStatus::DeputySuggested);
        assert!(req.notes.is_none());
    }
}

//! Gig invitation commands.

use std::sync::Arc;

use gigline_gig::{GigService, Transition, TransitionRequest};
use gigline_types::{Availability, Gig, GigId, GigStatus, UserId};
use serde::Deserialize;
use serde_json::Value;

use super::{parse_params, required_str, required_user, to_json, Result};
use crate::events::{self, Event};
use crate::rpc::RpcError;
use crate::{unix_now, DaemonState};

#[derive(Deserialize)]
struct TransitionParams {
    gig_id: GigId,
    #[serde(flatten)]
    transition: Transition,
    actor_id: UserId,
    expected_status: GigStatus,
    #[serde(default)]
    notes: Option<String>,
}

#[derive(Deserialize)]
struct AvailabilityParams {
    gig_id: GigId,
    actor_id: UserId,
    availability: Availability,
}

fn new_gig_id() -> GigId {
    let mut id = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut id);
    GigId(hex::encode(id))
}

fn status_changed(gig: &Gig, from: GigStatus, by: &str, now: u64) -> Event {
    Event::new(
        events::GIG_STATUS_CHANGED,
        now,
        serde_json::json!({
            "gig_id": gig.id,
            "client_id": gig.client_id,
            "musician_id": gig.invited_musician_id,
            "original_musician_id": gig.original_musician_id,
            "from": from,
            "to": gig.status,
            "action_by": by,
        }),
    )
}

/// Invite a musician to a new gig.
pub async fn create_gig(state: &Arc<DaemonState>, params: &Value) -> Result {
    let client_id = required_user(params, "client_id")?;
    let musician_id = required_user(params, "musician_id")?;
    let trust = state.trust();
    let store = state.store.as_ref();
    let service = GigService::new(store, store, &trust);

    let now = unix_now();
    let gig = service.create_gig(new_gig_id(), &client_id, &musician_id, now)?;
    state.event_bus.emit(Event::new(
        events::GIG_CREATED,
        now,
        serde_json::json!({
            "gig_id": gig.id,
            "client_id": gig.client_id,
            "musician_id": gig.invited_musician_id,
        }),
    ));
    to_json(&gig)
}

/// A gig with its full booking history.
pub async fn get_gig(state: &Arc<DaemonState>, params: &Value) -> Result {
    let gig_id = GigId::new(required_str(params, "gig_id")?);
    let trust = state.trust();
    let store = state.store.as_ref();
    to_json(&GigService::new(store, store, &trust).get_gig(&gig_id)?)
}

/// Gigs where the user is client or invited musician.
pub async fn get_my_gigs(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_user(params, "user_id")?;
    let trust = state.trust();
    let store = state.store.as_ref();
    to_json(&GigService::new(store, store, &trust).gigs_for(&user_id)?)
}

/// Deputies the gig's musician may currently suggest.
pub async fn get_eligible_deputies(state: &Arc<DaemonState>, params: &Value) -> Result {
    let gig_id = GigId::new(required_str(params, "gig_id")?);
    let trust = state.trust();
    let store = state.store.as_ref();
    to_json(&GigService::new(store, store, &trust).eligible_deputies(&gig_id)?)
}

/// Apply a status transition. Retries of the last action report
/// `applied: false` and emit nothing.
pub async fn transition_gig(state: &Arc<DaemonState>, params: &Value) -> Result {
    let p: TransitionParams = parse_params(params)?;
    let trust = state.trust();
    let store = state.store.as_ref();
    let service = GigService::new(store, store, &trust);

    let now = unix_now();
    let from = p.expected_status;
    let request = TransitionRequest {
        transition: p.transition,
        actor: p.actor_id,
        expected_status: p.expected_status,
        notes: p.notes,
        timestamp: now,
    };
    let outcome = service.transition(&p.gig_id, &request)?;
    if outcome.applied {
        let by = outcome
            .gig
            .last_entry()
            .map_or("system", |e| e.action_by.as_str());
        state.event_bus.emit(status_changed(&outcome.gig, from, by, now));
    }
    Ok(serde_json::json!({
        "applied": outcome.applied,
        "gig": to_json(&outcome.gig)?,
    }))
}

/// Record the musician's availability. May decline the gig automatically.
pub async fn update_gig_availability(state: &Arc<DaemonState>, params: &Value) -> Result {
    let p: AvailabilityParams = parse_params(params)?;
    let trust = state.trust();
    let store = state.store.as_ref();
    let service = GigService::new(store, store, &trust);

    let now = unix_now();
    let change = service
        .update_gig_availability(&p.gig_id, &p.actor_id, p.availability, now)
        .map_err(RpcError::from)?;

    if change.changed {
        state.event_bus.emit(Event::new(
            events::GIG_AVAILABILITY_CHANGED,
            now,
            serde_json::json!({
                "gig_id": change.gig.id,
                "client_id": change.gig.client_id,
                "musician_id": change.gig.invited_musician_id,
                "availability": change.gig.musician_availability,
            }),
        ));
    }
    if change.auto_declined {
        state
            .event_bus
            .emit(status_changed(&change.gig, GigStatus::Pending, "system", now));
    }

    Ok(serde_json::json!({
        "changed": change.changed,
        "auto_declined": change.auto_declined,
        "gig": to_json(&change.gig)?,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use gigline_types::Role;

    fn seeded() -> Arc<DaemonState> {
        let state = DaemonState::for_tests();
        fixtures::seed(&state, "client", &[Role::Client], 40);
        fixtures::seed(&state, "mus", &[Role::Musician], 80);
        state
    }

    async fn new_gig(state: &Arc<DaemonState>) -> String {
        let gig = create_gig(state, &serde_json::json!({"client_id": "client", "musician_id": "mus"}))
            .await
            .expect("create");
        gig["id"].as_str().map(str::to_string).unwrap_or_default()
    }

    #[tokio::test]
    async fn test_create_and_accept() {
        let state = seeded();
        let mut rx = state.event_bus.subscribe();
        let gig_id = new_gig(&state).await;
        assert_eq!(gig_id.len(), 32);
        assert_eq!(rx.try_recv().expect("event").event_type, events::GIG_CREATED);

        let params = serde_json::json!({
            "gig_id": gig_id,
            "action": "accept",
            "actor_id": "mus",
            "expected_status": "pending",
        });
        let result = transition_gig(&state, &params).await.expect("accept");
        assert_eq!(result["applied"], true);
        assert_eq!(result["gig"]["status"], "accepted");

        let event = rx.try_recv().expect("event");
        assert_eq!(event.event_type, events::GIG_STATUS_CHANGED);
        assert_eq!(event.payload["action_by"], "musician");

        let retry = transition_gig(&state, &params).await.expect("retry");
        assert_eq!(retry["applied"], false);
        assert!(rx.try_recv().is_err());

        let gig = get_gig(&state, &serde_json::json!({"gig_id": gig_id}))
            .await
            .expect("get");
        assert_eq!(gig["booking_history"].as_array().map(Vec::len), Some(1));
    }

    #[tokio::test]
    async fn test_wrong_party_and_stale_status() {
        let state = seeded();
        let gig_id = new_gig(&state).await;

        let err = transition_gig(
            &state,
            &serde_json::json!({
                "gig_id": gig_id, "action": "accept", "actor_id": "client",
                "expected_status": "pending",
            }),
        )
        .await
        .expect_err("client cannot accept");
        assert_eq!(err.data.expect("data")["kind"], "forbidden");

        let err = transition_gig(
            &state,
            &serde_json::json!({
                "gig_id": gig_id, "action": "cancel", "actor_id": "client",
                "expected_status": "deputy-suggested",
            }),
        )
        .await
        .expect_err("stale");
        assert_eq!(err.data.expect("data")["kind"], "conflict");
    }

    #[tokio::test]
    async fn test_auto_decline_emits_both_events() {
        let state = seeded();
        let gig_id = new_gig(&state).await;
        let mut rx = state.event_bus.subscribe();

        let result = update_gig_availability(
            &state,
            &serde_json::json!({"gig_id": gig_id, "actor_id": "mus", "availability": "notavailable"}),
        )
        .await
        .expect("update");
        assert_eq!(result["auto_declined"], true);
        assert_eq!(result["gig"]["status"], "declined");

        assert_eq!(rx.try_recv().expect("event").event_type, events::GIG_AVAILABILITY_CHANGED);
        let declined = rx.try_recv().expect("event");
        assert_eq!(declined.payload["action_by"], "system");

        let mine = get_my_gigs(&state, &serde_json::json!({"user_id": "client"}))
            .await
            .expect("list");
        assert_eq!(mine.as_array().map(Vec::len), Some(1));
    }
}

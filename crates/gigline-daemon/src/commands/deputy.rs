//! Deputy delegation commands.

use std::sync::Arc;

use gigline_deputy::{check_deputy_eligibility as eligibility_hint, DeputyManager, DeputyRequest};
use gigline_types::{DeputySettings, DeputyStatus, UserId};
use serde::Deserialize;
use serde_json::Value;

use super::{lookup_user, parse_params, required_str, required_user, to_json, Result};
use crate::events::{self, Event};
use crate::rpc::RpcError;
use crate::{unix_now, DaemonState};

#[derive(Deserialize)]
struct RespondParams {
    actor_id: UserId,
    deputy_id: UserId,
    principal_id: UserId,
    status: DeputyStatus,
}

#[derive(Deserialize)]
struct SettingsParams {
    actor_id: UserId,
    principal_id: UserId,
    deputy_id: UserId,
    #[serde(default)]
    settings: DeputySettings,
}

/// Ask a user to become the principal's deputy.
pub async fn send_deputy_request(state: &Arc<DaemonState>, params: &Value) -> Result {
    let request: DeputyRequest = parse_params(params)?;
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);

    let now = unix_now();
    let outcome = manager.send_deputy_request(request, now)?;
    let relationship = outcome.relationship;
    if outcome.changed {
        state.event_bus.emit(Event::new(
            events::DEPUTY_REQUEST_SENT,
            now,
            serde_json::json!({
                "principal_id": relationship.principal_id,
                "deputy_id": relationship.deputy_id,
                "for_skill": relationship.for_skill,
            }),
        ));
    }
    to_json(&relationship)
}

/// The deputy accepts or rejects a pending request.
pub async fn respond_to_deputy_request(state: &Arc<DaemonState>, params: &Value) -> Result {
    let p: RespondParams = parse_params(params)?;
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);

    let now = unix_now();
    let outcome =
        manager.respond_to_deputy_request(&p.actor_id, &p.deputy_id, &p.principal_id, p.status, now)?;
    let relationship = outcome.relationship;
    if outcome.changed {
        state.event_bus.emit(Event::new(
            events::DEPUTY_REQUEST_ANSWERED,
            now,
            serde_json::json!({
                "principal_id": relationship.principal_id,
                "deputy_id": relationship.deputy_id,
                "status": relationship.status,
            }),
        ));
    }
    to_json(&relationship)
}

/// The principal removes a deputy.
pub async fn remove_deputy(state: &Arc<DaemonState>, params: &Value) -> Result {
    let actor = required_user(params, "actor_id")?;
    let principal_id = required_user(params, "principal_id")?;
    let deputy_id = required_user(params, "deputy_id")?;
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);

    manager.remove_deputy(&actor, &principal_id, &deputy_id)?;
    state.event_bus.emit(Event::new(
        events::DEPUTY_REMOVED,
        unix_now(),
        serde_json::json!({ "principal_id": principal_id, "deputy_id": deputy_id }),
    ));
    Ok(serde_json::json!({"removed": true}))
}

/// The principal edits bookability, note or gig type.
pub async fn update_deputy_settings(state: &Arc<DaemonState>, params: &Value) -> Result {
    let p: SettingsParams = parse_params(params)?;
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);

    let relationship =
        manager.update_deputy_settings(&p.actor_id, &p.principal_id, &p.deputy_id, p.settings)?;
    state.event_bus.emit(Event::new(
        events::DEPUTY_SETTINGS_UPDATED,
        unix_now(),
        serde_json::json!({
            "principal_id": relationship.principal_id,
            "deputy_id": relationship.deputy_id,
            "can_be_booked": relationship.can_be_booked,
        }),
    ));
    to_json(&relationship)
}

/// Pre-flight UI hint. Never used to authorize.
pub async fn check_deputy_eligibility(state: &Arc<DaemonState>, params: &Value) -> Result {
    let principal = lookup_user(state, &required_user(params, "principal_id")?)?;
    let deputy = lookup_user(state, &required_user(params, "deputy_id")?)?;
    let skill = params.get("skill").and_then(|v| v.as_str()).unwrap_or("");
    to_json(&eligibility_hint(&deputy, &principal, skill))
}

/// Every relationship a principal has created.
pub async fn get_deputies(state: &Arc<DaemonState>, params: &Value) -> Result {
    let principal_id = required_user(params, "principal_id")?;
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);

    let relationships = if params.get("eligible_only").and_then(|v| v.as_bool()) == Some(true) {
        manager.eligible_deputies(&principal_id)?
    } else {
        manager.deputies_of(&principal_id)?
    };
    to_json(&relationships)
}

/// Requests waiting for the deputy's answer.
pub async fn get_pending_deputy_requests(state: &Arc<DaemonState>, params: &Value) -> Result {
    let deputy_id = UserId::new(required_str(params, "deputy_id")?);
    let trust = state.trust();
    let manager = DeputyManager::new(state.store.as_ref(), &trust);
    to_json(&manager.pending_requests_for(&deputy_id).map_err(RpcError::from)?)
}

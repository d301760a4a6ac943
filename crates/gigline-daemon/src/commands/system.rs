//! Event subscription and daemon status.

use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use super::{to_json, Result};
use crate::events::EventFilter;
use crate::rpc::RpcError;
use crate::DaemonState;

/// Validate the filter and hand out a subscription id. The connection
/// handler starts forwarding once this succeeds.
pub async fn subscribe_events(state: &Arc<DaemonState>, params: &Value) -> Result {
    if let Some(filter) = params.get("filter") {
        serde_json::from_value::<EventFilter>(filter.clone())
            .map_err(|e| RpcError::invalid_params(&format!("filter: {e}")))?;
    }

    let mut sub_id = [0u8; 16];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut sub_id);

    Ok(serde_json::json!({
        "subscription_id": hex::encode(sub_id),
        "sequence": state.event_bus.sequence(),
    }))
}

pub async fn unsubscribe_events(_state: &Arc<DaemonState>, params: &Value) -> Result {
    params
        .get("subscription_id")
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params("subscription_id required"))?;

    Ok(serde_json::json!({"unsubscribed": true}))
}

pub async fn get_daemon_status(state: &Arc<DaemonState>) -> Result {
    Ok(serde_json::json!({
        "version": env!("CARGO_PKG_VERSION"),
        "event_sequence": state.event_bus.sequence(),
        "trust_cache": to_json(&state.engine.stats())?,
    }))
}

/// Ask the daemon to stop after answering.
pub async fn shutdown(state: &Arc<DaemonState>) -> Result {
    info!("Shutdown requested over IPC");
    // Nobody listening means the daemon is already stopping.
    let _ = state.shutdown_tx.send(());
    Ok(serde_json::json!({"shutting_down": true}))
}

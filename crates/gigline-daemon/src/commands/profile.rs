//! Profile sync from the external profile/activity and trial collaborators.

use std::sync::Arc;

use gigline_trust::ProfileProvider;
use gigline_types::UserProfile;
use serde::Deserialize;
use serde_json::Value;
use tracing::info;

use super::{parse_params, Result};
use crate::rpc::RpcError;
use crate::{unix_now, DaemonState};

#[derive(Deserialize)]
struct SyncProfileParams {
    profile: UserProfile,
    #[serde(default)]
    in_grace_period: bool,
}

/// Store the latest profile and signal snapshot for a user.
pub async fn sync_profile(state: &Arc<DaemonState>, params: &Value) -> Result {
    let SyncProfileParams {
        profile,
        in_grace_period,
    } = parse_params(params)?;

    if profile.roles.is_empty() {
        return Err(RpcError::invalid_params("profile needs at least one role"));
    }

    if let Some(previous) = state.store.profile(&profile.user_id)? {
        if previous.signals != profile.signals {
            state.engine.invalidate(&previous.signals);
        }
    }

    state
        .store
        .sync_profile(&profile, in_grace_period, unix_now())
        .map_err(|e| RpcError::internal_error(&format!("db error: {e}")))?;

    let assessment = state.engine.assess(&profile.signals);
    info!(user = %profile.user_id, score = assessment.score, "profile synced");

    Ok(serde_json::json!({
        "user_id": profile.user_id,
        "score": assessment.score,
        "stars": assessment.stars,
        "tier": assessment.tier,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::fixtures;
    use gigline_types::{Role, RoleSet};

    #[tokio::test]
    async fn test_sync_profile_round_trip() {
        let state = DaemonState::for_tests();
        let params = serde_json::json!({
            "profile": fixtures::profile("u1", &[Role::Musician], 60),
            "in_grace_period": true,
        });
        let result = sync_profile(&state, &params).await.expect("sync");
        assert_eq!(result["score"], 60);
        assert_eq!(result["stars"], 3.0);
        assert_eq!(result["tier"], "verified");

        let stored = state.store.profile(&"u1".into()).expect("read").expect("present");
        assert_eq!(stored.roles, RoleSet::single(Role::Musician));
    }

    #[tokio::test]
    async fn test_sync_profile_rejects_bad_params() {
        let state = DaemonState::for_tests();
        let err = sync_profile(&state, &serde_json::json!({"profile": 5}))
            .await
            .expect_err("bad params");
        assert_eq!(err.code, -32602);

        let profile = fixtures::profile("u1", &[], 10);
        let err = sync_profile(&state, &serde_json::json!({ "profile": profile }))
            .await
            .expect_err("no roles");
        assert_eq!(err.code, -32602);
    }
}

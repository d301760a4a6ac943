//! Trust score and feature eligibility queries.

use std::sync::Arc;

use gigline_trust::{effective_subscription_tier, GracePeriodProvider, ProfileProvider, UserTrust};
use gigline_types::thresholds::{can_hire_directly, is_reliable};
use gigline_types::{ErrorKind, Feature, UserId};
use serde_json::Value;

use super::{lookup_user, required_str, required_user, Result};
use crate::rpc::RpcError;
use crate::DaemonState;

/// Score, stars, tier and per-category breakdown.
pub async fn get_trust_assessment(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user = lookup_user(state, &required_user(params, "user_id")?)?;
    let a = &user.assessment;
    Ok(serde_json::json!({
        "user_id": user.user_id,
        "score": a.score,
        "stars": a.stars,
        "tier": a.tier,
        "breakdown": a.breakdown,
        "reliable": is_reliable(a.score),
        "can_hire_directly": can_hire_directly(a.stars),
    }))
}

/// Every feature the user's roles offer, the next one to unlock, and the
/// subscription tier used for flag-based checks.
pub async fn get_feature_eligibility(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id = required_user(params, "user_id")?;
    let profile = state
        .store
        .profile(&user_id)?
        .ok_or_else(|| RpcError::domain(ErrorKind::NotFound, &format!("user {user_id}")))?;
    let in_grace = state.store.is_in_grace_period(&user_id)?;
    let tier = profile.signals.social.subscription_tier;

    let user = UserTrust::from_profile(profile, &state.engine);
    let gate = user.gate();
    Ok(serde_json::json!({
        "user_id": user_id,
        "score": gate.score(),
        "eligibility": gate.eligibility(),
        "next_feature": gate.next_feature(),
        "subscription_tier": tier,
        "effective_subscription_tier": effective_subscription_tier(tier, in_grace),
    }))
}

fn parse_feature(name: &str) -> std::result::Result<Feature, RpcError> {
    Feature::ALL
        .into_iter()
        .find(|f| f.as_str() == name)
        .ok_or_else(|| RpcError::invalid_params(&format!("unknown feature '{name}'")))
}

/// Can this user use one feature, and how far off are they.
pub async fn check_feature(state: &Arc<DaemonState>, params: &Value) -> Result {
    let user_id: UserId = required_user(params, "user_id")?;
    let feature = parse_feature(required_str(params, "feature")?)?;
    let user = lookup_user(state, &user_id)?;
    let gate = user.gate();
    Ok(serde_json::json!({
        "feature": feature,
        "allowed": gate.can_access(feature),
        "threshold": gate.threshold(feature),
        "stars_needed": gate.stars_needed(feature),
    }))
}

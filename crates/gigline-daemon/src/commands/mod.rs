//! IPC command handlers.
//!
//! Each submodule implements the commands for one IPC category. Handlers
//! return a JSON value or an [`RpcError`]; domain errors keep their kind in
//! `error.data.kind`.

pub mod deputy;
pub mod gig;
pub mod profile;
pub mod system;
pub mod trust;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;

use gigline_trust::{TrustDirectory, UserTrust};
use gigline_types::{ErrorKind, UserId};

use crate::rpc::RpcError;
use crate::DaemonState;

pub(crate) type Result = std::result::Result<Value, RpcError>;

/// Deserialize the whole params object.
pub(crate) fn parse_params<T: DeserializeOwned>(params: &Value) -> std::result::Result<T, RpcError> {
    serde_json::from_value(params.clone()).map_err(|e| RpcError::invalid_params(&e.to_string()))
}

pub(crate) fn required_str<'a>(params: &'a Value, key: &str) -> std::result::Result<&'a str, RpcError> {
    params
        .get(key)
        .and_then(|v| v.as_str())
        .ok_or_else(|| RpcError::invalid_params(&format!("{key} required")))
}

pub(crate) fn required_user(params: &Value, key: &str) -> std::result::Result<UserId, RpcError> {
    required_str(params, key).map(UserId::new)
}

pub(crate) fn to_json<T: Serialize>(value: &T) -> Result {
    serde_json::to_value(value).map_err(|e| RpcError::internal_error(&e.to_string()))
}

/// Look a user up through stored profiles.
pub(crate) fn lookup_user(state: &DaemonState, user_id: &UserId) -> std::result::Result<UserTrust, RpcError> {
    state
        .trust()
        .lookup(user_id)?
        .ok_or_else(|| RpcError::domain(ErrorKind::NotFound, &format!("user {user_id}")))
}

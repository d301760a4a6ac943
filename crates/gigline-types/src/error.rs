//! Error taxonomy shared by every crate in the workspace.

use std::fmt;

use serde::{Deserialize, Serialize};

/// The recoverable error kinds a core operation can report.
///
/// None of these leave state partially mutated: checks run before any write.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    /// Actor lacks authorization (wrong party, wrong role, trust floor).
    Forbidden,
    /// Requested state change is not reachable from the current state.
    InvalidTransition,
    /// Operation references an invalid relationship, e.g. self-as-deputy.
    InvalidTarget,
    /// A specific trust sub-rule was not met.
    InsufficientTrust,
    /// Optimistic concurrency mismatch.
    Conflict,
    /// Referenced gig, relationship or user does not exist.
    NotFound,
    /// The persistence collaborator failed.
    Storage,
}

impl ErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Forbidden => "forbidden",
            ErrorKind::InvalidTransition => "invalid-transition",
            ErrorKind::InvalidTarget => "invalid-target",
            ErrorKind::InsufficientTrust => "insufficient-trust",
            ErrorKind::Conflict => "conflict",
            ErrorKind::NotFound => "not-found",
            ErrorKind::Storage => "storage",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Errors reported by a persistence collaborator.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    /// The record changed since it was read.
    #[error("stale write: {0}")]
    Conflict(String),

    #[error("not found: {0}")]
    NotFound(String),

    /// Backend failure (I/O, SQL, serialization).
    #[error("store backend error: {0}")]
    Backend(String),
}

impl StoreError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            StoreError::Conflict(_) => ErrorKind::Conflict,
            StoreError::NotFound(_) => ErrorKind::NotFound,
            StoreError::Backend(_) => ErrorKind::Storage,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_wire_names() {
        let json = serde_json::to_string(&ErrorKind::InvalidTransition).expect("serialize");
        assert_eq!(json, "\"invalid-transition\"");
        assert_eq!(ErrorKind::InsufficientTrust.to_string(), "insufficient-trust");
    }

    #[test]
    fn test_store_error_kind() {
        assert_eq!(StoreError::Conflict("gig".into()).kind(), ErrorKind::Conflict);
        assert_eq!(StoreError::NotFound("gig".into()).kind(), ErrorKind::NotFound);
        assert_eq!(StoreError::Backend("io".into()).kind(), ErrorKind::Storage);
    }
}

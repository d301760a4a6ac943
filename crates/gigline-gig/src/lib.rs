//! # gigline-gig
//!
//! Gig invitation lifecycle.
//!
//! A gig starts `pending`. The invited musician accepts, declines or hands it
//! to one of their deputies; the client resolves a deputy suggestion or
//! cancels. Every status change appends exactly one booking history entry,
//! and a transition either lands completely or not at all.
//!
//! ## Modules
//!
//! - [`machine`] — Pure transition rules, idempotency and auto-decline
//! - [`service`] — Orchestration over trust, deputies and persistence
//! - [`store`] — Persistence seam with revision checks

pub mod machine;
pub mod service;
pub mod store;

use gigline_types::{ErrorKind, GigStatus, StoreError};

pub use machine::{Applied, AvailabilityChange, Transition, TransitionContext, TransitionRequest};
pub use service::{GigService, TransitionOutcome};
pub use store::{GigStore, InMemoryGigStore};

/// Error types for gig operations.
#[derive(Debug, thiserror::Error)]
pub enum GigError {
    /// Actor is not the party allowed to perform the transition.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// The transition is not reachable from the current status.
    #[error("invalid transition: {transition} from {from}")]
    InvalidTransition {
        /// Transition that was attempted.
        transition: &'static str,
        /// Status the gig was in.
        from: GigStatus,
    },

    /// Deputy or participant is not acceptable for this gig.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// The gig moved on since the caller read it.
    #[error("conflict: expected {expected}, found {actual}")]
    Conflict {
        /// Status the caller expected.
        expected: GigStatus,
        /// Status currently stored.
        actual: GigStatus,
    },

    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl GigError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            GigError::Forbidden(_) => ErrorKind::Forbidden,
            GigError::InvalidTransition { .. } => ErrorKind::InvalidTransition,
            GigError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            GigError::Conflict { .. } => ErrorKind::Conflict,
            GigError::NotFound(_) => ErrorKind::NotFound,
            GigError::Store(e) => e.kind(),
        }
    }
}

/// Convenience result type for gig operations.
pub type Result<T> = std::result::Result<T, GigError>;

//! # gigline-deputy
//!
//! Deputy delegation: a principal musician names substitutes who may take
//! over gigs the principal cannot play.
//!
//! Relationships move `pending` → `accepted` | `rejected` once, at the
//! deputy's hand. The principal may remove a relationship at any time and
//! may flag an accepted deputy as directly bookable once that deputy holds
//! enough trust.
//!
//! ## Modules
//!
//! - [`manager`] — Trust-gated request, response, removal and settings
//! - [`graph`] — Directed relationship graph and cycle checks
//! - [`store`] — Persistence seam and an in-memory store

pub mod graph;
pub mod manager;
pub mod store;

use gigline_types::{ErrorKind, StoreError, TrustStars};

pub use graph::DeputyGraph;
pub use manager::{
    check_deputy_eligibility, eligible_deputies, DeputyEligibility, DeputyManager, DeputyOutcome,
    DeputyRequest, IneligibleReason,
};
pub use store::{DeputyStore, InMemoryDeputyStore, Insertion};

/// Error types for deputy operations.
#[derive(Debug, thiserror::Error)]
pub enum DeputyError {
    /// Actor is not the party allowed to perform the operation.
    #[error("forbidden: {0}")]
    Forbidden(String),

    /// Self-reference or a relationship that would close a cycle.
    #[error("invalid target: {0}")]
    InvalidTarget(String),

    /// A trust floor for a specific sub-rule is not met.
    #[error("insufficient trust: need {required} stars, have {actual}")]
    InsufficientTrust {
        /// Stars the rule requires.
        required: TrustStars,
        /// Stars the user holds.
        actual: TrustStars,
    },

    /// Relationship status cannot move as requested.
    #[error("invalid transition: {0}")]
    InvalidTransition(String),

    /// User or relationship does not exist.
    #[error("not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DeputyError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DeputyError::Forbidden(_) => ErrorKind::Forbidden,
            DeputyError::InvalidTarget(_) => ErrorKind::InvalidTarget,
            DeputyError::InsufficientTrust { .. } => ErrorKind::InsufficientTrust,
            DeputyError::InvalidTransition(_) => ErrorKind::InvalidTransition,
            DeputyError::NotFound(_) => ErrorKind::NotFound,
            DeputyError::Store(e) => e.kind(),
        }
    }
}

/// Convenience result type for deputy operations.
pub type Result<T> = std::result::Result<T, DeputyError>;

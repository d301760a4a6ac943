//! # gigline-types
//!
//! Shared domain types for the gig delegation core: users and their signal
//! snapshots, trust ratings, deputy relationships, gigs and their booking
//! history, and the error taxonomy every crate reports through.

pub mod deputy;
pub mod error;
pub mod gig;
pub mod thresholds;
pub mod trust;
pub mod user;

pub use deputy::{DeputyRelationship, DeputySettings, DeputyStatus};
pub use error::{ErrorKind, StoreError};
pub use gig::{ActionBy, Availability, BookingHistoryEntry, Gig, GigId, GigStatus};
pub use trust::{Feature, ScoreBreakdown, TrustAssessment, TrustStars, TrustTier};
pub use user::{Role, RoleSet, SignalSnapshot, SubscriptionTier, UserId, UserProfile};

/// Seconds in one day. All timestamps are Unix epoch seconds.
pub const SECS_PER_DAY: u64 = 86_400;

//! # gigline-trust
//!
//! Trust scoring and trust-gated feature eligibility.
//!
//! A user's trust score is derived on demand from a read-only signal
//! snapshot. It is never stored as a source of truth; [`cache`] only
//! memoises results keyed by a hash of the snapshot itself.
//!
//! ## Modules
//!
//! - [`engine`] — Weighted signal scoring, star and tier mapping
//! - [`cache`] — Snapshot-keyed memoisation of assessments
//! - [`gate`] — Per-role feature thresholds and the grace-period flag override
//! - [`directory`] — Provider seams and the trust lookup used by delegation

pub mod cache;
pub mod directory;
pub mod engine;
pub mod gate;

pub use cache::CachedEngine;
pub use directory::{
    GracePeriodProvider, ProfileDirectory, ProfileProvider, TrustDirectory, UserTrust,
};
pub use engine::{assess, assessment_for_score, score_to_stars};
pub use gate::{effective_subscription_tier, FeatureEligibilityGate, NextFeature};

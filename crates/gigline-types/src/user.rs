//! Users, role capabilities and the signal snapshot the trust engine reads.
//!
//! Signals are owned by the external profile/activity collaborator. Every
//! field defaults to "absent" so a partially populated snapshot deserializes
//! cleanly and scores as zero for whatever is missing.

use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

/// Opaque, immutable user identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct UserId(pub String);

impl UserId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for UserId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

/// A capability a user holds on the marketplace.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Musician,
    Client,
    Booker,
}

/// The set of capabilities a user holds. Roles overlap: a musician may also
/// book other musicians as a client.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct RoleSet(BTreeSet<Role>);

impl RoleSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn single(role: Role) -> Self {
        Self::new().with(role)
    }

    pub fn with(mut self, role: Role) -> Self {
        self.0.insert(role);
        self
    }

    pub fn contains(&self, role: Role) -> bool {
        self.0.contains(&role)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.0.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Paid subscription tier. Contributes to the social score only.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS,
)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum SubscriptionTier {
    #[default]
    Free,
    Pro,
    Premium,
    Elite,
}

/// A user as supplied by the profile collaborator.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct UserProfile {
    pub user_id: UserId,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub roles: RoleSet,
    #[serde(default)]
    pub signals: SignalSnapshot,
}

/// Read-only snapshot of every signal the trust engine scores.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct SignalSnapshot {
    pub profile: ProfileSignals,
    pub longevity: LongevitySignals,
    pub activity: ActivitySignals,
    pub quality: QualitySignals,
    pub content: ContentSignals,
    pub social: SocialSignals,
    pub penalties: PenaltySignals,
}

/// Profile completeness items.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct ProfileSignals {
    pub has_first_name: bool,
    pub has_last_name: bool,
    pub has_email: bool,
    pub has_phone: bool,
    pub has_profile_picture: bool,
    pub has_city: bool,
    pub has_date_of_birth: bool,
    /// Instruments (musicians) or talent category (clients/bookers) set.
    pub has_instruments: bool,
    pub identity_verified: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct LongevitySignals {
    /// Account creation time.
    pub created_at: Option<u64>,
    /// Instant the snapshot was taken. Account age is measured against this,
    /// never against the wall clock.
    pub as_of: Option<u64>,
    /// Distinct calendar months with any activity.
    pub active_months: u32,
    pub onboarding_complete: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct ActivitySignals {
    pub completed_gigs: u32,
    pub gigs_posted: u32,
    pub deputy_bookings_completed: u32,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct QualitySignals {
    /// Mean review rating on a 0-5 scale.
    pub average_rating: Option<f32>,
    pub review_count: u32,
    /// Share of messages answered, 0-100.
    pub response_rate_pct: Option<u8>,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct ContentSignals {
    /// Bio length in characters.
    pub bio_length: u32,
    pub skills: Vec<String>,
    /// Uploaded videos, audio and photos.
    pub media_count: u32,
    pub has_social_links: bool,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct SocialSignals {
    pub followers: u32,
    pub subscription_tier: SubscriptionTier,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct PenaltySignals {
    pub reports: u32,
    pub cancellations: u32,
    pub no_shows: u32,
}

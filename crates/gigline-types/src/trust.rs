//! Trust ratings: stars, named tiers, per-category breakdown and the feature
//! names the eligibility gate answers for.

use std::fmt;

use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// A 0.5-5.0 star rating in half-star steps.
///
/// Stored as a count of half stars so threshold comparisons are exact.
/// Serialized as a plain number (`3.5`).
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TrustStars(u8);

impl TrustStars {
    /// Lowest rating (0.5 stars).
    pub const MIN: Self = Self(1);
    /// Highest rating (5.0 stars).
    pub const MAX: Self = Self(10);

    /// Build a rating from a half-star count, clamped to `1..=10`.
    pub const fn from_halves(halves: u8) -> Self {
        if halves < Self::MIN.0 {
            Self::MIN
        } else if halves > Self::MAX.0 {
            Self::MAX
        } else {
            Self(halves)
        }
    }

    /// Build a rating from a star value, rounding down to the nearest half.
    pub fn from_f32(stars: f32) -> Self {
        if stars.is_nan() {
            return Self::MIN;
        }
        // `as` saturates out-of-range floats.
        Self::from_halves((stars * 2.0).floor() as u8)
    }

    pub const fn halves(self) -> u8 {
        self.0
    }

    pub fn as_f32(self) -> f32 {
        f32::from(self.0) / 2.0
    }
}

impl fmt::Display for TrustStars {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.as_f32())
    }
}

impl Serialize for TrustStars {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f32(self.as_f32())
    }
}

impl<'de> Deserialize<'de> for TrustStars {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let stars = f32::deserialize(deserializer)?;
        Ok(Self::from_f32(stars))
    }
}

/// Named trust band derived from stars.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum TrustTier {
    /// Below 2.0 stars.
    New,
    /// 2.0 up to 3.0.
    Basic,
    /// 3.0 up to 4.0.
    Verified,
    /// 4.0 up to 4.5.
    Trusted,
    /// 4.5 and above.
    Elite,
}

impl TrustTier {
    pub fn from_stars(stars: TrustStars) -> Self {
        match stars.halves() {
            0..=3 => Self::New,
            4..=5 => Self::Basic,
            6..=7 => Self::Verified,
            8 => Self::Trusted,
            _ => Self::Elite,
        }
    }
}

/// Points contributed by each signal category, after section caps.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct ScoreBreakdown {
    pub profile: i32,
    pub longevity: i32,
    pub activity: i32,
    pub quality: i32,
    pub content: i32,
    pub social: i32,
    /// Always zero or negative.
    pub penalties: i32,
}

impl ScoreBreakdown {
    /// Sum of all categories before clamping to `[0, 100]`.
    pub fn raw_total(&self) -> i32 {
        [
            self.profile,
            self.longevity,
            self.activity,
            self.quality,
            self.content,
            self.social,
            self.penalties,
        ]
        .into_iter()
        .fold(0i32, i32::saturating_add)
    }
}

/// The derived trust triple for a user, plus the breakdown it came from.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct TrustAssessment {
    /// 0-100.
    pub score: u8,
    #[ts(type = "number")]
    pub stars: TrustStars,
    pub tier: TrustTier,
    pub breakdown: ScoreBreakdown,
}

/// A trust-gated marketplace capability.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub enum Feature {
    #[serde(rename = "canMessage")]
    Message,
    #[serde(rename = "canApplyToGigs")]
    ApplyToGigs,
    #[serde(rename = "canBeDeputy")]
    BeDeputy,
    #[serde(rename = "canShowReliableBadge")]
    ShowReliableBadge,
    #[serde(rename = "canBeBookedDirectly")]
    BeBookedDirectly,
    /// Work through deputies (add and delegate to substitutes).
    #[serde(rename = "canBeDual")]
    BeDual,
    #[serde(rename = "canPostBasicGigs")]
    PostBasicGigs,
    #[serde(rename = "canPostPremiumGigs")]
    PostPremiumGigs,
    #[serde(rename = "canHostEvents")]
    HostEvents,
    #[serde(rename = "canHireDirectly")]
    HireDirectly,
    #[serde(rename = "canManageArtists")]
    ManageArtists,
    #[serde(rename = "canCreateEvents")]
    CreateEvents,
}

impl Feature {
    pub const ALL: [Feature; 12] = [
        Feature::Message,
        Feature::ApplyToGigs,
        Feature::BeDeputy,
        Feature::ShowReliableBadge,
        Feature::BeBookedDirectly,
        Feature::BeDual,
        Feature::PostBasicGigs,
        Feature::PostPremiumGigs,
        Feature::HostEvents,
        Feature::HireDirectly,
        Feature::ManageArtists,
        Feature::CreateEvents,
    ];

    /// The wire name, e.g. `canBeDual`.
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Message => "canMessage",
            Feature::ApplyToGigs => "canApplyToGigs",
            Feature::BeDeputy => "canBeDeputy",
            Feature::ShowReliableBadge => "canShowReliableBadge",
            Feature::BeBookedDirectly => "canBeBookedDirectly",
            Feature::BeDual => "canBeDual",
            Feature::PostBasicGigs => "canPostBasicGigs",
            Feature::PostPremiumGigs => "canPostPremiumGigs",
            Feature::HostEvents => "canHostEvents",
            Feature::HireDirectly => "canHireDirectly",
            Feature::ManageArtists => "canManageArtists",
            Feature::CreateEvents => "canCreateEvents",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stars_clamp() {
        assert_eq!(TrustStars::from_halves(0), TrustStars::MIN);
        assert_eq!(TrustStars::from_halves(42), TrustStars::MAX);
        assert_eq!(TrustStars::from_f32(-3.0), TrustStars::MIN);
        assert_eq!(TrustStars::from_f32(9.0), TrustStars::MAX);
        assert_eq!(TrustStars::from_f32(f32::NAN), TrustStars::MIN);
    }

    #[test]
    fn test_stars_round_down_to_half() {
        assert_eq!(TrustStars::from_f32(2.9).halves(), 5);
        assert_eq!(TrustStars::from_f32(3.0).halves(), 6);
        assert_eq!(TrustStars::from_f32(4.2).halves(), 8);
    }

    #[test]
    fn test_stars_serialize_as_number() {
        let json = serde_json::to_string(&TrustStars::from_halves(7)).expect("serialize");
        assert_eq!(json, "3.5");
        let back: TrustStars = serde_json::from_str("4.0").expect("parse");
        assert_eq!(back.halves(), 8);
        assert_eq!(back.to_string(), "4.0");
    }

    #[test]
    fn test_tier_boundaries() {
        let tier = |halves| TrustTier::from_stars(TrustStars::from_halves(halves));
        assert_eq!(tier(3), TrustTier::New);
        assert_eq!(tier(4), TrustTier::Basic);
        assert_eq!(tier(5), TrustTier::Basic);
        assert_eq!(tier(6), TrustTier::Verified);
        assert_eq!(tier(7), TrustTier::Verified);
        assert_eq!(tier(8), TrustTier::Trusted);
        assert_eq!(tier(9), TrustTier::Elite);
        assert_eq!(tier(10), TrustTier::Elite);
    }

    #[test]
    fn test_feature_wire_names() {
        for feature in Feature::ALL {
            let json = serde_json::to_string(&feature).expect("serialize");
            assert_eq!(json, format!("\"{}\"", feature.as_str()));
        }
        let parsed: Feature = serde_json::from_str("\"canBeDual\"").expect("parse");
        assert_eq!(parsed, Feature::BeDual);
    }

    #[test]
    fn test_breakdown_raw_total() {
        let breakdown = ScoreBreakdown {
            profile: 25,
            longevity: 10,
            activity: 40,
            quality: 20,
            content: 15,
            social: 10,
            penalties: -15,
        };
        assert_eq!(breakdown.raw_total(), 105);
    }
}

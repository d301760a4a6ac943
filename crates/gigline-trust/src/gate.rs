//! Trust-gated feature eligibility.
//!
//! Each role carries its own table of feature → minimum trust score. A user
//! holding several roles is evaluated against the union of their tables: a
//! feature's effective threshold is the lowest one among the user's roles
//! that list it. Features no role lists are never accessible.

use std::collections::BTreeMap;

use gigline_types::{Feature, Role, RoleSet, SubscriptionTier};
use serde::Serialize;

use crate::engine::score_to_stars;

const MUSICIAN_THRESHOLDS: [(Feature, u8); 8] = [
    (Feature::Message, 10),
    (Feature::ApplyToGigs, 20),
    (Feature::BeDeputy, 35),
    (Feature::ShowReliableBadge, 50),
    (Feature::BeBookedDirectly, 55),
    (Feature::BeDual, 60),
    (Feature::PostPremiumGigs, 70),
    (Feature::HostEvents, 80),
];

const CLIENT_THRESHOLDS: [(Feature, u8); 5] = [
    (Feature::Message, 10),
    (Feature::PostBasicGigs, 15),
    (Feature::PostPremiumGigs, 45),
    (Feature::ShowReliableBadge, 50),
    (Feature::HireDirectly, 75),
];

const BOOKER_THRESHOLDS: [(Feature, u8); 5] = [
    (Feature::Message, 10),
    (Feature::ManageArtists, 40),
    (Feature::CreateEvents, 50),
    (Feature::PostPremiumGigs, 60),
    (Feature::HireDirectly, 75),
];

/// The feature table for one role.
pub fn role_thresholds(role: Role) -> &'static [(Feature, u8)] {
    match role {
        Role::Musician => &MUSICIAN_THRESHOLDS,
        Role::Client => &CLIENT_THRESHOLDS,
        Role::Booker => &BOOKER_THRESHOLDS,
    }
}

/// Minimum score for `feature` under a single role.
pub fn threshold(role: Role, feature: Feature) -> Option<u8> {
    role_thresholds(role)
        .iter()
        .find(|(f, _)| *f == feature)
        .map(|(_, min)| *min)
}

/// Guidance toward the next feature a user can unlock.
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct NextFeature {
    pub feature: Feature,
    pub threshold: u8,
    /// Score points still missing.
    pub score_gap: u8,
    /// Display-only star figure for the gap.
    pub stars_needed: f32,
}

/// Answers "can this user use feature F" for one role set and score.
#[derive(Clone, Copy, Debug)]
pub struct FeatureEligibilityGate<'a> {
    roles: &'a RoleSet,
    score: u8,
}

impl<'a> FeatureEligibilityGate<'a> {
    pub fn new(roles: &'a RoleSet, score: u8) -> Self {
        Self { roles, score }
    }

    pub fn score(&self) -> u8 {
        self.score
    }

    /// Effective threshold across all of the user's roles.
    pub fn threshold(&self, feature: Feature) -> Option<u8> {
        self.roles
            .iter()
            .filter_map(|role| threshold(role, feature))
            .min()
    }

    pub fn can_access(&self, feature: Feature) -> bool {
        self.threshold(feature)
            .is_some_and(|min| self.score >= min)
    }

    /// Stars still needed to reach `feature`, for user-facing messaging.
    ///
    /// Zero when already unlocked, `None` when no role offers the feature.
    pub fn stars_needed(&self, feature: Feature) -> Option<f32> {
        let min = self.threshold(feature)?;
        let gap = score_to_stars(min)
            .halves()
            .saturating_sub(score_to_stars(self.score).halves());
        Some(f32::from(gap) / 2.0)
    }

    /// Every feature the roles offer, with whether it is unlocked.
    pub fn eligibility(&self) -> BTreeMap<Feature, bool> {
        self.offered()
            .into_iter()
            .map(|(feature, min)| (feature, self.score >= min))
            .collect()
    }

    /// The locked feature with the lowest threshold, or `None` once every
    /// offered feature is unlocked.
    pub fn next_feature(&self) -> Option<NextFeature> {
        self.offered()
            .into_iter()
            .filter(|(_, min)| self.score < *min)
            .min_by_key(|(feature, min)| (*min, *feature))
            .map(|(feature, min)| NextFeature {
                feature,
                threshold: min,
                score_gap: min - self.score,
                stars_needed: self.stars_needed(feature).unwrap_or(0.0),
            })
    }

    fn offered(&self) -> BTreeMap<Feature, u8> {
        let mut offered = BTreeMap::new();
        for role in self.roles.iter() {
            for (feature, min) in role_thresholds(role) {
                offered
                    .entry(*feature)
                    .and_modify(|current: &mut u8| *current = (*current).min(*min))
                    .or_insert(*min);
            }
        }
        offered
    }
}

/// Subscription tier used for flag-based rollout checks.
///
/// During an externally reported grace period the user is treated as at
/// least `pro`. Trust scoring and trust gates never see this value.
pub fn effective_subscription_tier(
    tier: SubscriptionTier,
    in_grace_period: bool,
) -> SubscriptionTier {
    if in_grace_period {
        tier.max(SubscriptionTier::Pro)
    } else {
        tier
    }
}

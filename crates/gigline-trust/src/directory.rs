//! Provider seams and the trust lookup consumed by delegation.
//!
//! The profile/activity collaborator supplies signal snapshots, and the
//! trial/billing collaborator supplies the grace-period flag. This crate only
//! reads them.

use std::collections::HashMap;

use gigline_types::{
    RoleSet, StoreError, TrustAssessment, TrustStars, UserId, UserProfile,
};

use crate::cache::CachedEngine;
use crate::engine::assessment_for_score;
use crate::gate::FeatureEligibilityGate;

/// Supplies user profiles and their signal snapshots.
pub trait ProfileProvider {
    fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError>;
}

/// Supplies whether a user is inside a trial grace period.
pub trait GracePeriodProvider {
    fn is_in_grace_period(&self, user_id: &UserId) -> Result<bool, StoreError>;
}

impl ProfileProvider for HashMap<UserId, UserProfile> {
    fn profile(&self, user_id: &UserId) -> Result<Option<UserProfile>, StoreError> {
        Ok(self.get(user_id).cloned())
    }
}

/// A user's roles, skills and current trust assessment.
#[derive(Clone, Debug, PartialEq)]
pub struct UserTrust {
    pub user_id: UserId,
    pub display_name: Option<String>,
    pub roles: RoleSet,
    pub skills: Vec<String>,
    pub assessment: TrustAssessment,
}

impl UserTrust {
    /// Assess a profile through the given engine.
    pub fn from_profile(profile: UserProfile, engine: &CachedEngine) -> Self {
        let assessment = engine.assess(&profile.signals);
        Self {
            user_id: profile.user_id,
            display_name: profile.display_name,
            roles: profile.roles,
            skills: profile.signals.content.skills,
            assessment,
        }
    }

    /// A user with a known score and no profile detail.
    pub fn with_score(user_id: UserId, roles: RoleSet, score: u8) -> Self {
        Self {
            user_id,
            display_name: None,
            roles,
            skills: Vec::new(),
            assessment: assessment_for_score(score),
        }
    }

    pub fn with_skills(mut self, skills: &[&str]) -> Self {
        self.skills = skills.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn score(&self) -> u8 {
        self.assessment.score
    }

    pub fn stars(&self) -> TrustStars {
        self.assessment.stars
    }

    pub fn gate(&self) -> FeatureEligibilityGate<'_> {
        FeatureEligibilityGate::new(&self.roles, self.assessment.score)
    }

    /// Case-insensitive skill match. An empty skill matches anyone.
    pub fn has_skill(&self, skill: &str) -> bool {
        let skill = skill.trim();
        skill.is_empty() || self.skills.iter().any(|s| s.trim().eq_ignore_ascii_case(skill))
    }
}

/// Looks up a user's current trust.
pub trait TrustDirectory {
    fn lookup(&self, user_id: &UserId) -> Result<Option<UserTrust>, StoreError>;
}

impl TrustDirectory for HashMap<UserId, UserTrust> {
    fn lookup(&self, user_id: &UserId) -> Result<Option<UserTrust>, StoreError> {
        Ok(self.get(user_id).cloned())
    }
}

/// Derives trust on demand from a profile provider.
pub struct ProfileDirectory<'a, P> {
    provider: &'a P,
    engine: &'a CachedEngine,
}

impl<'a, P: ProfileProvider> ProfileDirectory<'a, P> {
    pub fn new(provider: &'a P, engine: &'a CachedEngine) -> Self {
        Self { provider, engine }
    }
}

impl<P: ProfileProvider> TrustDirectory for ProfileDirectory<'_, P> {
    fn lookup(&self, user_id: &UserId) -> Result<Option<UserTrust>, StoreError> {
        Ok(self
            .provider
            .profile(user_id)?
            .map(|profile| UserTrust::from_profile(profile, self.engine)))
    }
}

//! End-to-end tests for the gigline core.
//!
//! The tests under `tests/` drive the trust, deputy and gig crates against a
//! real [`SqliteStore`], the same way the daemon does. This library only
//! holds the profiles and helpers they share.
//!
//! ```sh
//! cargo test -p gigline-integration-tests
//! ```

use std::path::PathBuf;

use gigline_db::SqliteStore;
use gigline_deputy::{DeputyManager, DeputyRequest};
use gigline_trust::{CachedEngine, ProfileDirectory};
use gigline_types::user::{
    ActivitySignals, ContentSignals, LongevitySignals, ProfileSignals, QualitySignals,
    SocialSignals,
};
use gigline_types::{
    DeputySettings, DeputyStatus, Role, RoleSet, SignalSnapshot, SubscriptionTier, UserId,
    UserProfile, SECS_PER_DAY,
};

/// Simulated "now" for deterministic runs.
pub const TEST_TIMESTAMP: u64 = 1_700_000_000;

/// Every profile item filled in. Worth the full 25 points.
fn complete_profile() -> ProfileSignals {
    ProfileSignals {
        has_first_name: true,
        has_last_name: true,
        has_email: true,
        has_phone: true,
        has_profile_picture: true,
        has_city: true,
        has_date_of_birth: true,
        has_instruments: true,
        identity_verified: true,
    }
}

/// Two-year-old account, active every month. Worth the full 10 points.
fn veteran_longevity() -> LongevitySignals {
    LongevitySignals {
        created_at: Some(TEST_TIMESTAMP - 800 * SECS_PER_DAY),
        as_of: Some(TEST_TIMESTAMP),
        active_months: 12,
        onboarding_complete: true,
    }
}

/// An established musician: score 80, 4.0 stars.
pub fn established_signals() -> SignalSnapshot {
    SignalSnapshot {
        profile: complete_profile(),
        longevity: veteran_longevity(),
        quality: QualitySignals {
            average_rating: Some(4.9),
            review_count: 40,
            response_rate_pct: Some(95),
        },
        content: ContentSignals {
            bio_length: 320,
            skills: vec!["Drums".into(), "Percussion".into(), "Vocals".into()],
            media_count: 6,
            has_social_links: true,
        },
        social: SocialSignals {
            followers: 250,
            subscription_tier: SubscriptionTier::Elite,
        },
        ..SignalSnapshot::default()
    }
}

/// A solid substitute: score 60, 3.0 stars.
pub fn substitute_signals() -> SignalSnapshot {
    SignalSnapshot {
        profile: complete_profile(),
        longevity: veteran_longevity(),
        activity: ActivitySignals {
            completed_gigs: 2,
            ..ActivitySignals::default()
        },
        quality: QualitySignals {
            average_rating: Some(4.1),
            review_count: 4,
            response_rate_pct: Some(80),
        },
        content: ContentSignals {
            bio_length: 40,
            skills: vec!["Drums".into()],
            ..ContentSignals::default()
        },
        social: SocialSignals {
            followers: 60,
            subscription_tier: SubscriptionTier::Pro,
        },
        ..SignalSnapshot::default()
    }
}

/// Signals worth exactly `score` points, built from completed gigs plus one
/// posted gig when odd.
pub fn signals_for_score(score: u8) -> SignalSnapshot {
    SignalSnapshot {
        activity: ActivitySignals {
            completed_gigs: u32::from(score / 2),
            gigs_posted: u32::from(score % 2),
            deputy_bookings_completed: 0,
        },
        ..SignalSnapshot::default()
    }
}

pub fn profile(id: &str, roles: &[Role], signals: SignalSnapshot) -> UserProfile {
    UserProfile {
        user_id: id.into(),
        display_name: Some(format!("User {id}")),
        roles: roles.iter().copied().collect::<RoleSet>(),
        signals,
    }
}

/// A store and engine with a few users already synced.
pub struct Harness {
    pub store: SqliteStore,
    pub engine: CachedEngine,
}

impl Harness {
    pub fn new() -> Self {
        Self::with_store(SqliteStore::open_memory().expect("open in-memory store"))
    }

    pub fn with_store(store: SqliteStore) -> Self {
        Self {
            store,
            engine: CachedEngine::default(),
        }
    }

    pub fn sync(&self, profile: &UserProfile) {
        self.store
            .sync_profile(profile, false, TEST_TIMESTAMP)
            .expect("sync profile");
    }

    pub fn add_user(&self, id: &str, roles: &[Role], score: u8) {
        self.sync(&profile(id, roles, signals_for_score(score)));
    }

    pub fn trust(&self) -> ProfileDirectory<'_, SqliteStore> {
        ProfileDirectory::new(&self.store, &self.engine)
    }

    /// Send, accept and mark bookable in one go.
    pub fn bookable_deputy(&self, principal: &str, deputy: &str) {
        let trust = self.trust();
        let manager = DeputyManager::new(&self.store, &trust);
        manager
            .send_deputy_request(
                DeputyRequest {
                    principal_id: principal.into(),
                    deputy_id: deputy.into(),
                    for_skill: "Drums".into(),
                    gig_type: None,
                    note: None,
                },
                TEST_TIMESTAMP,
            )
            .expect("send deputy request");
        let deputy_id = UserId::new(deputy);
        manager
            .respond_to_deputy_request(
                &deputy_id,
                &deputy_id,
                &principal.into(),
                DeputyStatus::Accepted,
                TEST_TIMESTAMP + 60,
            )
            .expect("accept deputy request");
        manager
            .update_deputy_settings(
                &principal.into(),
                &principal.into(),
                &deputy_id,
                DeputySettings {
                    can_be_booked: Some(true),
                    ..DeputySettings::default()
                },
            )
            .expect("mark bookable");
    }
}

impl Default for Harness {
    fn default() -> Self {
        Self::new()
    }
}

/// A unique database path under the system temp directory.
pub fn temp_db_path() -> PathBuf {
    let mut suffix = [0u8; 8];
    rand::RngCore::fill_bytes(&mut rand::thread_rng(), &mut suffix);
    std::env::temp_dir().join(format!("gigline-test-{}.db", hex::encode(suffix)))
}

//! Weighted trust scoring.
//!
//! The score is the sum of seven signal categories, each capped at its own
//! section maximum, then clamped to `[0, 100]`:
//!
//! | Category  | Cap | Items |
//! |-----------|-----|-------|
//! | profile   | 25  | names, email, phone, picture, city, birth date, instruments, ID check |
//! | longevity | 10  | account age, active months, onboarding |
//! | activity  | -   | completed gigs, gigs posted, deputy bookings |
//! | quality   | 20  | average rating, review count, response rate |
//! | content   | 15  | bio, skills, media, social links |
//! | social    | 10  | followers, subscription tier |
//! | penalties | ≤ 0 | reports, cancellations, no-shows |
//!
//! Scoring is a pure function of the snapshot. Missing signals contribute
//! zero; nothing here can fail.

use gigline_types::thresholds::MAX_SCORE;
use gigline_types::user::{
    ActivitySignals, ContentSignals, LongevitySignals, PenaltySignals, ProfileSignals,
    QualitySignals, SocialSignals,
};
use gigline_types::{
    ScoreBreakdown, SignalSnapshot, SubscriptionTier, TrustAssessment, TrustStars, TrustTier,
    SECS_PER_DAY,
};

pub const PROFILE_CAP: i32 = 25;
pub const LONGEVITY_CAP: i32 = 10;
pub const QUALITY_CAP: i32 = 20;
pub const CONTENT_CAP: i32 = 15;
pub const SOCIAL_CAP: i32 = 10;

/// Account age in days → points.
const ACCOUNT_AGE_STEPS: [(u64, i32); 5] = [(30, 1), (90, 2), (180, 3), (365, 4), (730, 5)];
const ACTIVE_MONTH_STEPS: [(u32, i32); 3] = [(3, 1), (6, 2), (12, 3)];
const RATING_STEPS: [(f32, i32); 4] = [(3.5, 3), (4.0, 6), (4.5, 8), (4.8, 10)];
const REVIEW_COUNT_STEPS: [(u32, i32); 2] = [(3, 2), (10, 5)];
const RESPONSE_RATE_STEPS: [(u8, i32); 3] = [(50, 1), (75, 3), (90, 5)];
const BIO_LENGTH_STEPS: [(u32, i32); 2] = [(1, 2), (100, 4)];
const SKILL_COUNT_STEPS: [(usize, i32); 2] = [(1, 2), (3, 4)];
const MEDIA_COUNT_STEPS: [(u32, i32); 2] = [(1, 3), (3, 5)];
const FOLLOWER_STEPS: [(u32, i32); 3] = [(10, 2), (50, 4), (200, 6)];

/// Score → half stars. Below 15 is 0.5 stars.
const STAR_STEPS: [(u8, u8); 9] = [
    (15, 2),
    (25, 3),
    (35, 4),
    (45, 5),
    (55, 6),
    (65, 7),
    (75, 8),
    (85, 9),
    (95, 10),
];

const REPORT_PENALTY: i64 = -3;
const REPORT_PENALTY_FLOOR: i64 = -15;
const CANCELLATION_PENALTY: i64 = -4;
const CANCELLATION_PENALTY_FLOOR: i64 = -20;
const NO_SHOW_PENALTY: i32 = -10;

/// Points for the highest step `value` reaches, or zero.
fn step<T: PartialOrd + Copy>(value: T, steps: &[(T, i32)]) -> i32 {
    steps
        .iter()
        .rev()
        .find(|(threshold, _)| value >= *threshold)
        .map_or(0, |(_, points)| *points)
}

fn flag(set: bool, points: i32) -> i32 {
    if set {
        points
    } else {
        0
    }
}

fn per_item(count: u32, points: i32) -> i32 {
    i32::try_from(count)
        .unwrap_or(i32::MAX)
        .saturating_mul(points)
}

fn floored_penalty(count: u32, per_item: i64, floor: i64) -> i32 {
    let raw = i64::from(count).saturating_mul(per_item).max(floor);
    // `floor` keeps this within i32 range.
    i32::try_from(raw).unwrap_or(i32::MIN)
}

fn profile_points(p: &ProfileSignals) -> i32 {
    let sum = flag(p.has_first_name, 2)
        + flag(p.has_last_name, 2)
        + flag(p.has_email, 2)
        + flag(p.has_phone, 3)
        + flag(p.has_profile_picture, 4)
        + flag(p.has_city, 2)
        + flag(p.has_date_of_birth, 2)
        + flag(p.has_instruments, 3)
        + flag(p.identity_verified, 6);
    sum.min(PROFILE_CAP)
}

/// Whole days between account creation and the snapshot instant.
pub fn account_age_days(l: &LongevitySignals) -> Option<u64> {
    let (created_at, as_of) = (l.created_at?, l.as_of?);
    Some(as_of.saturating_sub(created_at) / SECS_PER_DAY)
}

fn longevity_points(l: &LongevitySignals) -> i32 {
    let age = account_age_days(l).map_or(0, |days| step(days, &ACCOUNT_AGE_STEPS));
    let sum = age + step(l.active_months, &ACTIVE_MONTH_STEPS) + flag(l.onboarding_complete, 2);
    sum.min(LONGEVITY_CAP)
}

fn activity_points(a: &ActivitySignals) -> i32 {
    per_item(a.completed_gigs, 2)
        .saturating_add(per_item(a.gigs_posted, 1))
        .saturating_add(per_item(a.deputy_bookings_completed, 2))
}

fn quality_points(q: &QualitySignals) -> i32 {
    let rating = q.average_rating.map_or(0, |r| step(r, &RATING_STEPS));
    let response = q
        .response_rate_pct
        .map_or(0, |pct| step(pct, &RESPONSE_RATE_STEPS));
    let sum = rating + step(q.review_count, &REVIEW_COUNT_STEPS) + response;
    sum.min(QUALITY_CAP)
}

fn content_points(c: &ContentSignals) -> i32 {
    let sum = step(c.bio_length, &BIO_LENGTH_STEPS)
        + step(c.skills.len(), &SKILL_COUNT_STEPS)
        + step(c.media_count, &MEDIA_COUNT_STEPS)
        + flag(c.has_social_links, 2);
    sum.min(CONTENT_CAP)
}

fn tier_points(tier: SubscriptionTier) -> i32 {
    match tier {
        SubscriptionTier::Free => 0,
        SubscriptionTier::Pro => 2,
        SubscriptionTier::Premium => 3,
        SubscriptionTier::Elite => 4,
    }
}

fn social_points(s: &SocialSignals) -> i32 {
    let sum = step(s.followers, &FOLLOWER_STEPS) + tier_points(s.subscription_tier);
    sum.min(SOCIAL_CAP)
}

fn penalty_points(p: &PenaltySignals) -> i32 {
    floored_penalty(p.reports, REPORT_PENALTY, REPORT_PENALTY_FLOOR)
        .saturating_add(floored_penalty(
            p.cancellations,
            CANCELLATION_PENALTY,
            CANCELLATION_PENALTY_FLOOR,
        ))
        .saturating_add(per_item(p.no_shows, NO_SHOW_PENALTY))
}

/// Per-category points for a snapshot.
pub fn breakdown(snapshot: &SignalSnapshot) -> ScoreBreakdown {
    ScoreBreakdown {
        profile: profile_points(&snapshot.profile),
        longevity: longevity_points(&snapshot.longevity),
        activity: activity_points(&snapshot.activity),
        quality: quality_points(&snapshot.quality),
        content: content_points(&snapshot.content),
        social: social_points(&snapshot.social),
        penalties: penalty_points(&snapshot.penalties),
    }
}

/// Map a 0-100 score to a star rating. Monotonic non-decreasing.
pub fn score_to_stars(score: u8) -> TrustStars {
    let halves = STAR_STEPS
        .iter()
        .rev()
        .find(|(threshold, _)| score >= *threshold)
        .map_or(TrustStars::MIN.halves(), |(_, halves)| *halves);
    TrustStars::from_halves(halves)
}

/// Lowest score that earns at least `stars`.
pub fn min_score_for_stars(stars: TrustStars) -> u8 {
    if stars <= TrustStars::MIN {
        return 0;
    }
    STAR_STEPS
        .iter()
        .find(|(_, halves)| *halves >= stars.halves())
        .map_or(0, |(threshold, _)| *threshold)
}

fn clamp_score(raw: i32) -> u8 {
    // Clamped into 0..=MAX_SCORE, so the conversion cannot fail.
    u8::try_from(raw.clamp(0, i32::from(MAX_SCORE))).unwrap_or(0)
}

/// Compute the trust triple for a snapshot.
pub fn assess(snapshot: &SignalSnapshot) -> TrustAssessment {
    let breakdown = breakdown(snapshot);
    let score = clamp_score(breakdown.raw_total());
    let stars = score_to_stars(score);
    TrustAssessment {
        score,
        stars,
        tier: TrustTier::from_stars(stars),
        breakdown,
    }
}

/// An assessment for a known score, with an empty breakdown.
///
/// Used by hosts that receive a materialised score from elsewhere.
pub fn assessment_for_score(score: u8) -> TrustAssessment {
    let score = score.min(MAX_SCORE);
    let stars = score_to_stars(score);
    TrustAssessment {
        score,
        stars,
        tier: TrustTier::from_stars(stars),
        breakdown: ScoreBreakdown::default(),
    }
}

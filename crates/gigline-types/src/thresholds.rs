//! Fixed trust thresholds shared by the delegation core and its consumers.
//!
//! These values are part of the marketplace rules and are not configurable.
//! Search and recommendation code must read them from here as well.

use crate::TrustStars;

/// Minimum stars a principal needs to send a deputy request (4.0).
pub const ADD_DEPUTY_MIN_STARS: TrustStars = TrustStars::from_halves(8);

/// Minimum stars to act as anyone's deputy (2.0).
pub const BE_DEPUTY_MIN_STARS: TrustStars = TrustStars::from_halves(4);

/// Minimum stars a principal needs to see the add-deputy hint (2.0).
pub const PRINCIPAL_HINT_MIN_STARS: TrustStars = TrustStars::from_halves(4);

/// Minimum stars for a deputy to be marked directly bookable (3.0).
pub const BOOKABLE_MIN_STARS: TrustStars = TrustStars::from_halves(6);

/// Minimum stars for a client to hire without prior contact (4.0).
pub const DIRECT_HIRE_MIN_STARS: TrustStars = TrustStars::from_halves(8);

/// Minimum trust score for a user to count as reliable.
pub const RELIABLE_MIN_SCORE: u8 = 50;

/// Highest possible trust score.
pub const MAX_SCORE: u8 = 100;

/// Whether a trust score meets the reliable floor.
pub fn is_reliable(score: u8) -> bool {
    score >= RELIABLE_MIN_SCORE
}

/// Whether a musician may be hired directly, without contact first.
pub fn can_hire_directly(stars: TrustStars) -> bool {
    stars >= DIRECT_HIRE_MIN_STARS
}

//! Principal-to-deputy relationships.

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Lifecycle of a deputy request.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum DeputyStatus {
    Pending,
    Accepted,
    Rejected,
}

impl DeputyStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            DeputyStatus::Pending => "pending",
            DeputyStatus::Accepted => "accepted",
            DeputyStatus::Rejected => "rejected",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(DeputyStatus::Pending),
            "accepted" => Some(DeputyStatus::Accepted),
            "rejected" => Some(DeputyStatus::Rejected),
            _ => None,
        }
    }
}

/// A directed edge: `principal_id` may hand gigs to `deputy_id`.
///
/// `principal_id != deputy_id` always holds for stored relationships.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct DeputyRelationship {
    pub principal_id: UserId,
    pub deputy_id: UserId,
    /// Which of the principal's capabilities the deputy covers.
    pub for_skill: String,
    pub gig_type: Option<String>,
    pub note: Option<String>,
    pub status: DeputyStatus,
    /// Only settable to `true` once the deputy holds 3.0 stars.
    pub can_be_booked: bool,
    pub date_added: u64,
    pub responded_at: Option<u64>,
}

impl DeputyRelationship {
    /// A fresh `pending` request.
    pub fn pending(
        principal_id: UserId,
        deputy_id: UserId,
        for_skill: impl Into<String>,
        date_added: u64,
    ) -> Self {
        Self {
            principal_id,
            deputy_id,
            for_skill: for_skill.into(),
            gig_type: None,
            note: None,
            status: DeputyStatus::Pending,
            can_be_booked: false,
            date_added,
            responded_at: None,
        }
    }

    /// Accepted and bookable: may be suggested as a gig substitute.
    pub fn is_suggestable(&self) -> bool {
        self.status == DeputyStatus::Accepted && self.can_be_booked
    }
}

/// Principal-editable settings. `None` leaves a field untouched.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(default)]
pub struct DeputySettings {
    pub can_be_booked: Option<bool>,
    pub note: Option<String>,
    pub gig_type: Option<String>,
}

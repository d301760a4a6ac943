//! Gig invitations and their append-only booking history.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::UserId;

/// Opaque gig identifier.
#[derive(Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct GigId(pub String);

impl GigId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GigId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for GigId {
    fn from(id: &str) -> Self {
        Self(id.to_string())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "kebab-case")]
pub enum GigStatus {
    Pending,
    Accepted,
    Declined,
    DeputySuggested,
    Cancelled,
}

impl GigStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            GigStatus::Pending => "pending",
            GigStatus::Accepted => "accepted",
            GigStatus::Declined => "declined",
            GigStatus::DeputySuggested => "deputy-suggested",
            GigStatus::Cancelled => "cancelled",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "pending" => Some(GigStatus::Pending),
            "accepted" => Some(GigStatus::Accepted),
            "declined" => Some(GigStatus::Declined),
            "deputy-suggested" => Some(GigStatus::DeputySuggested),
            "cancelled" => Some(GigStatus::Cancelled),
            _ => None,
        }
    }

    /// No transition leaves a terminal status.
    pub fn is_terminal(self) -> bool {
        matches!(
            self,
            GigStatus::Accepted | GigStatus::Declined | GigStatus::Cancelled
        )
    }
}

impl fmt::Display for GigStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What the invited musician has said about their availability.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    Available,
    NotAvailable,
    #[default]
    Undefined,
}

impl Availability {
    pub fn as_str(self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::NotAvailable => "notavailable",
            Availability::Undefined => "undefined",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "available" => Some(Availability::Available),
            "notavailable" => Some(Availability::NotAvailable),
            "undefined" => Some(Availability::Undefined),
            _ => None,
        }
    }
}

/// Which party caused a status change.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
#[serde(rename_all = "lowercase")]
pub enum ActionBy {
    Client,
    Musician,
    System,
}

impl ActionBy {
    pub fn as_str(self) -> &'static str {
        match self {
            ActionBy::Client => "client",
            ActionBy::Musician => "musician",
            ActionBy::System => "system",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "client" => Some(ActionBy::Client),
            "musician" => Some(ActionBy::Musician),
            "system" => Some(ActionBy::System),
            _ => None,
        }
    }
}

/// One status change. Entries are never edited or removed.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct BookingHistoryEntry {
    pub status: GigStatus,
    /// Musician the gig is with after this change.
    pub musician_id: UserId,
    pub musician_name: Option<String>,
    /// Set when a deputy replaced the original invitee.
    pub original_musician_id: Option<UserId>,
    pub action_by: ActionBy,
    /// Acting user, absent for system actions.
    pub actor_id: Option<UserId>,
    pub notes: Option<String>,
    pub timestamp: u64,
}

/// A single booking invitation between a client and a musician.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, ts_rs::TS)]
#[ts(export)]
pub struct Gig {
    pub id: GigId,
    pub client_id: UserId,
    pub invited_musician_id: UserId,
    pub original_musician_id: Option<UserId>,
    pub status: GigStatus,
    pub musician_availability: Availability,
    pub deputy_suggested_id: Option<UserId>,
    pub booking_history: Vec<BookingHistoryEntry>,
    /// Bumped on every persisted change; used for compare-and-swap writes.
    pub revision: u64,
    pub created_at: u64,
}

impl Gig {
    /// A new `pending` invitation with empty history.
    pub fn new(id: GigId, client_id: UserId, invited_musician_id: UserId, created_at: u64) -> Self {
        Self {
            id,
            client_id,
            invited_musician_id,
            original_musician_id: None,
            status: GigStatus::Pending,
            musician_availability: Availability::Undefined,
            deputy_suggested_id: None,
            booking_history: Vec::new(),
            revision: 0,
            created_at,
        }
    }

    pub fn last_entry(&self) -> Option<&BookingHistoryEntry> {
        self.booking_history.last()
    }
}

//! Domain events pushed to IPC subscribers.
//!
//! Every successful state change emits one event. Subscribers each get an
//! independent broadcast buffer; a slow subscriber lags and skips events
//! rather than blocking writers.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

pub const DEPUTY_REQUEST_SENT: &str = "DeputyRequestSent";
pub const DEPUTY_REQUEST_ANSWERED: &str = "DeputyRequestAnswered";
pub const DEPUTY_REMOVED: &str = "DeputyRemoved";
pub const DEPUTY_SETTINGS_UPDATED: &str = "DeputySettingsUpdated";
pub const GIG_CREATED: &str = "GigCreated";
pub const GIG_STATUS_CHANGED: &str = "GigStatusChanged";
pub const GIG_AVAILABILITY_CHANGED: &str = "GigAvailabilityChanged";
pub const DAEMON_STARTED: &str = "DaemonStarted";

/// Payload fields naming the users an event concerns.
const USER_FIELDS: [&str; 5] = [
    "principal_id",
    "deputy_id",
    "client_id",
    "musician_id",
    "original_musician_id",
];

/// An event emitted by the daemon.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Event {
    /// Event type name (e.g. "GigStatusChanged").
    pub event_type: String,
    /// Monotonic per-daemon sequence number.
    #[serde(default)]
    pub sequence: u64,
    /// Unix timestamp.
    pub timestamp: u64,
    /// Type-specific payload.
    pub payload: serde_json::Value,
}

impl Event {
    pub fn new(event_type: &str, timestamp: u64, payload: serde_json::Value) -> Self {
        Self {
            event_type: event_type.to_string(),
            sequence: 0,
            timestamp,
            payload,
        }
    }
}

/// Filter for event subscriptions.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct EventFilter {
    /// Category filter: "deputy", "gig", "system".
    #[serde(default)]
    pub categories: Option<Vec<String>>,
    /// Only events whose payload names one of these users.
    #[serde(default)]
    pub user_ids: Option<Vec<String>>,
}

/// Event bus for broadcasting events to subscribers.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<Event>,
    sequence: Arc<AtomicU64>,
}

impl EventBus {
    /// Create a new event bus with the given buffer capacity.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self {
            sender,
            sequence: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Stamp `event` with the next sequence number and send it.
    pub fn emit(&self, mut event: Event) {
        event.sequence = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Event> {
        self.sender.subscribe()
    }

    /// Sequence number of the last emitted event.
    pub fn sequence(&self) -> u64 {
        self.sequence.load(Ordering::SeqCst)
    }
}

impl EventFilter {
    /// Check if an event matches this filter.
    pub fn matches(&self, event: &Event) -> bool {
        if let Some(ref categories) = self.categories {
            let category = categorize_event(&event.event_type);
            if !categories.iter().any(|c| c == category) {
                return false;
            }
        }

        if let Some(ref user_ids) = self.user_ids {
            let mentioned = USER_FIELDS
                .iter()
                .filter_map(|field| event.payload.get(*field).and_then(|v| v.as_str()))
                .any(|id| user_ids.iter().any(|wanted| wanted == id));
            if !mentioned {
                return false;
            }
        }

        true
    }
}

fn categorize_event(event_type: &str) -> &'static str {
    match event_type {
        s if s.starts_with("Deputy") => "deputy",
        s if s.starts_with("Gig") => "gig",
        _ => "system",
    }
}

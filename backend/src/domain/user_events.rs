//! Domain events emitted after user mutations commit.
//!
//! Events stay transport agnostic; [`EventEnvelope`] is the JSON shape shared
//! by the broker publisher and subscriber.

use serde::{Deserialize, Serialize};

use crate::domain::user::{User, UserId};
use crate::domain::TraceId;

/// Kinds of user lifecycle events, one per routing key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum UserEventKind {
    #[serde(rename = "user.created")]
    Created,
    #[serde(rename = "user.updated")]
    Updated,
    #[serde(rename = "user.deleted")]
    Deleted,
}

impl UserEventKind {
    /// Every kind, in routing-key binding order.
    pub const ALL: [Self; 3] = [Self::Created, Self::Updated, Self::Deleted];

    /// Broker routing key for this kind.
    #[must_use]
    pub const fn routing_key(self) -> &'static str {
        match self {
            Self::Created => "user.created",
            Self::Updated => "user.updated",
            Self::Deleted => "user.deleted",
        }
    }

    /// Resolve a routing key back to its kind.
    #[must_use]
    pub fn from_routing_key(key: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.routing_key() == key)
    }
}

impl std::fmt::Display for UserEventKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.routing_key())
    }
}

/// Event payload: the subset of user fields relevant to subscribers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserEventData {
    pub user_id: i64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

/// A user lifecycle event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UserEvent {
    pub kind: UserEventKind,
    pub data: UserEventData,
}

impl UserEvent {
    /// A user has been created.
    #[must_use]
    pub fn created(user: &User) -> Self {
        Self::with_name(UserEventKind::Created, user)
    }

    /// A user has been updated.
    #[must_use]
    pub fn updated(user: &User) -> Self {
        Self::with_name(UserEventKind::Updated, user)
    }

    /// A user has been deleted.
    #[must_use]
    pub fn deleted(id: UserId) -> Self {
        Self {
            kind: UserEventKind::Deleted,
            data: UserEventData {
                user_id: id.get(),
                name: None,
            },
        }
    }

    fn with_name(kind: UserEventKind, user: &User) -> Self {
        Self {
            kind,
            data: UserEventData {
                user_id: user.id.get(),
                name: Some(user.name.clone()),
            },
        }
    }
}

/// Wire envelope: `{event_type, data, trace_id}`.
///
/// # Examples
/// ```
/// use user_service::domain::{EventEnvelope, UserEvent, UserId};
///
/// let envelope = EventEnvelope::from_event(&UserEvent::deleted(UserId::new(3)), None);
/// let json = serde_json::to_value(&envelope).expect("serialise");
/// assert_eq!(json["event_type"], "user.deleted");
/// assert_eq!(json["data"]["user_id"], 3);
/// assert!(json["trace_id"].is_null());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventEnvelope {
    pub event_type: String,
    pub data: serde_json::Value,
    #[serde(default)]
    pub trace_id: Option<String>,
}

impl EventEnvelope {
    /// Wrap an event with the active trace identifier.
    #[must_use]
    pub fn from_event(event: &UserEvent, trace_id: Option<&TraceId>) -> Self {
        Self {
            event_type: event.kind.routing_key().to_owned(),
            // A struct of integers and strings always serialises.
            data: serde_json::to_value(&event.data).unwrap_or(serde_json::Value::Null),
            trace_id: trace_id.map(ToString::to_string),
        }
    }

    /// Best-effort extraction of `data.user_id`.
    #[must_use]
    pub fn user_id(&self) -> Option<i64> {
        self.data.get("user_id").and_then(serde_json::Value::as_i64)
    }
}

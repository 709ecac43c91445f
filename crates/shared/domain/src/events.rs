//! Domain events raised by the user aggregate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::constants::{
    EVENT_USER_LOGGED_IN, EVENT_USER_NAME_CHANGED, EVENT_USER_PASSWORD_CHANGED,
    EVENT_USER_PHONE_CHANGED, EVENT_USER_REGISTERED,
};

/// What happened to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserEvent {
    Registered { email: String, phone: String },
    PhoneChanged { old: String, new: String },
    NameChanged { old: String, new: String },
    PasswordChanged,
    LoggedIn,
}

impl UserEvent {
    /// Stable event name, persisted as `event_type`.
    pub fn name(&self) -> &'static str {
        match self {
            UserEvent::Registered { .. } => EVENT_USER_REGISTERED,
            UserEvent::PhoneChanged { .. } => EVENT_USER_PHONE_CHANGED,
            UserEvent::NameChanged { .. } => EVENT_USER_NAME_CHANGED,
            UserEvent::PasswordChanged => EVENT_USER_PASSWORD_CHANGED,
            UserEvent::LoggedIn => EVENT_USER_LOGGED_IN,
        }
    }

    /// Event payload without the variant tag.
    pub fn payload(&self) -> serde_json::Value {
        match self {
            UserEvent::Registered { email, phone } => json!({ "email": email, "phone": phone }),
            UserEvent::PhoneChanged { old, new } | UserEvent::NameChanged { old, new } => {
                json!({ "old": old, "new": new })
            }
            UserEvent::PasswordChanged | UserEvent::LoggedIn => json!({}),
        }
    }
}

/// An immutable fact about an aggregate, stamped when it was raised.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainEvent {
    pub id: Uuid,
    pub aggregate_id: Uuid,
    pub occurred_at: DateTime<Utc>,
    pub event: UserEvent,
}

impl DomainEvent {
    pub fn new(aggregate_id: Uuid, event: UserEvent, occurred_at: DateTime<Utc>) -> Self {
        Self {
            id: Uuid::new_v4(),
            aggregate_id,
            occurred_at,
            event,
        }
    }

    pub fn name(&self) -> &'static str {
        self.event.name()
    }

    pub fn payload(&self) -> serde_json::Value {
        self.event.payload()
    }
}

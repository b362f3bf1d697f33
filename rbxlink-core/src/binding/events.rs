use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::ports::{Notification, NotificationField};
use crate::users::UserId;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Domain events for the binding lifecycle
///
/// Each committed transition produces exactly one event. Events are rendered
/// into audit [`Notification`]s; self-service and admin releases use different
/// titles and field sets so the audit trail tells them apart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum BindingEvent {
    /// A user bound a Roblox account to themselves
    Registered {
        user_id: UserId,
        username: String,
        roblox_username: String,
        timestamp: DateTime<Utc>,
    },

    /// A user released their own binding
    SelfUnregistered {
        user_id: UserId,
        username: String,
        roblox_username: String,
        timestamp: DateTime<Utc>,
    },

    /// An administrator released another user's binding
    AdminUnregistered {
        admin_id: UserId,
        admin_username: String,
        user_id: UserId,
        username: String,
        roblox_username: String,
        timestamp: DateTime<Utc>,
    },
}

impl BindingEvent {
    pub fn timestamp(&self) -> DateTime<Utc> {
        match self {
            Self::Registered { timestamp, .. } => *timestamp,
            Self::SelfUnregistered { timestamp, .. } => *timestamp,
            Self::AdminUnregistered { timestamp, .. } => *timestamp,
        }
    }

    /// The account whose binding changed
    pub fn user_id(&self) -> &UserId {
        match self {
            Self::Registered { user_id, .. } => user_id,
            Self::SelfUnregistered { user_id, .. } => user_id,
            Self::AdminUnregistered { user_id, .. } => user_id,
        }
    }

    pub fn event_type(&self) -> &'static str {
        match self {
            Self::Registered { .. } => "registered",
            Self::SelfUnregistered { .. } => "self_unregistered",
            Self::AdminUnregistered { .. } => "admin_unregistered",
        }
    }

    pub fn to_notification(&self) -> Notification {
        let at = self.timestamp().format(TIMESTAMP_FORMAT).to_string();
        match self {
            Self::Registered {
                username,
                roblox_username,
                ..
            } => Notification {
                title: "🎮 Roblox account registered".to_string(),
                body: "A new Roblox account was registered.".to_string(),
                fields: vec![
                    NotificationField::inline("User", username),
                    NotificationField::inline("Roblox account", roblox_username),
                    NotificationField::block("Registered at", at),
                ],
            },
            Self::SelfUnregistered {
                username,
                roblox_username,
                ..
            } => Notification {
                title: "🚫 Roblox account released".to_string(),
                body: "A Roblox account was released by its owner.".to_string(),
                fields: vec![
                    NotificationField::inline("User", username),
                    NotificationField::inline(
                        "Released account",
                        roblox_username,
                    ),
                    NotificationField::block("Released at", at),
                ],
            },
            Self::AdminUnregistered {
                admin_username,
                username,
                roblox_username,
                ..
            } => Notification {
                title: "🚫 Roblox account released by admin".to_string(),
                body: "An administrator released a Roblox account.".to_string(),
                fields: vec![
                    NotificationField::inline("Target user", username),
                    NotificationField::inline(
                        "Released account",
                        roblox_username,
                    ),
                    NotificationField::inline("Released by", admin_username),
                    NotificationField::block("Released at", at),
                ],
            },
        }
    }
}

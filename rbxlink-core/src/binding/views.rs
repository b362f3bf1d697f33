use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::users::{UserId, UserRecord};

/// Result of a registration attempt that passed validation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RegisterOutcome {
    /// The binding was stored; carries the refreshed record.
    Registered(UserRecord),
    /// The actor already holds a binding. Nothing was written; the caller may
    /// ask the user to release it via
    /// [`BindingService::confirm_and_unregister`](super::BindingService::confirm_and_unregister)
    /// and then retry.
    AlreadyBound(UnregisterConfirmation),
}

impl RegisterOutcome {
    pub fn is_registered(&self) -> bool {
        matches!(self, RegisterOutcome::Registered(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UnregisterOutcome {
    /// The binding was cleared.
    Unregistered {
        record: UserRecord,
        released: String,
    },
    /// The target held no binding; nothing was written or announced.
    AlreadyUnbound(UserRecord),
}

impl UnregisterOutcome {
    pub fn record(&self) -> &UserRecord {
        match self {
            UnregisterOutcome::Unregistered { record, .. } => record,
            UnregisterOutcome::AlreadyUnbound(record) => record,
        }
    }

    /// The identifier that was cleared, if anything was.
    pub fn released(&self) -> Option<&str> {
        match self {
            UnregisterOutcome::Unregistered { released, .. } => Some(released),
            UnregisterOutcome::AlreadyUnbound(_) => None,
        }
    }
}

/// Request to confirm releasing the actor's current binding.
///
/// Only the service issues these; fields are read-only so a caller cannot
/// retarget a confirmation at another account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnregisterConfirmation {
    user_id: UserId,
    roblox_username: String,
}

impl UnregisterConfirmation {
    pub(crate) fn new(user_id: UserId, roblox_username: impl Into<String>) -> Self {
        Self {
            user_id,
            roblox_username: roblox_username.into(),
        }
    }

    pub fn user_id(&self) -> &UserId {
        &self.user_id
    }

    /// The binding the user is asked to give up.
    pub fn roblox_username(&self) -> &str {
        &self.roblox_username
    }
}

/// Row shape for the bindings list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BindingSummary {
    pub user_id: UserId,
    pub username: String,
    pub roblox_username: String,
    /// When the binding was registered, or the join date for records that
    /// predate registration timestamps. `None` when neither is known.
    pub since: Option<DateTime<Utc>>,
}

impl BindingSummary {
    /// `None` for unbound records.
    pub fn from_record(record: &UserRecord) -> Option<Self> {
        let roblox_username = record.binding()?.to_string();
        Some(Self {
            user_id: record.id.clone(),
            username: record.username.clone(),
            roblox_username,
            since: record.roblox_registered_at.or(record.join_date),
        })
    }
}

/// Read-only detail projection of one account.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetail {
    pub user_id: UserId,
    pub username: String,
    pub email: String,
    pub roblox_username: Option<String>,
    pub join_date: Option<DateTime<Utc>>,
    pub roblox_registered_at: Option<DateTime<Utc>>,
    pub scripts_executed: u64,
}

impl From<&UserRecord> for UserDetail {
    fn from(record: &UserRecord) -> Self {
        Self {
            user_id: record.id.clone(),
            username: record.username.clone(),
            email: record.email.clone(),
            roblox_username: record.binding().map(str::to_string),
            join_date: record.join_date,
            roblox_registered_at: record.roblox_registered_at,
            scripts_executed: record.scripts_executed,
        }
    }
}

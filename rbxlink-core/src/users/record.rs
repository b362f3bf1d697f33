use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Deserializer, Serialize, de};
use serde_json::{Map, Value};
use thiserror::Error;
use uuid::Uuid;

use super::role::UserRole;

/// Opaque, immutable account identifier.
///
/// Stores may use any non-empty string. Numeric ids found in a document are
/// read as their decimal text, so `1` and `"1"` name the same account.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct UserId(String);

impl UserId {
    /// Fresh time-ordered id for records created here.
    pub fn new() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for UserId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("user id cannot be empty")]
pub struct EmptyUserId;

impl FromStr for UserId {
    type Err = EmptyUserId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.is_empty() {
            return Err(EmptyUserId);
        }
        Ok(Self(trimmed.to_string()))
    }
}

impl<'de> Deserialize<'de> for UserId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum RawId {
            Text(String),
            Unsigned(u64),
            Signed(i64),
        }

        let raw = match RawId::deserialize(deserializer)? {
            RawId::Text(text) => text,
            RawId::Unsigned(n) => n.to_string(),
            RawId::Signed(n) => n.to_string(),
        };
        raw.parse().map_err(de::Error::custom)
    }
}

/// One account as held by the user store.
///
/// Only the `roblox_*` fields are mutated by this crate; everything else is
/// carried through untouched.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserRecord {
    pub id: UserId,
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub role: UserRole,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub join_date: Option<DateTime<Utc>>,
    #[serde(
        default,
        deserialize_with = "empty_as_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub roblox_username: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roblox_registered_at: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub roblox_unregistered_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub scripts_executed: u64,
}

impl UserRecord {
    pub fn new(
        username: impl Into<String>,
        email: impl Into<String>,
        role: UserRole,
    ) -> Self {
        Self {
            id: UserId::new(),
            username: username.into(),
            email: email.into(),
            role,
            join_date: Some(Utc::now()),
            roblox_username: None,
            roblox_registered_at: None,
            roblox_unregistered_at: None,
            scripts_executed: 0,
        }
    }

    /// The bound Roblox username, if any. Empty strings count as unbound.
    pub fn binding(&self) -> Option<&str> {
        self.roblox_username
            .as_deref()
            .filter(|value| !value.is_empty())
    }

    pub fn is_bound(&self) -> bool {
        self.binding().is_some()
    }

    /// Whether this record currently holds exactly `value`.
    pub fn holds(&self, value: &str) -> bool {
        self.binding() == Some(value)
    }

    /// Merge a partial update; fields the patch does not name are kept.
    pub fn apply(&mut self, patch: &UserPatch) {
        if let Some(value) = &patch.roblox_username {
            self.roblox_username = value.clone().filter(|v| !v.is_empty());
        }
        if let Some(at) = patch.roblox_registered_at {
            self.roblox_registered_at = Some(at);
        }
        if let Some(at) = patch.roblox_unregistered_at {
            self.roblox_unregistered_at = Some(at);
        }
    }

    /// Builder-style variant of [`UserRecord::apply`].
    pub fn with_patch(mut self, patch: &UserPatch) -> Self {
        self.apply(patch);
        self
    }
}

/// Partial update of a user's binding facet.
///
/// `roblox_username: Some(None)` clears the binding, `None` leaves it as is.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UserPatch {
    pub roblox_username: Option<Option<String>>,
    pub roblox_registered_at: Option<DateTime<Utc>>,
    pub roblox_unregistered_at: Option<DateTime<Utc>>,
}

impl UserPatch {
    pub fn bind(value: impl Into<String>, at: DateTime<Utc>) -> Self {
        Self {
            roblox_username: Some(Some(value.into())),
            roblox_registered_at: Some(at),
            roblox_unregistered_at: None,
        }
    }

    pub fn unbind(at: DateTime<Utc>) -> Self {
        Self {
            roblox_username: Some(None),
            roblox_registered_at: None,
            roblox_unregistered_at: Some(at),
        }
    }

    /// Write the named fields into a raw stored document, leaving every
    /// other key as it was. A cleared binding is stored as `""`.
    pub fn merge_into(&self, document: &mut Map<String, Value>) {
        if let Some(value) = &self.roblox_username {
            let value = value.clone().unwrap_or_default();
            document.insert("robloxUsername".into(), Value::String(value));
        }
        if let Some(at) = self.roblox_registered_at {
            document.insert("robloxRegisteredAt".into(), timestamp(at));
        }
        if let Some(at) = self.roblox_unregistered_at {
            document.insert("robloxUnregisteredAt".into(), timestamp(at));
        }
    }
}

fn timestamp(at: DateTime<Utc>) -> Value {
    Value::String(at.to_rfc3339_opts(SecondsFormat::AutoSi, true))
}

fn empty_as_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<String>::deserialize(deserializer)?;
    Ok(raw.filter(|value| !value.is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn empty_binding_reads_as_unbound() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": "0190a6a4-6f3b-7c2a-9d3e-1b2c3d4e5f60",
            "username": "mina",
            "email": "mina@example.com",
            "role": "user",
            "joinDate": "2024-03-01T09:00:00Z",
            "robloxUsername": ""
        }))
        .unwrap();

        assert!(!record.is_bound());
        assert_eq!(record.binding(), None);
        assert_eq!(record.scripts_executed, 0);
    }

    #[test]
    fn unbound_records_omit_the_binding_field() {
        let record = UserRecord::new("mina", "mina@example.com", UserRole::User);
        let value = serde_json::to_value(&record).unwrap();

        assert!(value.get("robloxUsername").is_none());
        assert_eq!(value["role"], "user");
        assert!(value.get("joinDate").is_some());
    }

    #[test]
    fn patch_only_touches_named_fields() {
        let mut record = UserRecord::new("mina", "mina@example.com", UserRole::User);
        let bound_at = Utc::now();
        record.apply(&UserPatch::bind("MinaPlays", bound_at));

        assert_eq!(record.binding(), Some("MinaPlays"));
        assert_eq!(record.roblox_registered_at, Some(bound_at));
        assert_eq!(record.roblox_unregistered_at, None);

        let released_at = Utc::now();
        record.apply(&UserPatch::unbind(released_at));

        assert!(!record.is_bound());
        assert_eq!(record.roblox_registered_at, Some(bound_at));
        assert_eq!(record.roblox_unregistered_at, Some(released_at));
        assert_eq!(record.username, "mina");
    }

    #[test]
    fn user_id_parses_from_text() {
        let id = UserId::new();
        let parsed: UserId = id.to_string().parse().unwrap();
        assert_eq!(parsed, id);
        assert_eq!("  legacy-7 ".parse::<UserId>().unwrap().as_str(), "legacy-7");
        assert_eq!("   ".parse::<UserId>(), Err(EmptyUserId));
    }

    #[test]
    fn numeric_ids_and_missing_join_date_are_accepted() {
        let record: UserRecord = serde_json::from_value(json!({
            "id": 1,
            "username": "mina",
            "robloxUsername": "alpha"
        }))
        .unwrap();

        assert_eq!(record.id, "1".parse().unwrap());
        assert_eq!(record.join_date, None);
        assert_eq!(record.binding(), Some("alpha"));

        let err = serde_json::from_value::<UserRecord>(json!({"id": "", "username": "x"}));
        assert!(err.is_err());
    }

    #[test]
    fn patch_merges_into_raw_document() {
        let mut document = json!({
            "id": 1,
            "username": "mina",
            "role": "moderator",
            "passwordHash": "$argon2id$v=19$...",
            "robloxUsername": "alpha"
        });
        let Value::Object(map) = &mut document else {
            panic!("object expected");
        };

        UserPatch::unbind(Utc::now()).merge_into(map);

        assert_eq!(map["robloxUsername"], "");
        assert!(map["robloxUnregisteredAt"].is_string());
        assert!(!map.contains_key("robloxRegisteredAt"));
        assert_eq!(map["role"], "moderator");
        assert_eq!(map["passwordHash"], "$argon2id$v=19$...");
        assert_eq!(map["id"], 1);

        let stored: UserRecord = serde_json::from_value(document).unwrap();
        assert!(!stored.is_bound());
    }
}

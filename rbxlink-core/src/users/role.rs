use serde::{Deserialize, Serialize};

/// Account role used for capability checks.
///
/// Stored documents carry the role as a free-form string. Anything other than
/// `"admin"`/`"administrator"` reads as an ordinary user, so a malformed role
/// can never widen access.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default,
)]
#[serde(from = "String", into = "String")]
pub enum UserRole {
    /// Ordinary account
    /// - Can bind and release its own Roblox account
    /// - Sees only its own binding
    #[default]
    User,

    /// Administrator
    /// - All User permissions
    /// - Sees every bound account
    /// - Can release any account's binding
    Admin,
}

/// Actions gated by role rather than by account ownership.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Capability {
    /// List every bound account and inspect any account's details.
    ViewAllBindings,
    /// Clear the binding held by an account other than the caller's.
    ReleaseAnyBinding,
}

impl Capability {
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::ViewAllBindings => "bindings:view_all",
            Capability::ReleaseAnyBinding => "bindings:release_any",
        }
    }
}

impl UserRole {
    /// Check whether this role grants `capability`
    pub fn can(&self, capability: Capability) -> bool {
        self.capabilities().contains(&capability)
    }

    /// Every capability granted by this role
    pub fn capabilities(&self) -> &'static [Capability] {
        match self {
            UserRole::User => &[],
            UserRole::Admin => &[
                Capability::ViewAllBindings,
                Capability::ReleaseAnyBinding,
            ],
        }
    }

    /// Get the role name as stored in user documents
    pub fn as_str(&self) -> &'static str {
        match self {
            UserRole::User => "user",
            UserRole::Admin => "admin",
        }
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UserRole::User => write!(f, "User"),
            UserRole::Admin => write!(f, "Administrator"),
        }
    }
}

impl std::str::FromStr for UserRole {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "user" => Ok(UserRole::User),
            "admin" | "administrator" => Ok(UserRole::Admin),
            _ => Err(format!("Invalid user role: {}", s)),
        }
    }
}

impl From<String> for UserRole {
    fn from(raw: String) -> Self {
        raw.parse().unwrap_or_default()
    }
}

impl From<UserRole> for String {
    fn from(role: UserRole) -> Self {
        role.as_str().to_string()
    }
}

use serde::{Deserialize, Serialize};
use std::fmt;

/// Shortest accepted Roblox username, in characters.
pub const MIN_LEN: usize = 3;
/// Longest accepted Roblox username, in characters.
pub const MAX_LEN: usize = 20;

/// Roblox username value object with validation
///
/// Represents a candidate binding value that follows the business rules:
/// - surrounding whitespace is trimmed
/// - 3-20 characters in length after trimming
///
/// Case is preserved and comparisons are exact, matching how bindings are
/// stored.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct RobloxUsername(String);

impl RobloxUsername {
    /// Create a new Roblox username with validation
    pub fn parse(raw: impl AsRef<str>) -> Result<Self, RobloxUsernameError> {
        let trimmed = raw.as_ref().trim();

        if trimmed.is_empty() {
            return Err(RobloxUsernameError::Empty);
        }

        // Counted in Unicode scalar values, not bytes or UTF-16 units.
        let len = trimmed.chars().count();
        if !(MIN_LEN..=MAX_LEN).contains(&len) {
            return Err(RobloxUsernameError::Length { len });
        }

        Ok(Self(trimmed.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_string(self) -> String {
        self.0
    }
}

impl fmt::Display for RobloxUsername {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl AsRef<str> for RobloxUsername {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for RobloxUsername {
    type Error = RobloxUsernameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<RobloxUsername> for String {
    fn from(value: RobloxUsername) -> Self {
        value.0
    }
}

/// Errors that can occur when validating a Roblox username
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RobloxUsernameError {
    #[error("Roblox username cannot be empty")]
    Empty,

    #[error("Roblox username must be 3-20 characters (got {len})")]
    Length { len: usize },
}

impl RobloxUsernameError {
    /// Stable short code reported to callers.
    pub fn code(&self) -> &'static str {
        match self {
            RobloxUsernameError::Empty => "empty",
            RobloxUsernameError::Length { .. } => "length",
        }
    }
}

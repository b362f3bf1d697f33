use thiserror::Error;

use crate::binding::RobloxUsernameError;
use crate::users::UserId;

/// Failure of the user store. A write that returns this did not take effect.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("User {0} not found in store")]
    MissingRecord(UserId),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Store IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store document malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to load or save a file-backed session.
#[derive(Error, Debug)]
pub enum SessionError {
    #[error("Session IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Session file malformed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Failure to deliver an audit notification. Never fatal.
#[derive(Error, Debug)]
pub enum NotifyError {
    #[error("notification transport failed: {0}")]
    Transport(String),

    #[error("notification rejected with HTTP {status}")]
    Rejected { status: u16 },
}

/// Why a binding value could not be claimed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictKind {
    /// Another record already holds the value.
    Taken,
    /// A release confirmation no longer matches the stored binding.
    Stale,
}

impl ConflictKind {
    pub fn code(&self) -> &'static str {
        match self {
            ConflictKind::Taken => "taken",
            ConflictKind::Stale => "stale",
        }
    }
}

impl std::fmt::Display for ConflictKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConflictKind::Taken => {
                write!(f, "already registered to another account")
            }
            ConflictKind::Stale => {
                write!(f, "binding changed since the confirmation was issued")
            }
        }
    }
}

#[derive(Error, Debug)]
pub enum BindingError {
    #[error(transparent)]
    Validation(#[from] RobloxUsernameError),

    #[error("Roblox account {0}")]
    Conflict(ConflictKind),

    #[error("User {0} not found")]
    NotFound(UserId),

    #[error("User {actor} is not permitted to {action}")]
    Forbidden { actor: UserId, action: &'static str },

    #[error("No active session")]
    NoSession,

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl BindingError {
    /// Stable short code for each failure kind.
    pub fn code(&self) -> &'static str {
        match self {
            BindingError::Validation(err) => err.code(),
            BindingError::Conflict(kind) => kind.code(),
            BindingError::NotFound(_) => "not_found",
            BindingError::Forbidden { .. } => "forbidden",
            BindingError::NoSession => "no_session",
            BindingError::Store(_) => "store",
        }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, BindingError::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, BindingError>;

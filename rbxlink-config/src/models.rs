use std::path::PathBuf;
use std::time::Duration;

use url::Url;

pub const DEFAULT_STORE_PATH: &str = "data/users.json";
pub const DEFAULT_SESSION_PATH: &str = "data/session.json";
pub const DEFAULT_WEBHOOK_TIMEOUT: Duration = Duration::from_secs(5);

/// Fully resolved runtime configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    pub metadata: ConfigMetadata,
    pub store: StoreConfig,
    pub session: SessionConfig,
    pub notifications: NotificationConfig,
}

/// Where the configuration came from.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ConfigMetadata {
    pub config_path: Option<PathBuf>,
    pub env_file_loaded: bool,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// JSON document holding every user record.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// File caching the acting user's record.
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NotificationConfig {
    /// Chat webhook; `None` sends notifications to the log only.
    pub webhook_url: Option<Url>,
    pub timeout: Duration,
}

impl NotificationConfig {
    pub fn is_webhook_enabled(&self) -> bool {
        self.webhook_url.is_some()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            metadata: ConfigMetadata::default(),
            store: StoreConfig {
                path: PathBuf::from(DEFAULT_STORE_PATH),
            },
            session: SessionConfig {
                path: PathBuf::from(DEFAULT_SESSION_PATH),
            },
            notifications: NotificationConfig {
                webhook_url: None,
                timeout: DEFAULT_WEBHOOK_TIMEOUT,
            },
        }
    }
}

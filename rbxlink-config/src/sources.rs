use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Raw configuration as defined in a TOML file.
#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(rename_all = "snake_case", deny_unknown_fields)]
pub struct FileConfig {
    #[serde(default)]
    pub store: FileStoreConfig,
    #[serde(default)]
    pub session: FileSessionConfig,
    #[serde(default)]
    pub notifications: FileNotificationConfig,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileStoreConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileSessionConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Default, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct FileNotificationConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub webhook_url: Option<String>,
    /// Human readable duration, e.g. `"5s"` or `"1500ms"`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,
}

/// Environment-derived configuration values.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct EnvConfig {
    pub config_path: Option<PathBuf>,
    pub store_path: Option<PathBuf>,
    pub session_path: Option<PathBuf>,
    pub webhook_url: Option<String>,
    pub webhook_timeout: Option<String>,
}

impl EnvConfig {
    pub fn gather() -> Self {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build from an arbitrary variable lookup. Empty values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |name: &str| {
            lookup(name)
                .map(|raw| raw.trim().to_string())
                .filter(|raw| !raw.is_empty())
        };

        Self {
            config_path: var("RBXLINK_CONFIG").map(PathBuf::from),
            store_path: var("RBXLINK_STORE_PATH").map(PathBuf::from),
            session_path: var("RBXLINK_SESSION_PATH").map(PathBuf::from),
            webhook_url: var("RBXLINK_WEBHOOK_URL"),
            webhook_timeout: var("RBXLINK_WEBHOOK_TIMEOUT"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    #[test]
    fn blank_variables_are_ignored() {
        let vars = HashMap::from([
            ("RBXLINK_STORE_PATH", "  /srv/users.json "),
            ("RBXLINK_WEBHOOK_URL", "   "),
        ]);
        let env = EnvConfig::from_lookup(|name| vars.get(name).map(|v| v.to_string()));

        assert_eq!(env.store_path, Some(PathBuf::from("/srv/users.json")));
        assert_eq!(env.webhook_url, None);
        assert_eq!(env.config_path, None);
    }

    #[test]
    fn file_config_rejects_unknown_keys() {
        let err = toml::from_str::<FileConfig>("[store]\nlocation = \"x\"\n");
        assert!(err.is_err());

        let parsed: FileConfig =
            toml::from_str("[notifications]\ntimeout = \"250ms\"\n").unwrap();
        assert_eq!(parsed.notifications.timeout.as_deref(), Some("250ms"));
        assert!(parsed.store.path.is_none());
    }
}

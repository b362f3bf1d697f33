use thiserror::Error;

use super::models::Config;

#[derive(Debug, Error)]
pub enum ConfigGuardRailError {
    #[error("webhook URL must use http or https, got '{scheme}'")]
    UnsupportedWebhookScheme { scheme: String },
    #[error("webhook timeout must be greater than zero")]
    ZeroWebhookTimeout,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ConfigWarning {
    pub message: String,
    pub hint: Option<String>,
}

#[derive(Debug, Default, Clone)]
pub struct ConfigWarnings {
    pub items: Vec<ConfigWarning>,
}

impl ConfigWarnings {
    pub fn push_with_hint<S: Into<String>, H: Into<String>>(
        &mut self,
        message: S,
        hint: H,
    ) {
        self.items.push(ConfigWarning {
            message: message.into(),
            hint: Some(hint.into()),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = &ConfigWarning> {
        self.items.iter()
    }

    pub fn extend(&mut self, other: ConfigWarnings) {
        self.items.extend(other.items);
    }
}

pub fn apply_guard_rails(
    config: &Config,
) -> Result<ConfigWarnings, ConfigGuardRailError> {
    let mut warnings = ConfigWarnings::default();
    let notifications = &config.notifications;

    if notifications.timeout.is_zero() {
        return Err(ConfigGuardRailError::ZeroWebhookTimeout);
    }

    match &notifications.webhook_url {
        Some(url) => match url.scheme() {
            "https" => {}
            "http" => warnings.push_with_hint(
                "Webhook URL uses plain http; notifications travel unencrypted",
                "Use an https webhook URL outside local testing",
            ),
            other => {
                return Err(ConfigGuardRailError::UnsupportedWebhookScheme {
                    scheme: other.to_string(),
                });
            }
        },
        None => warnings.push_with_hint(
            "RBXLINK_WEBHOOK_URL not configured; binding notifications are written to the log only",
            "Set RBXLINK_WEBHOOK_URL or notifications.webhook_url to post them to a chat channel",
        ),
    }

    Ok(warnings)
}

//! Chat-webhook notification sink.
//!
//! Posts each notification as a single embed:
//!
//! ```json
//! {"embeds":[{"title":"...","description":"...","color":16750592,
//!   "timestamp":"2025-01-01T00:00:00Z",
//!   "fields":[{"name":"User","value":"mina","inline":true}]}]}
//! ```

use std::time::Duration;

use async_trait::async_trait;
use chrono::Utc;
use reqwest::Client;
use serde::Serialize;
use url::Url;

use crate::error::NotifyError;
use crate::ports::{Notification, NotificationField, NotificationSink};

const EMBED_COLOR: u32 = 0xFF9800;

#[derive(Debug, Clone)]
pub struct WebhookSink {
    client: Client,
    url: Url,
}

impl WebhookSink {
    /// Create a sink whose requests give up after `timeout`.
    pub fn new(url: Url, timeout: Duration) -> Result<Self, NotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|err| NotifyError::Transport(err.to_string()))?;
        Ok(Self { client, url })
    }
}

#[derive(Debug, Serialize)]
struct Payload<'a> {
    embeds: [Embed<'a>; 1],
}

#[derive(Debug, Serialize)]
struct Embed<'a> {
    title: &'a str,
    description: &'a str,
    color: u32,
    timestamp: String,
    fields: &'a [NotificationField],
}

impl<'a> Payload<'a> {
    fn from_notification(notification: &'a Notification) -> Self {
        Self {
            embeds: [Embed {
                title: &notification.title,
                description: &notification.body,
                color: EMBED_COLOR,
                timestamp: Utc::now().to_rfc3339(),
                fields: &notification.fields,
            }],
        }
    }
}

#[async_trait]
impl NotificationSink for WebhookSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let resp = self
            .client
            .post(self.url.clone())
            .json(&Payload::from_notification(notification))
            .send()
            .await
            .map_err(|err| NotifyError::Transport(err.to_string()))?;

        if !resp.status().is_success() {
            return Err(NotifyError::Rejected {
                status: resp.status().as_u16(),
            });
        }
        Ok(())
    }
}

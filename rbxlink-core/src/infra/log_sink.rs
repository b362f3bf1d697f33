//! Notification sinks that never leave the process.

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::info;

use crate::error::NotifyError;
use crate::ports::{Notification, NotificationSink};

/// Writes notifications to the `rbxlink::audit` tracing target.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

#[async_trait]
impl NotificationSink for TracingSink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        let fields = notification
            .fields
            .iter()
            .map(|field| format!("{}={}", field.name, field.value))
            .collect::<Vec<_>>()
            .join(", ");

        info!(
            target: "rbxlink::audit",
            title = %notification.title,
            fields = %fields,
            "{}",
            notification.body
        );
        Ok(())
    }
}

/// Keeps every notification it receives.
#[derive(Debug, Default)]
pub struct MemorySink {
    sent: Mutex<Vec<Notification>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notifications(&self) -> Vec<Notification> {
        self.sent.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.sent.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.sent.lock().is_empty()
    }
}

#[async_trait]
impl NotificationSink for MemorySink {
    async fn send(&self, notification: &Notification) -> Result<(), NotifyError> {
        self.sent.lock().push(notification.clone());
        Ok(())
    }
}

// ── User-visible notifications ──
//
// Non-blocking toasts raised by refresh cycles and alarm actions. Each
// view owns one `Notifier`; consumers subscribe and render as they like.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;
use strum::Display;
use tokio::sync::broadcast;
use tracing::{info, warn};

const NOTIFICATION_CHANNEL_SIZE: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Display)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum NotificationLevel {
    Info,
    Error,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Notification {
    pub level: NotificationLevel,
    pub title: String,
    pub message: String,
    pub timestamp: DateTime<Utc>,
}

/// Broadcast sender for [`Notification`]s. Cheap to clone.
#[derive(Debug, Clone)]
pub struct Notifier {
    tx: broadcast::Sender<Arc<Notification>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(NOTIFICATION_CHANNEL_SIZE);
        Self { tx }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<Arc<Notification>> {
        self.tx.subscribe()
    }

    pub fn info(&self, title: impl Into<String>, message: impl Into<String>) {
        let (title, message) = (title.into(), message.into());
        info!(%title, %message, "notification");
        self.send(NotificationLevel::Info, title, message);
    }

    pub fn error(&self, title: impl Into<String>, message: impl Into<String>) {
        let (title, message) = (title.into(), message.into());
        warn!(%title, %message, "error notification");
        self.send(NotificationLevel::Error, title, message);
    }

    fn send(&self, level: NotificationLevel, title: String, message: String) {
        // No subscribers is fine: the toast simply goes unseen.
        let _ = self.tx.send(Arc::new(Notification {
            level,
            title,
            message,
            timestamp: Utc::now(),
        }));
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn subscribers_receive_in_order() {
        let notifier = Notifier::new();
        let mut rx = notifier.subscribe();
        notifier.info("Alarm acknowledged", "Alarm 3");
        notifier.error("Refresh failed", "alarms");
        let first = rx.recv().await.unwrap();
        let second = rx.recv().await.unwrap();
        assert_eq!(first.level, NotificationLevel::Info);
        assert_eq!(second.level, NotificationLevel::Error);
        assert_eq!(second.message, "alarms");
    }

    #[test]
    fn sending_without_subscribers_is_silent() {
        Notifier::new().error("x", "y");
    }
}

use tokio::sync::mpsc::UnboundedSender;
use tracing::{debug, info};

use crate::{Error, Result};

/// Severity of a user-visible notification.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotifyKind {
    /// Something degraded but the operation carried on.
    Warn,
    /// An operation failed.
    Error,
}

/// A non-blocking, user-visible notification (a toast).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    /// Severity.
    pub kind: NotifyKind,
    /// Short heading.
    pub title: String,
    /// Body text.
    pub text: String,
}

/// Sends notifications to the UI layer.
#[derive(Clone)]
pub struct NotificationDispatcher {
    /// Channel to the UI.
    tx: UnboundedSender<Notice>,
}

impl NotificationDispatcher {
    /// Create a new dispatcher from a UI notice channel.
    pub fn new(tx: UnboundedSender<Notice>) -> Self {
        Self { tx }
    }

    /// Send a notification with the given kind, title, and text.
    pub fn send_notification(&self, kind: NotifyKind, title: String, text: String) -> Result<()> {
        // Always log notification displays at info level, regardless of urgency.
        info!(kind = ?kind, title = %title, text = %text, "notification_display");
        self.tx
            .send(Notice { kind, title, text })
            .map_err(|_| Error::ChannelClosed)
    }

    /// Send a notification, logging rather than failing if the UI has gone away.
    pub fn report(&self, kind: NotifyKind, title: &str, text: String) {
        if self
            .send_notification(kind, title.to_string(), text)
            .is_err()
        {
            debug!(title, "notification dropped: channel closed");
        }
    }

    /// Convenience helper to report an error notification.
    pub fn error(&self, title: &str, text: String) {
        self.report(NotifyKind::Error, title, text);
    }

    /// Convenience helper to report a warning notification.
    pub fn warn(&self, title: &str, text: String) {
        self.report(NotifyKind::Warn, title, text);
    }
}

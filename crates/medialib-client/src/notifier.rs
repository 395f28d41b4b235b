//! Single-slot user feedback.
//!
//! At most one notification is current. Publishing replaces whatever was showing; nothing
//! is queued. Presentation code either polls [`Notifier::current`] or subscribes to changes.

use medialib_core::models::Notification;
use std::sync::Arc;
use tokio::sync::watch;

#[derive(Debug, Clone)]
pub struct Notifier {
    tx: Arc<watch::Sender<Option<Notification>>>,
}

impl Default for Notifier {
    fn default() -> Self {
        Self::new()
    }
}

impl Notifier {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    pub fn notify(&self, notification: Notification) {
        tracing::debug!(
            kind = ?notification.kind,
            message = %notification.message,
            "notification"
        );
        self.tx.send_replace(Some(notification));
    }

    pub fn success(&self, message: impl Into<String>) {
        self.notify(Notification::success(message));
    }

    pub fn error(&self, message: impl Into<String>) {
        self.notify(Notification::error(message));
    }

    pub fn info(&self, message: impl Into<String>) {
        self.notify(Notification::info(message));
    }

    pub fn warning(&self, message: impl Into<String>) {
        self.notify(Notification::warning(message));
    }

    /// The visible notification, if any. Expired notifications read as absent.
    pub fn current(&self) -> Option<Notification> {
        self.tx
            .borrow()
            .as_ref()
            .filter(|n| !n.is_expired())
            .cloned()
    }

    pub fn dismiss(&self) {
        self.tx.send_replace(None);
    }

    pub fn subscribe(&self) -> watch::Receiver<Option<Notification>> {
        self.tx.subscribe()
    }
}

//! # User-Facing Notifications
//!
//! Errors in the player and auth flows are never thrown at the host; they are
//! published as [`Notification`]s on the [`EventBus`] and rendered by whatever
//! toast system the host provides.

use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::events::{CoreEvent, EventBus};

/// How long a notification stays visible unless a preset says otherwise.
pub const DEFAULT_NOTIFICATION_DURATION_MS: u64 = 5_000;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationKind {
    Error,
    Success,
    Warning,
    Info,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notification {
    pub id: String,
    pub kind: NotificationKind,
    pub title: String,
    pub message: Option<String>,
    pub duration_ms: u64,
    /// Persistent notifications stay until dismissed.
    pub persistent: bool,
}

impl Notification {
    pub fn new(kind: NotificationKind, title: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            kind,
            title: title.into(),
            message: None,
            duration_ms: DEFAULT_NOTIFICATION_DURATION_MS,
            persistent: false,
        }
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    pub fn with_duration_ms(mut self, duration_ms: u64) -> Self {
        self.duration_ms = duration_ms;
        self
    }

    // Presets

    pub fn api_error() -> Self {
        Self::new(NotificationKind::Error, "Server error")
            .with_message("Request failed. Try again later.")
            .with_duration_ms(7_000)
    }

    pub fn auth_error() -> Self {
        Self::new(NotificationKind::Error, "Authorization error")
            .with_message("Invalid login or password")
            .with_duration_ms(5_000)
    }

    pub fn validation_error(message: impl Into<String>) -> Self {
        Self::new(NotificationKind::Warning, "Validation error")
            .with_message(message)
            .with_duration_ms(4_000)
    }

    pub fn network_error() -> Self {
        Self::new(NotificationKind::Error, "Network problem")
            .with_message("Check your internet connection")
            .with_duration_ms(6_000)
    }

    pub fn save_success() -> Self {
        Self::new(NotificationKind::Success, "Saved")
            .with_message("Changes saved successfully")
            .with_duration_ms(3_000)
    }
}

/// Publishes notifications on the event bus.
#[derive(Debug, Clone)]
pub struct Notifier {
    event_bus: EventBus,
}

impl Notifier {
    pub fn new(event_bus: EventBus) -> Self {
        Self { event_bus }
    }

    /// Publish a notification and return its id.
    ///
    /// A notification nobody listens to is dropped.
    pub fn notify(&self, notification: Notification) -> String {
        let id = notification.id.clone();
        match notification.kind {
            NotificationKind::Error | NotificationKind::Warning => warn!(
                notification_id = %id,
                title = %notification.title,
                message = notification.message.as_deref().unwrap_or(""),
                "User notification"
            ),
            NotificationKind::Success | NotificationKind::Info => info!(
                notification_id = %id,
                title = %notification.title,
                "User notification"
            ),
        }

        if self
            .event_bus
            .emit(CoreEvent::Notification(notification))
            .is_err()
        {
            debug!(notification_id = %id, "No notification subscribers");
        }
        id
    }

    pub fn show_error(&self, title: impl Into<String>) -> String {
        self.notify(Notification::new(NotificationKind::Error, title))
    }

    pub fn show_warning(&self, title: impl Into<String>) -> String {
        self.notify(Notification::new(NotificationKind::Warning, title))
    }

    pub fn show_success(&self, title: impl Into<String>) -> String {
        self.notify(Notification::new(NotificationKind::Success, title))
    }

    pub fn show_info(&self, title: impl Into<String>) -> String {
        self.notify(Notification::new(NotificationKind::Info, title))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn presets_carry_their_durations() {
        assert_eq!(Notification::api_error().duration_ms, 7_000);
        assert_eq!(Notification::auth_error().duration_ms, 5_000);
        assert_eq!(Notification::network_error().duration_ms, 6_000);
        assert_eq!(Notification::save_success().duration_ms, 3_000);

        let validation = Notification::validation_error("Password too short");
        assert_eq!(validation.kind, NotificationKind::Warning);
        assert_eq!(validation.duration_ms, 4_000);
        assert_eq!(validation.message.as_deref(), Some("Password too short"));
    }

    #[test]
    fn new_notifications_use_default_duration_and_unique_ids() {
        let a = Notification::new(NotificationKind::Info, "a");
        let b = Notification::new(NotificationKind::Info, "b");
        assert_eq!(a.duration_ms, DEFAULT_NOTIFICATION_DURATION_MS);
        assert!(!a.persistent);
        assert_ne!(a.id, b.id);
    }

    #[tokio::test]
    async fn notifier_publishes_on_bus() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let notifier = Notifier::new(bus);

        let id = notifier.show_error("Error: Stream unavailable");

        match rx.recv().await.unwrap() {
            CoreEvent::Notification(n) => {
                assert_eq!(n.id, id);
                assert_eq!(n.kind, NotificationKind::Error);
                assert_eq!(n.title, "Error: Stream unavailable");
            }
            other => panic!("unexpected event: {:?}", other),
        }
    }

    #[test]
    fn notifier_without_subscribers_does_not_fail() {
        let notifier = Notifier::new(EventBus::new(8));
        let id = notifier.show_success("Saved");
        assert!(!id.is_empty());
    }

    #[test]
    fn kind_serializes_lowercase() {
        let json = serde_json::to_string(&NotificationKind::Warning).unwrap();
        assert_eq!(json, "\"warning\"");
    }
}

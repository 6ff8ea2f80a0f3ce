//! # Events
//!
//! Every crate in the core reports what it did through one broadcast channel.
//! Hosts subscribe once and route by category: auth changes drive the sign-in
//! screen, library events refresh playlist views, playback events drive the
//! player bar, and notifications become toasts.
//!
//! ```rust
//! use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
//!
//! # #[tokio::main]
//! # async fn main() {
//! let bus = EventBus::new(16);
//! let mut rx = bus.subscribe();
//!
//! bus.emit(CoreEvent::Playback(PlaybackEvent::Loading {
//!     track_id: "42".to_string(),
//! }))
//! .ok();
//!
//! match rx.recv().await {
//!     Ok(CoreEvent::Playback(PlaybackEvent::Loading { track_id })) => assert_eq!(track_id, "42"),
//!     other => panic!("unexpected {:?}", other),
//! }
//! # }
//! ```
//!
//! A receiver that falls more than the buffer size behind gets
//! `RecvError::Lagged` once and then continues with the newest events.
//! Emitting while nobody listens returns `Err`; publishers treat that as a
//! no-op.

use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;

use crate::notifications::Notification;

pub use tokio::sync::broadcast::error::{RecvError, SendError};
pub use tokio::sync::broadcast::Receiver;

/// Buffer used when the config does not set one.
pub const DEFAULT_EVENT_BUFFER_SIZE: usize = 100;

// ============================================================================
// Event categories
// ============================================================================

/// Anything the core publishes. Serialized as `{"type": ..., "payload": ...}`
/// for hosts that forward events over a JS bridge.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "type", content = "payload")]
pub enum CoreEvent {
    Auth(AuthEvent),
    Library(LibraryEvent),
    Playback(PlaybackEvent),
    /// Toast for the host to display.
    Notification(Notification),
}

impl CoreEvent {
    /// Track the event is about, when it concerns one.
    pub fn track_id(&self) -> Option<&str> {
        match self {
            CoreEvent::Playback(event) => event.track_id(),
            CoreEvent::Library(LibraryEvent::TrackAddedToPlaylist { track_id, .. }) => {
                Some(track_id)
            }
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum AuthEvent {
    SignedIn {
        /// Username or email used at sign-in.
        identifier: String,
    },
    /// Tokens were removed after logout.
    SignedOut,
    /// The backend rejected the stored token and it was discarded.
    SessionExpired,
    AuthError {
        message: String,
    },
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum LibraryEvent {
    /// The playlist is created by the backend if it did not exist.
    TrackAddedToPlaylist {
        track_id: String,
        playlist: String,
    },
    PlaylistVisibilityToggled {
        playlist: String,
    },
}

/// Player lifecycle. Positions are in milliseconds.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(tag = "event")]
pub enum PlaybackEvent {
    Loading {
        track_id: String,
    },
    /// A stream is attached and play was requested.
    Started {
        track_id: String,
        title: String,
    },
    Paused {
        track_id: String,
        position_ms: u64,
    },
    Resumed {
        track_id: String,
        position_ms: u64,
    },
    /// The player was cleared. `None` when nothing was loaded.
    Stopped {
        track_id: Option<String>,
    },
    /// The element reached the end of the track. Nothing is queued
    /// automatically.
    Completed {
        track_id: String,
    },
    Seeked {
        track_id: String,
        position_ms: u64,
    },
    Error {
        track_id: Option<String>,
        /// Same text as the notification shown to the user.
        message: String,
        /// Retrying the same track may succeed.
        recoverable: bool,
    },
}

impl PlaybackEvent {
    pub fn track_id(&self) -> Option<&str> {
        match self {
            PlaybackEvent::Loading { track_id }
            | PlaybackEvent::Started { track_id, .. }
            | PlaybackEvent::Paused { track_id, .. }
            | PlaybackEvent::Resumed { track_id, .. }
            | PlaybackEvent::Completed { track_id }
            | PlaybackEvent::Seeked { track_id, .. } => Some(track_id),
            PlaybackEvent::Stopped { track_id } | PlaybackEvent::Error { track_id, .. } => {
                track_id.as_deref()
            }
        }
    }
}

// ============================================================================
// Bus
// ============================================================================

/// Cloneable handle to the shared broadcast channel.
///
/// `emit` never blocks, so media callbacks running on the host's thread can
/// publish directly.
#[derive(Clone)]
pub struct EventBus {
    sender: broadcast::Sender<CoreEvent>,
}

impl EventBus {
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Returns how many receivers got the event.
    pub fn emit(&self, event: CoreEvent) -> Result<usize, SendError<CoreEvent>> {
        self.sender.send(event)
    }

    /// Only events emitted after this call are delivered.
    pub fn subscribe(&self) -> Receiver<CoreEvent> {
        self.sender.subscribe()
    }

    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new(DEFAULT_EVENT_BUFFER_SIZE)
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("receivers", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn seeked(position_ms: u64) -> CoreEvent {
        CoreEvent::Playback(PlaybackEvent::Seeked {
            track_id: "7".to_string(),
            position_ms,
        })
    }

    #[tokio::test]
    async fn every_receiver_gets_each_event() {
        let bus = EventBus::new(8);
        let mut player_bar = bus.subscribe();
        let mut toasts = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        let event = CoreEvent::Notification(Notification::save_success());
        assert_eq!(bus.emit(event.clone()).unwrap(), 2);

        assert_eq!(player_bar.recv().await.unwrap(), event);
        assert_eq!(toasts.recv().await.unwrap(), event);
    }

    #[test]
    fn emitting_without_receivers_is_an_error() {
        let bus = EventBus::default();
        assert!(bus.emit(CoreEvent::Auth(AuthEvent::SignedOut)).is_err());
    }

    #[tokio::test]
    async fn late_subscriber_misses_earlier_events() {
        let bus = EventBus::new(8);
        let _keep_open = bus.subscribe();
        bus.emit(seeked(1_000)).unwrap();

        let mut late = bus.subscribe();
        bus.emit(seeked(2_000)).unwrap();

        assert_eq!(late.recv().await.unwrap(), seeked(2_000));
    }

    #[tokio::test]
    async fn slow_receiver_lags_then_catches_up() {
        let bus = EventBus::new(2);
        let mut rx = bus.subscribe();

        for i in 0..5 {
            bus.emit(seeked(i * 1_000)).ok();
        }

        assert!(matches!(rx.recv().await, Err(RecvError::Lagged(3))));
        assert_eq!(rx.recv().await.unwrap(), seeked(3_000));
    }

    #[test]
    fn track_id_is_exposed_across_categories() {
        let stopped_idle = CoreEvent::Playback(PlaybackEvent::Stopped { track_id: None });
        let added = CoreEvent::Library(LibraryEvent::TrackAddedToPlaylist {
            track_id: "42".to_string(),
            playlist: "Road trip".to_string(),
        });

        assert_eq!(seeked(0).track_id(), Some("7"));
        assert_eq!(stopped_idle.track_id(), None);
        assert_eq!(added.track_id(), Some("42"));
        assert_eq!(CoreEvent::Auth(AuthEvent::SessionExpired).track_id(), None);
    }

    #[test]
    fn events_serialize_with_type_and_payload() {
        let event = CoreEvent::Library(LibraryEvent::TrackAddedToPlaylist {
            track_id: "42".to_string(),
            playlist: "Road trip".to_string(),
        });

        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["type"], "Library");
        assert_eq!(json["payload"]["event"], "TrackAddedToPlaylist");
        assert_eq!(json["payload"]["playlist"], "Road trip");

        let back: CoreEvent = serde_json::from_value(json).unwrap();
        assert_eq!(back, event);
    }
}

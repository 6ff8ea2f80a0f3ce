//! Media Element Abstraction
//!
//! The host's native audio primitive. The core owns exactly one element per
//! player and drives it through this trait; the element reports its lifecycle
//! back through a [`MediaListener`].

use async_trait::async_trait;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

use crate::error::Result;

/// MIME type checked before falling back to native HLS playback.
pub const HLS_MIME_TYPE: &str = "application/vnd.apple.mpegurl";

/// Lifecycle events emitted by a media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    /// The element started fetching its source.
    LoadStart,
    /// Enough data is buffered to begin playback.
    CanPlay,
    /// Playback started or resumed.
    Play,
    /// Playback paused.
    Pause,
    /// Playback reached the end of the source.
    Ended,
    /// The element failed; carries the host's error message.
    Error(String),
    /// Playback position changed (seconds).
    TimeUpdate(f64),
    /// Source metadata loaded; carries the duration in seconds, which may be
    /// NaN or infinite for live sources.
    LoadedMetadata(f64),
    /// A seek started.
    Seeking,
    /// A seek completed.
    Seeked,
}

impl MediaEvent {
    /// Short event name, matching the host event vocabulary.
    pub fn name(&self) -> &'static str {
        match self {
            MediaEvent::LoadStart => "loadstart",
            MediaEvent::CanPlay => "canplay",
            MediaEvent::Play => "play",
            MediaEvent::Pause => "pause",
            MediaEvent::Ended => "ended",
            MediaEvent::Error(_) => "error",
            MediaEvent::TimeUpdate(_) => "timeupdate",
            MediaEvent::LoadedMetadata(_) => "loadedmetadata",
            MediaEvent::Seeking => "seeking",
            MediaEvent::Seeked => "seeked",
        }
    }
}

/// Receiver for [`MediaEvent`]s.
///
/// Called synchronously from the host's event dispatch; implementations must
/// not block.
pub trait MediaListener: Send + Sync {
    fn on_event(&self, event: MediaEvent);
}

/// Failure returned by [`MediaElement::play`].
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PlayError {
    /// The play request was cut short by a pause or a source change.
    #[error("play request interrupted: {0}")]
    Interrupted(String),

    /// The host refused to start playback.
    #[error("{0}")]
    Rejected(String),
}

impl PlayError {
    /// Classify a host play failure by its error name and message.
    ///
    /// `AbortError`s and messages mentioning an interruption come from a
    /// pause racing the pending play and are not real failures.
    pub fn classify(name: &str, message: &str) -> Self {
        if name == "AbortError" || message.contains("interrupted") {
            PlayError::Interrupted(message.to_string())
        } else {
            PlayError::Rejected(message.to_string())
        }
    }

    pub fn is_interrupted(&self) -> bool {
        matches!(self, PlayError::Interrupted(_))
    }
}

/// How eagerly the element buffers its source.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Preload {
    None,
    Metadata,
    #[default]
    Auto,
}

/// CORS mode for source requests.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CrossOrigin {
    Anonymous,
    /// Send cookies and auth headers with segment requests.
    #[default]
    UseCredentials,
}

impl fmt::Display for CrossOrigin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CrossOrigin::Anonymous => f.write_str("anonymous"),
            CrossOrigin::UseCredentials => f.write_str("use-credentials"),
        }
    }
}

/// Options applied when the element is created.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct MediaElementOptions {
    pub preload: Preload,
    pub cross_origin: CrossOrigin,
}

/// Host audio element.
///
/// All methods except [`play`](MediaElement::play) complete synchronously,
/// mirroring the host API.
#[async_trait]
pub trait MediaElement: Send + Sync {
    /// Start or resume playback. Resolves once the host accepted the request.
    async fn play(&self) -> std::result::Result<(), PlayError>;

    fn pause(&self);

    /// Current source URL, `None` when no source is set.
    fn source(&self) -> Option<String>;

    /// Set or remove the source URL.
    fn set_source(&self, url: Option<String>);

    /// Reset the element and re-read its source.
    fn load(&self);

    fn is_paused(&self) -> bool;

    /// Current playback position in seconds.
    fn current_time(&self) -> f64;

    fn set_current_time(&self, seconds: f64) -> Result<()>;

    /// Duration in seconds; NaN until metadata is loaded.
    fn duration(&self) -> f64;

    /// Whether the element can natively play the given MIME type.
    fn can_play_type(&self, mime: &str) -> bool;

    /// Install the event listener, replacing any previous one. `None` detaches.
    fn set_listener(&self, listener: Option<Arc<dyn MediaListener>>);
}

/// Creates media elements.
pub trait MediaElementFactory: Send + Sync {
    fn create(&self, options: &MediaElementOptions) -> Result<Arc<dyn MediaElement>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn abort_errors_are_interruptions() {
        let err = PlayError::classify("AbortError", "The operation was aborted.");
        assert!(err.is_interrupted());
    }

    #[test]
    fn interrupted_message_is_interruption() {
        let err = PlayError::classify(
            "DOMException",
            "The play() request was interrupted by a call to pause()",
        );
        assert!(err.is_interrupted());
    }

    #[test]
    fn other_failures_are_rejections() {
        let err = PlayError::classify("NotAllowedError", "autoplay blocked");
        assert_eq!(err, PlayError::Rejected("autoplay blocked".to_string()));
        assert_eq!(err.to_string(), "autoplay blocked");
    }

    #[test]
    fn default_options_preload_with_credentials() {
        let opts = MediaElementOptions::default();
        assert_eq!(opts.preload, Preload::Auto);
        assert_eq!(opts.cross_origin.to_string(), "use-credentials");
    }

    #[test]
    fn event_names_follow_host_vocabulary() {
        assert_eq!(MediaEvent::LoadedMetadata(12.0).name(), "loadedmetadata");
        assert_eq!(MediaEvent::Error("x".into()).name(), "error");
    }
}

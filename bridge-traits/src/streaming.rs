//! Adaptive Streaming Abstraction
//!
//! Wraps a host HLS library. The core never parses manifests or fetches
//! segments itself; it creates a handle, attaches it to a media element, loads
//! a source and reacts to the handle's events.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

use crate::error::Result;
use crate::media::MediaElement;

/// Configuration passed to the streaming library when a handle is created.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamConfig {
    /// Enable the library's own debug logging.
    pub debug: bool,
    /// Allow transmuxing off the main thread.
    pub enable_worker: bool,
    pub low_latency_mode: bool,
    /// How much already-played media to keep buffered.
    pub back_buffer_length: Duration,
    /// Extra headers attached to manifest and segment requests.
    pub request_headers: HashMap<String, String>,
}

impl Default for StreamConfig {
    fn default() -> Self {
        Self {
            debug: false,
            enable_worker: true,
            low_latency_mode: false,
            back_buffer_length: Duration::from_secs(90),
            request_headers: HashMap::new(),
        }
    }
}

/// Events reported by a stream handle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StreamEvent {
    /// The manifest was parsed and playback may start.
    ManifestParsed,
    /// The library reported an error. Non-fatal errors are recovered by the
    /// library itself.
    Error {
        fatal: bool,
        details: String,
        reason: Option<String>,
    },
}

/// Entry point into the host's streaming library.
pub trait StreamEngine: Send + Sync {
    /// Whether the library can run on this host.
    fn is_supported(&self) -> bool;

    /// Create a new, unattached stream handle.
    fn create(&self, config: &StreamConfig) -> Result<Box<dyn StreamHandle>>;
}

/// One live streaming attachment.
pub trait StreamHandle: Send + Sync {
    /// Bind the handle to a media element.
    fn attach_media(&self, media: Arc<dyn MediaElement>) -> Result<()>;

    /// Begin loading a manifest.
    fn load_source(&self, url: &str) -> Result<()>;

    /// Take the event receiver. Returns `None` after the first call.
    fn take_events(&self) -> Option<UnboundedReceiver<StreamEvent>>;

    /// Detach from the media element and release library resources.
    /// Must be idempotent.
    fn destroy(&self);
}

//! # Stream Session Manager
//!
//! Owns the lifecycle of the HLS session attached to the player's media
//! element. At most one session is live; starting a new one destroys the
//! previous one first.
//!
//! ## Event handling
//!
//! Each session gets a task that drains the handle's event channel:
//!
//! - `ManifestParsed` starts playback. A play request cut short by a pause or
//!   a source change is ignored; any other rejection is reported as
//!   `Start error: …`.
//! - Non-fatal errors are logged; the library recovers from them.
//! - A fatal error is reported as `Fatal HLS error: <details> (<reason>)` and
//!   the session is destroyed.
//!
//! Sessions are numbered. Events from a session that has since been replaced
//! are dropped.

use bridge_traits::error::Result;
use bridge_traits::media::{MediaElement, PlayError};
use bridge_traits::streaming::{StreamConfig, StreamEngine, StreamEvent, StreamHandle};
use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::UnboundedReceiver;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

/// Receives user-facing error messages from a session.
pub type ErrorCallback = Arc<dyn Fn(String) + Send + Sync>;

struct ActiveSession {
    generation: u64,
    handle: Arc<dyn StreamHandle>,
    pump: Option<JoinHandle<()>>,
}

#[derive(Default)]
struct SessionSlot {
    active: Option<ActiveSession>,
    last_generation: u64,
}

/// Starts and tears down streaming sessions.
pub struct StreamSessionManager {
    engine: Arc<dyn StreamEngine>,
    config: StreamConfig,
    slot: Arc<Mutex<SessionSlot>>,
}

impl fmt::Debug for StreamSessionManager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("StreamSessionManager")
            .field("config", &self.config)
            .field("active_generation", &self.active_generation())
            .finish()
    }
}

impl StreamSessionManager {
    pub fn new(engine: Arc<dyn StreamEngine>, config: StreamConfig) -> Self {
        Self {
            engine,
            config,
            slot: Arc::new(Mutex::new(SessionSlot::default())),
        }
    }

    /// Whether the streaming library runs on this host.
    pub fn is_supported(&self) -> bool {
        self.engine.is_supported()
    }

    /// Whether a session is attached.
    pub fn is_active(&self) -> bool {
        self.slot.lock().active.is_some()
    }

    /// Number of the live session, if any.
    pub fn active_generation(&self) -> Option<u64> {
        self.slot.lock().active.as_ref().map(|s| s.generation)
    }

    /// Start an HLS session on `media` for `url`, replacing any live one.
    ///
    /// Must be called from within a tokio runtime; the session's events are
    /// handled on a spawned task.
    pub fn start(
        &self,
        media: Arc<dyn MediaElement>,
        url: &str,
        on_error: ErrorCallback,
    ) -> Result<u64> {
        self.destroy();

        let handle: Arc<dyn StreamHandle> = Arc::from(self.engine.create(&self.config)?);
        let events = handle.take_events();

        if let Err(e) = handle
            .attach_media(Arc::clone(&media))
            .and_then(|_| handle.load_source(url))
        {
            handle.destroy();
            return Err(e);
        }

        // A concurrent start may have installed a session since the destroy
        // above; it is displaced here and released outside the lock.
        let (generation, displaced) = {
            let mut slot = self.slot.lock();
            slot.last_generation += 1;
            let generation = slot.last_generation;
            let displaced = slot.active.replace(ActiveSession {
                generation,
                handle,
                pump: None,
            });
            (generation, displaced)
        };
        if let Some(session) = displaced {
            release(session, true);
        }

        if let Some(events) = events {
            let pump = tokio::spawn(pump_events(
                Arc::clone(&self.slot),
                generation,
                events,
                media,
                on_error,
            ));
            let mut slot = self.slot.lock();
            match slot.active.as_mut() {
                Some(active) if active.generation == generation => active.pump = Some(pump),
                // Already torn down by a fatal error or a racing destroy.
                _ => pump.abort(),
            }
        } else {
            warn!(generation, "Stream handle exposed no events; playback will not auto-start");
        }

        info!(generation, "Stream session started");
        Ok(generation)
    }

    /// Play `url` through the media element's own HLS support.
    ///
    /// Replaces any live session. Interrupted play requests are ignored;
    /// other failures are reported as `Playback error: …`.
    pub async fn start_native(&self, media: Arc<dyn MediaElement>, url: &str, on_error: ErrorCallback) {
        self.destroy();

        media.set_source(Some(url.to_string()));
        match media.play().await {
            Ok(()) => debug!("Native HLS playback started"),
            Err(e) if e.is_interrupted() => debug!(error = %e, "Native play interrupted, ignoring"),
            Err(e) => on_error(format!("Playback error: {}", e)),
        }
    }

    /// Destroy the live session, if any. Idempotent.
    pub fn destroy(&self) {
        let session = self.slot.lock().active.take();
        if let Some(session) = session {
            release(session, true);
        }
    }
}

impl Drop for StreamSessionManager {
    fn drop(&mut self) {
        self.destroy();
    }
}

fn release(session: ActiveSession, abort_pump: bool) {
    if abort_pump {
        if let Some(pump) = session.pump {
            pump.abort();
        }
    }
    session.handle.destroy();
    debug!(generation = session.generation, "Stream session destroyed");
}

fn is_live(slot: &Mutex<SessionSlot>, generation: u64) -> bool {
    slot.lock()
        .active
        .as_ref()
        .is_some_and(|s| s.generation == generation)
}

async fn pump_events(
    slot: Arc<Mutex<SessionSlot>>,
    generation: u64,
    mut events: UnboundedReceiver<StreamEvent>,
    media: Arc<dyn MediaElement>,
    on_error: ErrorCallback,
) {
    while let Some(event) = events.recv().await {
        if !is_live(&slot, generation) {
            debug!(generation, "Dropping event from replaced stream session");
            break;
        }

        match event {
            StreamEvent::ManifestParsed => match media.play().await {
                Ok(()) => debug!(generation, "Manifest parsed, playback started"),
                Err(PlayError::Interrupted(message)) => {
                    debug!(generation, message = %message, "Play interrupted by user pause, ignoring")
                }
                Err(e) => {
                    if is_live(&slot, generation) {
                        on_error(format!("Start error: {}", e));
                    }
                }
            },
            StreamEvent::Error {
                fatal: false,
                details,
                ..
            } => {
                warn!(generation, details = %details, "Recoverable HLS error");
            }
            StreamEvent::Error {
                fatal: true,
                details,
                reason,
            } => {
                let reason = reason.unwrap_or_else(|| "unknown".to_string());
                warn!(generation, details = %details, reason = %reason, "Fatal HLS error");
                on_error(format!("Fatal HLS error: {} ({})", details, reason));

                let session = {
                    let mut slot = slot.lock();
                    match slot.active.as_ref() {
                        Some(active) if active.generation == generation => slot.active.take(),
                        _ => None,
                    }
                };
                if let Some(session) = session {
                    // This task is the pump; it ends right below.
                    release(session, false);
                }
                break;
            }
        }
    }
}

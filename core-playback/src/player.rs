//! # Audio Player
//!
//! Orchestrates playback of a single track at a time.
//!
//! ## Starting a track
//!
//! [`AudioPlayer::play_track`] runs the whole start-up sequence:
//!
//! 1. check the access token and track id
//! 2. mark the track as current and loading
//! 3. fetch track metadata and resolve the owner
//! 4. check the stream URL answers
//! 5. tear down the previous session and reset the media element
//! 6. create the element on first use and bind its events
//! 7. attach an HLS session, or fall back to the element's native HLS support
//!
//! Failures never escape to the caller. They are published as notifications
//! and `PlaybackEvent::Error`, and `play_track` returns `false`.
//!
//! ## Superseded requests
//!
//! Every `play_track`, `stop_track` and `reset_track` call takes a new request
//! generation. A start-up sequence that finds a newer generation after one of
//! its awaits gives up silently, so two rapid calls leave exactly one live
//! session.

use crate::api::TrackApiService;
use crate::error::{PlaybackError, Result};
use crate::media::AudioElementManager;
use crate::session::{ErrorCallback, StreamSessionManager};
use crate::types::{PlaybackState, PlayerStatus};
use bridge_traits::media::{MediaElement, MediaEvent, MediaListener, HLS_MIME_TYPE};
use core_auth::TokenStore;
use core_library::models::Track;
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use core_runtime::notifications::Notifier;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// Player
// ============================================================================

/// Playback orchestrator. Cheap to clone; clones share one player.
#[derive(Clone)]
pub struct AudioPlayer {
    inner: Arc<PlayerInner>,
}

struct PlayerInner {
    api: TrackApiService,
    token_store: TokenStore,
    media: AudioElementManager,
    sessions: StreamSessionManager,
    notifier: Notifier,
    event_bus: EventBus,
    state: watch::Sender<PlaybackState>,
    element: Mutex<Option<Arc<dyn MediaElement>>>,
    request_generation: AtomicU64,
}

impl AudioPlayer {
    pub fn new(
        api: TrackApiService,
        token_store: TokenStore,
        media: AudioElementManager,
        sessions: StreamSessionManager,
        event_bus: EventBus,
    ) -> Self {
        let (state, _) = watch::channel(PlaybackState::default());
        Self {
            inner: Arc::new(PlayerInner {
                api,
                token_store,
                media,
                sessions,
                notifier: Notifier::new(event_bus.clone()),
                event_bus,
                state,
                element: Mutex::new(None),
                request_generation: AtomicU64::new(0),
            }),
        }
    }

    /// Snapshot of the current state.
    pub fn state(&self) -> PlaybackState {
        self.inner.state.borrow().clone()
    }

    /// Watch state changes.
    pub fn subscribe(&self) -> watch::Receiver<PlaybackState> {
        self.inner.state.subscribe()
    }

    pub fn status(&self) -> PlayerStatus {
        self.inner.state.borrow().status()
    }

    /// Start playing `track`. Returns `true` once a stream is attached.
    #[instrument(skip(self, track), fields(track_id = %track.track_id))]
    pub async fn play_track(&self, track: &Track) -> bool {
        let inner = &self.inner;

        let token = match inner.token_store.current_access_token() {
            Some(token) if !token.is_empty() => token,
            _ => {
                inner.report_failure(Some(track), &PlaybackError::NotAuthenticated);
                return false;
            }
        };
        if track.track_id.is_empty() {
            inner.report_failure(Some(track), &PlaybackError::MissingTrackId);
            return false;
        }

        let generation = inner.next_generation();
        // The previous track's listener goes stale here, so its pause is never
        // reported; playback flags restart from scratch.
        inner.update(|s| {
            s.current_track = Some(track.clone());
            s.is_loading = true;
            s.is_playing = false;
            s.current_time = 0.0;
            s.duration = 0.0;
            s.owner = None;
        });
        inner.emit(PlaybackEvent::Loading {
            track_id: track.track_id.to_string(),
        });

        match self.start_playback(track, &token, generation).await {
            Ok(true) if inner.is_current(generation) => {
                info!(generation, "Playback started");
                inner.emit(PlaybackEvent::Started {
                    track_id: track.track_id.to_string(),
                    title: track.title.clone(),
                });
                true
            }
            Ok(_) => {
                debug!(generation, "Play request superseded");
                false
            }
            Err(e) => {
                if inner.is_current(generation) {
                    inner.update(|s| {
                        s.is_playing = false;
                        s.is_loading = false;
                    });
                    inner.report_failure(Some(track), &e);
                } else {
                    debug!(generation, error = %e, "Superseded play request failed");
                }
                false
            }
        }
    }

    async fn start_playback(&self, track: &Track, token: &str, generation: u64) -> Result<bool> {
        let inner = &self.inner;

        let metadata = inner.api.fetch_track_metadata(&track.track_id, token).await?;
        if !inner.is_current(generation) {
            return Ok(false);
        }
        let owner = metadata
            .owner()
            .ok_or(PlaybackError::OwnerUnknown)?
            .to_string();
        inner.update(|s| s.owner = Some(owner.clone()));

        let available = inner
            .api
            .check_stream_availability(&owner, &track.track_id, token)
            .await?;
        if !available {
            return Err(PlaybackError::StreamUnavailable);
        }
        if !inner.is_current(generation) {
            return Ok(false);
        }

        inner.release_media();
        let element = inner.element_or_create()?;
        inner.media.bind(
            &element,
            Arc::new(PlayerMediaListener {
                player: Arc::downgrade(&self.inner),
                generation,
            }),
        );

        let url = inner.api.stream_url(&owner, &track.track_id);
        let on_error = self.session_error_callback(generation);

        if inner.sessions.is_supported() {
            inner.sessions.start(Arc::clone(&element), &url, on_error)?;
        } else if element.can_play_type(HLS_MIME_TYPE) {
            debug!("Streaming library unavailable, using native HLS");
            inner
                .sessions
                .start_native(Arc::clone(&element), &url, on_error)
                .await;
        } else {
            return Err(PlaybackError::UnsupportedFormat);
        }

        Ok(true)
    }

    fn session_error_callback(&self, generation: u64) -> ErrorCallback {
        let player = Arc::downgrade(&self.inner);
        Arc::new(move |message: String| {
            let Some(inner) = player.upgrade() else {
                return;
            };
            if !inner.is_current(generation) {
                debug!(generation, message = %message, "Ignoring error from replaced session");
                return;
            }
            inner.playback_failed(message);
        })
    }

    /// Pause or resume `track` if it is loaded, otherwise start it.
    ///
    /// Tracks without an id are dropped from `queue`; a non-empty remainder
    /// replaces the navigation queue.
    pub async fn toggle_play_pause(&self, track: &Track, queue: &[Track]) {
        let inner = &self.inner;

        let queue: Vec<Track> = queue
            .iter()
            .filter(|t| !t.track_id.is_empty())
            .cloned()
            .collect();
        if !queue.is_empty() {
            inner.update(|s| s.current_track_list = queue);
        }

        let (is_current, is_playing) = {
            let state = inner.state.borrow();
            (
                !track.track_id.is_empty() && state.is_current(&track.track_id),
                state.is_playing,
            )
        };

        if is_current {
            if let Some(element) = inner.loaded_element() {
                let track_id = track.track_id.to_string();
                if is_playing {
                    element.pause();
                    inner.emit(PlaybackEvent::Paused {
                        track_id,
                        position_ms: to_millis(element.current_time()),
                    });
                } else {
                    match element.play().await {
                        Ok(()) => inner.emit(PlaybackEvent::Resumed {
                            track_id,
                            position_ms: to_millis(element.current_time()),
                        }),
                        Err(e) if e.is_interrupted() => {
                            debug!(error = %e, "Resume interrupted, ignoring")
                        }
                        Err(e) => {
                            inner.notifier.show_error(format!("Resume error: {}", e));
                        }
                    }
                }
                return;
            }
        }

        self.play_track(track).await;
    }

    /// Tear everything down and forget the track and the queue.
    pub fn stop_track(&self) {
        let inner = &self.inner;
        inner.next_generation();
        inner.release_media();

        let previous = inner.state.borrow().current_track_id().map(|id| id.to_string());
        inner.update(|s| {
            s.clear_track();
            s.owner = None;
            s.current_track_list.clear();
        });
        inner.emit(PlaybackEvent::Stopped { track_id: previous });
    }

    /// Rewind, drop the source and forget the current track. The queue is kept.
    pub fn reset_track(&self) {
        let inner = &self.inner;
        inner.next_generation();
        inner.sessions.destroy();

        if let Some(element) = inner.element.lock().clone() {
            element.pause();
            if let Err(e) = element.set_current_time(0.0) {
                warn!(error = %e, "Failed to rewind media element");
            }
            element.set_source(None);
        }

        let previous = inner.state.borrow().current_track_id().map(|id| id.to_string());
        inner.update(|s| {
            s.clear_track();
            s.owner = None;
        });
        inner.emit(PlaybackEvent::Stopped { track_id: previous });
    }

    /// Move the playhead to `time` seconds.
    ///
    /// Ignored when nothing is loaded or `time` is NaN, negative or past the
    /// known duration.
    pub fn seek(&self, time: f64) {
        let inner = &self.inner;
        let Some(element) = inner.element.lock().clone() else {
            return;
        };
        let (duration, track_id) = {
            let state = inner.state.borrow();
            (state.duration, state.current_track_id().map(|id| id.to_string()))
        };
        if time.is_nan() || time < 0.0 || time > duration {
            debug!(time, duration, "Seek out of range, ignoring");
            return;
        }

        inner.update(|s| s.current_time = time);
        if let Err(e) = element.set_current_time(time) {
            warn!(error = %e, time, "Failed to seek media element");
        }
        if let Some(track_id) = track_id {
            inner.emit(PlaybackEvent::Seeked {
                track_id,
                position_ms: to_millis(time),
            });
        }
    }

    /// [`seek`](Self::seek) with a textual position, as sliders report it.
    pub fn seek_str(&self, time: &str) {
        match time.trim().parse::<f64>() {
            Ok(time) => self.seek(time),
            Err(_) => debug!(input = time, "Unparseable seek position, ignoring"),
        }
    }
}

// ============================================================================
// Shared state
// ============================================================================

impl PlayerInner {
    fn next_generation(&self) -> u64 {
        self.request_generation.fetch_add(1, Ordering::SeqCst) + 1
    }

    fn is_current(&self, generation: u64) -> bool {
        self.request_generation.load(Ordering::SeqCst) == generation
    }

    fn update(&self, f: impl FnOnce(&mut PlaybackState)) {
        self.state.send_modify(f);
    }

    fn emit(&self, event: PlaybackEvent) {
        if self.event_bus.emit(CoreEvent::Playback(event)).is_err() {
            debug!("No playback event subscribers");
        }
    }

    fn element_or_create(&self) -> bridge_traits::error::Result<Arc<dyn MediaElement>> {
        let mut slot = self.element.lock();
        if let Some(element) = slot.as_ref() {
            return Ok(Arc::clone(element));
        }
        let element = self.media.create_audio_element()?;
        *slot = Some(Arc::clone(&element));
        Ok(element)
    }

    /// The element, if it has a stream attached.
    fn loaded_element(&self) -> Option<Arc<dyn MediaElement>> {
        let element = self.element.lock().clone()?;
        let has_source = element.source().is_some_and(|s| !s.is_empty());
        (has_source || self.sessions.is_active()).then_some(element)
    }

    fn release_media(&self) {
        self.sessions.destroy();
        if let Some(element) = self.element.lock().clone() {
            self.media.cleanup(&element);
        }
    }

    fn report_failure(&self, track: Option<&Track>, error: &PlaybackError) {
        warn!(error = %error, "Playback failed");
        let message = if error.is_precondition() {
            error.to_string()
        } else {
            format!("Error: {}", error)
        };
        self.notifier.show_error(message.clone());
        self.emit(PlaybackEvent::Error {
            track_id: track.map(|t| t.track_id.to_string()),
            message,
            recoverable: error.is_transient(),
        });
    }

    /// Media or stream failure after start-up.
    fn playback_failed(&self, message: String) {
        self.update(|s| {
            s.is_playing = false;
            s.is_loading = false;
        });
        self.notifier.show_error(message.clone());
        let track_id = self.state.borrow().current_track_id().map(|id| id.to_string());
        self.emit(PlaybackEvent::Error {
            track_id,
            message,
            recoverable: true,
        });
    }
}

// ============================================================================
// Media events
// ============================================================================

struct PlayerMediaListener {
    player: Weak<PlayerInner>,
    generation: u64,
}

impl MediaListener for PlayerMediaListener {
    fn on_event(&self, event: MediaEvent) {
        let Some(inner) = self.player.upgrade() else {
            return;
        };
        if !inner.is_current(self.generation) {
            return;
        }

        match event {
            MediaEvent::LoadStart | MediaEvent::Seeking => inner.update(|s| s.is_loading = true),
            MediaEvent::CanPlay | MediaEvent::Seeked => inner.update(|s| s.is_loading = false),
            MediaEvent::Play => inner.update(|s| s.is_playing = true),
            MediaEvent::Pause => inner.update(|s| s.is_playing = false),
            MediaEvent::Ended => {
                inner.update(|s| s.is_playing = false);
                let track_id = inner.state.borrow().current_track_id().map(|id| id.to_string());
                if let Some(track_id) = track_id {
                    inner.emit(PlaybackEvent::Completed { track_id });
                }
            }
            MediaEvent::Error(message) => {
                inner.playback_failed(format!("Playback error: {}", message));
            }
            MediaEvent::TimeUpdate(time) => inner.update(|s| s.current_time = time),
            MediaEvent::LoadedMetadata(duration) => {
                let duration = if duration.is_finite() && duration > 0.0 {
                    duration
                } else {
                    0.0
                };
                inner.update(|s| s.duration = duration);
            }
        }
    }
}

fn to_millis(seconds: f64) -> u64 {
    if seconds.is_finite() && seconds > 0.0 {
        (seconds * 1000.0) as u64
    } else {
        0
    }
}

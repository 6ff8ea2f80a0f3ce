//! Host fakes shared by the playback integration tests.

#![allow(dead_code)]

use async_trait::async_trait;
use bridge_traits::error::Result;
use bridge_traits::http::{HttpClient, HttpRequest, HttpResponse};
use bridge_traits::media::{
    MediaElement, MediaElementFactory, MediaElementOptions, MediaEvent, MediaListener, PlayError,
};
use bridge_traits::streaming::{StreamConfig, StreamEngine, StreamEvent, StreamHandle};
use bridge_traits::SecureStore;
use bytes::Bytes;
use core_auth::{AuthTokens, TokenStore};
use core_playback::{AudioElementManager, AudioPlayer, StreamSessionManager, TrackApiService};
use core_runtime::events::{CoreEvent, EventBus, PlaybackEvent};
use parking_lot::Mutex;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};
use url::Url;

// ============================================================================
// Media element
// ============================================================================

pub struct FakeMediaElement {
    source: Mutex<Option<String>>,
    paused: AtomicBool,
    current_time: Mutex<f64>,
    listener: Mutex<Option<Arc<dyn MediaListener>>>,
    native_hls: bool,
    pub reject_play: Mutex<Option<PlayError>>,
    pub plays: AtomicUsize,
    pub loads: AtomicUsize,
}

impl FakeMediaElement {
    pub fn new(native_hls: bool) -> Self {
        Self {
            source: Mutex::new(None),
            paused: AtomicBool::new(true),
            current_time: Mutex::new(0.0),
            listener: Mutex::new(None),
            native_hls,
            reject_play: Mutex::new(None),
            plays: AtomicUsize::new(0),
            loads: AtomicUsize::new(0),
        }
    }

    /// Dispatch a host event to the bound listener.
    pub fn emit(&self, event: MediaEvent) {
        let listener = self.listener.lock().clone();
        if let Some(listener) = listener {
            listener.on_event(event);
        }
    }
}

#[async_trait]
impl MediaElement for FakeMediaElement {
    async fn play(&self) -> std::result::Result<(), PlayError> {
        self.plays.fetch_add(1, Ordering::SeqCst);
        let rejection = self.reject_play.lock().clone();
        if let Some(err) = rejection {
            return Err(err);
        }
        self.paused.store(false, Ordering::SeqCst);
        self.emit(MediaEvent::Play);
        Ok(())
    }

    fn pause(&self) {
        let was_playing = !self.paused.swap(true, Ordering::SeqCst);
        if was_playing {
            self.emit(MediaEvent::Pause);
        }
    }

    fn source(&self) -> Option<String> {
        self.source.lock().clone()
    }

    fn set_source(&self, url: Option<String>) {
        *self.source.lock() = url;
    }

    fn load(&self) {
        self.loads.fetch_add(1, Ordering::SeqCst);
    }

    fn is_paused(&self) -> bool {
        self.paused.load(Ordering::SeqCst)
    }

    fn current_time(&self) -> f64 {
        *self.current_time.lock()
    }

    fn set_current_time(&self, seconds: f64) -> Result<()> {
        *self.current_time.lock() = seconds;
        Ok(())
    }

    fn duration(&self) -> f64 {
        f64::NAN
    }

    fn can_play_type(&self, mime: &str) -> bool {
        self.native_hls && mime == bridge_traits::HLS_MIME_TYPE
    }

    fn set_listener(&self, listener: Option<Arc<dyn MediaListener>>) {
        *self.listener.lock() = listener;
    }
}

#[derive(Default)]
pub struct FakeMediaFactory {
    pub native_hls: bool,
    pub created: Mutex<Vec<Arc<FakeMediaElement>>>,
}

impl FakeMediaFactory {
    pub fn element(&self) -> Arc<FakeMediaElement> {
        Arc::clone(&self.created.lock()[0])
    }
}

impl MediaElementFactory for FakeMediaFactory {
    fn create(&self, _options: &MediaElementOptions) -> Result<Arc<dyn MediaElement>> {
        let element = Arc::new(FakeMediaElement::new(self.native_hls));
        self.created.lock().push(Arc::clone(&element));
        Ok(element)
    }
}

// ============================================================================
// Streaming library
// ============================================================================

pub struct FakeSession {
    pub events: UnboundedSender<StreamEvent>,
    receiver: Mutex<Option<UnboundedReceiver<StreamEvent>>>,
    pub destroyed: AtomicBool,
    pub source: Mutex<Option<String>>,
}

impl FakeSession {
    pub fn is_destroyed(&self) -> bool {
        self.destroyed.load(Ordering::SeqCst)
    }
}

struct FakeHandle(Arc<FakeSession>);

impl StreamHandle for FakeHandle {
    fn attach_media(&self, media: Arc<dyn MediaElement>) -> Result<()> {
        media.set_source(Some("blob:media-source".to_string()));
        Ok(())
    }

    fn load_source(&self, url: &str) -> Result<()> {
        *self.0.source.lock() = Some(url.to_string());
        Ok(())
    }

    fn take_events(&self) -> Option<UnboundedReceiver<StreamEvent>> {
        self.0.receiver.lock().take()
    }

    fn destroy(&self) {
        self.0.destroyed.store(true, Ordering::SeqCst);
    }
}

pub struct FakeStreamEngine {
    pub supported: bool,
    pub sessions: Mutex<Vec<Arc<FakeSession>>>,
}

impl FakeStreamEngine {
    pub fn new(supported: bool) -> Self {
        Self {
            supported,
            sessions: Mutex::new(Vec::new()),
        }
    }

    pub fn session(&self, index: usize) -> Arc<FakeSession> {
        Arc::clone(&self.sessions.lock()[index])
    }

    pub fn live_sessions(&self) -> usize {
        self.sessions
            .lock()
            .iter()
            .filter(|s| !s.is_destroyed())
            .count()
    }
}

impl StreamEngine for FakeStreamEngine {
    fn is_supported(&self) -> bool {
        self.supported
    }

    fn create(&self, _config: &StreamConfig) -> Result<Box<dyn StreamHandle>> {
        let (tx, rx) = unbounded_channel();
        let session = Arc::new(FakeSession {
            events: tx,
            receiver: Mutex::new(Some(rx)),
            destroyed: AtomicBool::new(false),
            source: Mutex::new(None),
        });
        self.sessions.lock().push(Arc::clone(&session));
        Ok(Box::new(FakeHandle(session)))
    }
}

// ============================================================================
// Backend
// ============================================================================

/// Answers the metadata and stream endpoints. Every request yields once so
/// concurrent play requests interleave.
pub struct FakeBackend {
    pub metadata_status: u16,
    pub metadata_body: String,
    pub stream_status: u16,
    pub requests: Mutex<Vec<String>>,
}

impl Default for FakeBackend {
    fn default() -> Self {
        Self {
            metadata_status: 200,
            metadata_body: r#"{"owner":"ann","track_id":"1","title":"One"}"#.to_string(),
            stream_status: 200,
            requests: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl HttpClient for FakeBackend {
    async fn execute(&self, request: HttpRequest) -> Result<HttpResponse> {
        self.requests.lock().push(request.url.clone());
        tokio::task::yield_now().await;

        let (status, body) = if request.url.contains("/gettrackmetasend") {
            (self.metadata_status, self.metadata_body.clone())
        } else if request.url.contains("/streammusicsend") {
            (self.stream_status, String::new())
        } else {
            (404, String::new())
        };
        Ok(HttpResponse {
            status,
            headers: HashMap::new(),
            body: Bytes::from(body),
        })
    }
}

#[derive(Default)]
pub struct MemorySecureStore {
    storage: Mutex<HashMap<String, Vec<u8>>>,
}

#[async_trait]
impl SecureStore for MemorySecureStore {
    async fn set_secret(&self, key: &str, value: &[u8]) -> Result<()> {
        self.storage.lock().insert(key.to_string(), value.to_vec());
        Ok(())
    }

    async fn get_secret(&self, key: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.storage.lock().get(key).cloned())
    }

    async fn delete_secret(&self, key: &str) -> Result<()> {
        self.storage.lock().remove(key);
        Ok(())
    }

    async fn list_keys(&self) -> Result<Vec<String>> {
        Ok(self.storage.lock().keys().cloned().collect())
    }

    async fn clear_all(&self) -> Result<()> {
        self.storage.lock().clear();
        Ok(())
    }
}

// ============================================================================
// Harness
// ============================================================================

pub struct Harness {
    pub player: AudioPlayer,
    pub media: Arc<FakeMediaFactory>,
    pub engine: Arc<FakeStreamEngine>,
    pub event_bus: EventBus,
}

pub struct HarnessBuilder {
    http: Arc<dyn HttpClient>,
    token: Option<String>,
    hls_supported: bool,
    native_hls: bool,
}

impl HarnessBuilder {
    pub fn new() -> Self {
        Self {
            http: Arc::new(FakeBackend::default()),
            token: Some("token-123".to_string()),
            hls_supported: true,
            native_hls: false,
        }
    }

    pub fn http(mut self, http: Arc<dyn HttpClient>) -> Self {
        self.http = http;
        self
    }

    pub fn signed_out(mut self) -> Self {
        self.token = None;
        self
    }

    pub fn hls_supported(mut self, supported: bool) -> Self {
        self.hls_supported = supported;
        self
    }

    pub fn native_hls(mut self, native: bool) -> Self {
        self.native_hls = native;
        self
    }

    pub async fn build(self) -> Harness {
        let token_store = TokenStore::new(Arc::new(MemorySecureStore::default()));
        if let Some(token) = self.token {
            token_store
                .store(&AuthTokens::new(token, None))
                .await
                .unwrap();
        }

        let media = Arc::new(FakeMediaFactory {
            native_hls: self.native_hls,
            ..Default::default()
        });
        let engine = Arc::new(FakeStreamEngine::new(self.hls_supported));
        let event_bus = EventBus::new(64);

        let player = AudioPlayer::new(
            TrackApiService::new(
                self.http,
                Url::parse("http://localhost:8080").unwrap(),
                Duration::from_secs(5),
            ),
            token_store,
            AudioElementManager::new(media.clone(), MediaElementOptions::default()),
            StreamSessionManager::new(engine.clone(), StreamConfig::default()),
            event_bus.clone(),
        );

        Harness {
            player,
            media,
            engine,
            event_bus,
        }
    }
}

/// Let spawned session tasks drain their events.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}

/// Everything published on the bus since the last drain.
pub fn drain(events: &mut broadcast::Receiver<CoreEvent>) -> Vec<CoreEvent> {
    let mut drained = Vec::new();
    while let Ok(event) = events.try_recv() {
        drained.push(event);
    }
    drained
}

pub fn notification_titles(events: &[CoreEvent]) -> Vec<String> {
    events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::Notification(n) => Some(n.title.clone()),
            _ => None,
        })
        .collect()
}

pub fn playback_events(events: &[CoreEvent]) -> Vec<PlaybackEvent> {
    events
        .iter()
        .filter_map(|e| match e {
            CoreEvent::Playback(p) => Some(p.clone()),
            _ => None,
        })
        .collect()
}

//! Core service façade and bootstrap helpers.
//!
//! This crate wires host-provided bridge implementations into the shared Rust
//! core. HTTP and secure storage come from [`CoreConfig`]; desktop apps
//! typically enable the `desktop-shims` feature so those default to
//! `bridge-desktop`. The media element and the HLS library are always
//! supplied by the host through [`CoreDependencies`].

pub mod error;

pub use error::{CoreError, Result};

use std::sync::Arc;

use bridge_traits::{MediaElementFactory, StreamEngine};
use core_auth::{AuthManager, TokenStore};
use core_library::{
    ApiClient, CatalogRepository, PlaylistRepository, RemoteCatalogRepository,
    RemotePlaylistRepository,
};
use core_playback::{AudioElementManager, AudioPlayer, StreamSessionManager, TrackApiService};
use core_runtime::events::{CoreEvent, EventBus};
use core_runtime::CoreConfig;
use tokio::sync::broadcast;
use tracing::{info, warn};

/// Media bridges the host must provide.
pub struct CoreDependencies {
    pub media_factory: Arc<dyn MediaElementFactory>,
    pub stream_engine: Arc<dyn StreamEngine>,
}

impl CoreDependencies {
    pub fn new(
        media_factory: Arc<dyn MediaElementFactory>,
        stream_engine: Arc<dyn StreamEngine>,
    ) -> Self {
        Self {
            media_factory,
            stream_engine,
        }
    }
}

struct Services {
    config: CoreConfig,
    event_bus: EventBus,
    auth: AuthManager,
    catalog: Arc<dyn CatalogRepository>,
    playlists: Arc<dyn PlaylistRepository>,
    player: AudioPlayer,
}

/// Primary façade exposed to host applications.
#[derive(Clone)]
pub struct CoreService {
    services: Arc<Services>,
}

impl CoreService {
    /// Build every service from `config` and the host's media bridges.
    ///
    /// A session saved by a previous run is restored. Failing to read it is
    /// logged and the core starts signed out.
    pub async fn bootstrap(config: CoreConfig, deps: CoreDependencies) -> Result<Self> {
        config.validate()?;

        let event_bus = EventBus::new(config.event_buffer_size);
        let token_store = TokenStore::new(Arc::clone(&config.secure_store));
        if let Err(e) = token_store.load().await {
            warn!(error = %e, "Could not restore saved session");
        }

        let auth = AuthManager::new(
            Arc::clone(&config.http_client),
            token_store.clone(),
            event_bus.clone(),
            config.api_base_url.clone(),
            config.request_timeout,
        );

        let api = ApiClient::new(
            Arc::clone(&config.http_client),
            token_store.clone(),
            config.api_base_url.clone(),
            config.request_timeout,
        );
        let catalog: Arc<dyn CatalogRepository> =
            Arc::new(RemoteCatalogRepository::new(api.clone()));
        let playlists: Arc<dyn PlaylistRepository> =
            Arc::new(RemotePlaylistRepository::new(api, event_bus.clone()));

        let player = AudioPlayer::new(
            TrackApiService::new(
                Arc::clone(&config.http_client),
                config.api_base_url.clone(),
                config.request_timeout,
            ),
            token_store,
            AudioElementManager::new(deps.media_factory, config.media_options),
            StreamSessionManager::new(deps.stream_engine, config.stream_config.clone()),
            event_bus.clone(),
        );

        info!(
            api_base_url = %config.api_base_url,
            signed_in = auth.is_authenticated(),
            "Core service ready"
        );

        Ok(Self {
            services: Arc::new(Services {
                config,
                event_bus,
                auth,
                catalog,
                playlists,
                player,
            }),
        })
    }

    pub fn config(&self) -> &CoreConfig {
        &self.services.config
    }

    pub fn event_bus(&self) -> &EventBus {
        &self.services.event_bus
    }

    /// Receive auth, library, playback and notification events.
    pub fn subscribe_events(&self) -> broadcast::Receiver<CoreEvent> {
        self.services.event_bus.subscribe()
    }

    pub fn auth(&self) -> &AuthManager {
        &self.services.auth
    }

    pub fn catalog(&self) -> Arc<dyn CatalogRepository> {
        Arc::clone(&self.services.catalog)
    }

    pub fn playlists(&self) -> Arc<dyn PlaylistRepository> {
        Arc::clone(&self.services.playlists)
    }

    pub fn player(&self) -> &AudioPlayer {
        &self.services.player
    }
}

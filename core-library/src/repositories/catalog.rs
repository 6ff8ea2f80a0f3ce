//! Catalog repository: the public home feed and the user's uploads

use crate::api::{Access, ApiClient};
use crate::error::Result;
use crate::models::{HomeFeed, Track};
use crate::repositories::TrackWindow;
use async_trait::async_trait;
use tracing::debug;

/// Read-only access to catalog listings
#[async_trait]
pub trait CatalogRepository: Send + Sync {
    /// New tracks and popular artists from `GET /main`. Needs no sign-in.
    async fn home_feed(&self) -> Result<HomeFeed>;

    /// Tracks uploaded by the signed-in user
    async fn user_tracks(&self, window: TrackWindow) -> Result<Vec<Track>>;
}

/// Backend implementation of CatalogRepository
#[derive(Clone)]
pub struct RemoteCatalogRepository {
    api: ApiClient,
}

impl RemoteCatalogRepository {
    pub fn new(api: ApiClient) -> Self {
        Self { api }
    }
}

#[async_trait]
impl CatalogRepository for RemoteCatalogRepository {
    async fn home_feed(&self) -> Result<HomeFeed> {
        let feed: HomeFeed = self.api.get_json("/main", &[], Access::Public).await?;
        debug!(
            new_tracks = feed.new_tracks.len(),
            artists = feed.artists.len(),
            "Home feed loaded"
        );
        Ok(feed)
    }

    async fn user_tracks(&self, window: TrackWindow) -> Result<Vec<Track>> {
        let tracks: Option<Vec<Track>> = self
            .api
            .get_json("/getUserTracks", &window.query_pairs(), Access::Authenticated)
            .await?;
        Ok(tracks.unwrap_or_default())
    }
}

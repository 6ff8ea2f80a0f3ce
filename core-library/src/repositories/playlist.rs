//! Playlist repository trait and backend implementation

use crate::api::{Access, ApiClient};
use crate::error::{LibraryError, Result};
use crate::models::{validate_playlist_name, Playlist, PlaylistDetails, Track, TrackId};
use crate::repositories::{PageRequest, TrackWindow};
use async_trait::async_trait;
use core_runtime::events::{CoreEvent, EventBus, LibraryEvent};
use futures::future::join_all;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, info, warn};

/// Playlist repository interface for the signed-in user's playlists
#[async_trait]
pub trait PlaylistRepository: Send + Sync {
    /// List the user's playlists
    ///
    /// A response that is not an array yields an empty list.
    async fn list_playlists(&self) -> Result<Vec<Playlist>>;

    /// List playlists with `tracks_count` filled in
    ///
    /// Counts are fetched concurrently. A playlist whose count cannot be
    /// fetched keeps `tracks_count = None`.
    async fn list_playlists_with_counts(&self) -> Result<Vec<Playlist>>;

    /// Fetch a window of a playlist's tracks
    ///
    /// # Arguments
    /// * `name` - Playlist name
    /// * `window` - `start`/`end` range; [`TrackWindow::all`] for every track
    async fn playlist_tracks(&self, name: &str, window: TrackWindow) -> Result<Vec<Track>>;

    /// Load a playlist together with all of its tracks
    async fn playlist_details(&self, playlist: &Playlist) -> Result<PlaylistDetails>;

    /// Count a playlist's tracks by walking it in pages of 20 until a short
    /// page comes back
    ///
    /// A failed first page is an error. A later failure stops the walk and
    /// returns the tracks counted so far.
    async fn count_tracks(&self, name: &str) -> Result<u32>;

    /// Add a track to a playlist, creating the playlist when it does not exist
    ///
    /// # Errors
    /// Returns error if:
    /// - The track id or playlist name is empty
    /// - No access token is held
    /// - The backend rejects the request
    async fn add_track(&self, track_id: &TrackId, playlist: &str) -> Result<()>;

    /// Append a track to an existing playlist
    async fn append_track(&self, track_id: &TrackId, playlist: &str) -> Result<()>;

    /// Flip a playlist between public and private
    async fn toggle_visibility(&self, playlist: &str) -> Result<()>;
}

/// Body of `POST /addtracktoplaylist`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct AppendTrackRequest<'a> {
    playlist_name: &'a str,
    track_id: &'a str,
}

/// `/gettracksfromplaylist` returns either a bare array or `{ "tracks": [...] }`.
#[derive(Deserialize)]
#[serde(untagged)]
enum PlaylistTracksResponse {
    List(Vec<Track>),
    Wrapped {
        #[serde(default)]
        tracks: Vec<Track>,
    },
}

impl From<PlaylistTracksResponse> for Vec<Track> {
    fn from(response: PlaylistTracksResponse) -> Self {
        match response {
            PlaylistTracksResponse::List(tracks) => tracks,
            PlaylistTracksResponse::Wrapped { tracks } => tracks,
        }
    }
}

/// Backend implementation of PlaylistRepository
#[derive(Clone)]
pub struct RemotePlaylistRepository {
    api: ApiClient,
    event_bus: EventBus,
}

impl RemotePlaylistRepository {
    /// Create a new RemotePlaylistRepository
    pub fn new(api: ApiClient, event_bus: EventBus) -> Self {
        Self { api, event_bus }
    }

    fn emit(&self, event: LibraryEvent) {
        if self.event_bus.emit(CoreEvent::Library(event)).is_err() {
            debug!("No library event subscribers");
        }
    }
}

fn validate_target(track_id: &TrackId, playlist: &str) -> Result<()> {
    if track_id.is_empty() {
        return Err(LibraryError::InvalidInput {
            field: "track_id".to_string(),
            message: "Track ID missing".to_string(),
        });
    }
    validate_playlist_name(playlist).map_err(|message| LibraryError::InvalidInput {
        field: "playlist".to_string(),
        message,
    })
}

#[async_trait]
impl PlaylistRepository for RemotePlaylistRepository {
    async fn list_playlists(&self) -> Result<Vec<Playlist>> {
        let raw: Value = self
            .api
            .get_json("/getuserplaylists", &[], Access::Authenticated)
            .await?;

        let Value::Array(items) = raw else {
            warn!("Playlist listing was not an array");
            return Ok(Vec::new());
        };

        items
            .into_iter()
            .map(|item| {
                serde_json::from_value(item).map_err(|source| LibraryError::Decode {
                    context: "playlist entry".to_string(),
                    source,
                })
            })
            .collect()
    }

    async fn list_playlists_with_counts(&self) -> Result<Vec<Playlist>> {
        let playlists = self.list_playlists().await?;

        let counts = join_all(playlists.iter().map(|p| self.count_tracks(&p.name))).await;

        Ok(playlists
            .into_iter()
            .zip(counts)
            .map(|(mut playlist, count)| {
                match count {
                    Ok(count) => playlist.tracks_count = Some(count),
                    Err(e) => warn!(playlist = %playlist.name, error = %e, "Failed to count tracks"),
                }
                playlist
            })
            .collect())
    }

    async fn playlist_tracks(&self, name: &str, window: TrackWindow) -> Result<Vec<Track>> {
        let [start, end] = window.query_pairs();
        let query = [("playlistName", name.to_string()), start, end];

        let response: PlaylistTracksResponse = self
            .api
            .get_json("/gettracksfromplaylist", &query, Access::Authenticated)
            .await?;
        Ok(response.into())
    }

    async fn playlist_details(&self, playlist: &Playlist) -> Result<PlaylistDetails> {
        let tracks = self
            .playlist_tracks(&playlist.name, TrackWindow::all())
            .await?;

        Ok(PlaylistDetails {
            name: playlist.name.clone(),
            owner: playlist.owner.clone(),
            status: playlist.status,
            tracks,
        })
    }

    async fn count_tracks(&self, name: &str) -> Result<u32> {
        let mut page = PageRequest::default();
        let mut total: u32 = 0;

        loop {
            let tracks = match self.playlist_tracks(name, page.window()).await {
                Ok(tracks) => tracks,
                Err(e) if page.page > 0 => {
                    warn!(playlist = name, total, error = %e, "Page failed, keeping partial count");
                    break;
                }
                Err(e) => return Err(e),
            };
            total = total.saturating_add(tracks.len() as u32);
            if page.is_last(tracks.len()) {
                break;
            }
            page = page.next();
        }

        debug!(playlist = name, total, "Counted playlist tracks");
        Ok(total)
    }

    async fn add_track(&self, track_id: &TrackId, playlist: &str) -> Result<()> {
        validate_target(track_id, playlist)?;
        let playlist = playlist.trim();

        let query = [
            ("trackID", track_id.to_string()),
            ("playlistName", playlist.to_string()),
        ];
        self.api
            .post::<Value>("/addtoplaylist", &query, None)
            .await?;

        info!(track_id = %track_id, playlist, "Track added to playlist");
        self.emit(LibraryEvent::TrackAddedToPlaylist {
            track_id: track_id.to_string(),
            playlist: playlist.to_string(),
        });
        Ok(())
    }

    async fn append_track(&self, track_id: &TrackId, playlist: &str) -> Result<()> {
        validate_target(track_id, playlist)?;

        let body = AppendTrackRequest {
            playlist_name: playlist,
            track_id: track_id.as_str(),
        };
        self.api
            .post("/addtracktoplaylist", &[], Some(&body))
            .await?;

        info!(track_id = %track_id, playlist, "Track appended to playlist");
        self.emit(LibraryEvent::TrackAddedToPlaylist {
            track_id: track_id.to_string(),
            playlist: playlist.to_string(),
        });
        Ok(())
    }

    async fn toggle_visibility(&self, playlist: &str) -> Result<()> {
        validate_playlist_name(playlist).map_err(|message| LibraryError::InvalidInput {
            field: "playlist".to_string(),
            message,
        })?;

        self.api
            .post::<Value>(
                "/playlistchangestatus",
                &[("playlistName", playlist.to_string())],
                None,
            )
            .await?;

        info!(playlist, "Playlist visibility toggled");
        self.emit(LibraryEvent::PlaylistVisibilityToggled {
            playlist: playlist.to_string(),
        });
        Ok(())
    }
}

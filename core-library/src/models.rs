//! Domain models for the remote catalog
//!
//! These mirror the JSON the backend returns. The backend is loose about
//! types (track ids arrive as strings or numbers, playlists as bare names or
//! objects), so deserialization is lenient and normalizes into one shape.

use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

// =============================================================================
// ID Types
// =============================================================================

/// Backend track identifier.
///
/// Serialized as a string; accepts a JSON string or number on input. An
/// empty id marks a track that cannot be played.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize)]
#[serde(transparent)]
pub struct TrackId(String);

impl TrackId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into().trim().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for TrackId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TrackId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for TrackId {
    fn from(id: String) -> Self {
        Self::new(id)
    }
}

impl From<u64> for TrackId {
    fn from(id: u64) -> Self {
        Self(id.to_string())
    }
}

impl<'de> Deserialize<'de> for TrackId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
        Ok(raw.map(|v| TrackId::new(v.into_string())).unwrap_or_default())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    Text(String),
    Unsigned(u64),
    Signed(i64),
    Float(f64),
}

impl StringOrNumber {
    fn into_string(self) -> String {
        match self {
            StringOrNumber::Text(s) => s,
            StringOrNumber::Unsigned(n) => n.to_string(),
            StringOrNumber::Signed(n) => n.to_string(),
            StringOrNumber::Float(n) => n.to_string(),
        }
    }
}

fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<StringOrNumber>::deserialize(deserializer)?;
    Ok(raw
        .map(StringOrNumber::into_string)
        .filter(|s| !s.trim().is_empty()))
}

// =============================================================================
// Domain Models
// =============================================================================

/// A track as listed by the catalog, playlists and the home feed.
///
/// Immutable once fetched. Selecting a different track replaces the value
/// wholesale.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Track {
    #[serde(default)]
    pub track_id: TrackId,
    #[serde(default)]
    pub title: String,
    /// `/getUserTracks` calls this field `artist`.
    #[serde(default, alias = "artist")]
    pub artist_name: Option<String>,
    /// Length in seconds
    #[serde(default)]
    pub duration: Option<f64>,
    /// Cover image URL
    #[serde(default)]
    pub track_picture: Option<String>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default, deserialize_with = "lenient_string")]
    pub release_year: Option<String>,
    #[serde(default)]
    pub likes: Option<u64>,

    // Catalog listing extras
    #[serde(default)]
    pub album_name: Option<String>,
    #[serde(default)]
    pub owner: Option<String>,
    #[serde(default)]
    pub plays: Option<u64>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub add_to_db_date: Option<String>,
}

impl Track {
    pub fn new(track_id: impl Into<TrackId>, title: impl Into<String>) -> Self {
        Self {
            track_id: track_id.into(),
            title: title.into(),
            ..Default::default()
        }
    }

    pub fn with_artist(mut self, artist_name: impl Into<String>) -> Self {
        self.artist_name = Some(artist_name.into());
        self
    }

    pub fn with_duration(mut self, seconds: f64) -> Self {
        self.duration = Some(seconds);
        self
    }

    /// Whether the track has an id the player can request.
    pub fn is_playable(&self) -> bool {
        !self.track_id.is_empty()
    }

    /// `add_to_db_date` as a timestamp. Accepts RFC 3339 and
    /// `YYYY-MM-DD HH:MM:SS` (treated as UTC).
    pub fn added_at(&self) -> Option<DateTime<Utc>> {
        let raw = self.add_to_db_date.as_deref()?.trim();
        if let Ok(parsed) = DateTime::parse_from_rfc3339(raw) {
            return Some(parsed.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(raw, "%Y-%m-%d %H:%M:%S")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn formatted_duration(&self) -> String {
        format_duration(self.duration)
    }
}

/// Whether other users can see a playlist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum PlaylistVisibility {
    #[default]
    Public,
    Private,
}

impl PlaylistVisibility {
    pub fn toggled(self) -> Self {
        match self {
            PlaylistVisibility::Public => PlaylistVisibility::Private,
            PlaylistVisibility::Private => PlaylistVisibility::Public,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            PlaylistVisibility::Public => "public",
            PlaylistVisibility::Private => "private",
        }
    }
}

impl From<String> for PlaylistVisibility {
    fn from(value: String) -> Self {
        if value.trim().eq_ignore_ascii_case("private") {
            PlaylistVisibility::Private
        } else {
            PlaylistVisibility::Public
        }
    }
}

impl From<PlaylistVisibility> for String {
    fn from(value: PlaylistVisibility) -> Self {
        value.as_str().to_string()
    }
}

/// Entry of `/getuserplaylists`. The backend returns either the bare name
/// or an object.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "PlaylistEntry")]
pub struct Playlist {
    pub name: String,
    pub owner: Option<String>,
    pub status: PlaylistVisibility,
    /// Filled in by [`PlaylistRepository::list_playlists_with_counts`](crate::repositories::PlaylistRepository::list_playlists_with_counts)
    pub tracks_count: Option<u32>,
}

impl Playlist {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            owner: None,
            status: PlaylistVisibility::default(),
            tracks_count: None,
        }
    }
}

pub(crate) fn validate_playlist_name(name: &str) -> Result<(), String> {
    if name.trim().is_empty() {
        return Err("Playlist name cannot be empty".to_string());
    }
    Ok(())
}

#[derive(Deserialize)]
#[serde(untagged)]
enum PlaylistEntry {
    Name(String),
    Full {
        name: String,
        #[serde(default)]
        owner: Option<String>,
        #[serde(default)]
        status: Option<PlaylistVisibility>,
        #[serde(default, alias = "tracksCount")]
        tracks_count: Option<u32>,
    },
}

impl From<PlaylistEntry> for Playlist {
    fn from(entry: PlaylistEntry) -> Self {
        match entry {
            PlaylistEntry::Name(name) => Playlist::new(name),
            PlaylistEntry::Full {
                name,
                owner,
                status,
                tracks_count,
            } => Playlist {
                name,
                owner,
                status: status.unwrap_or_default(),
                tracks_count,
            },
        }
    }
}

/// A playlist with all of its tracks loaded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaylistDetails {
    pub name: String,
    pub owner: Option<String>,
    pub status: PlaylistVisibility,
    pub tracks: Vec<Track>,
}

/// Popular artist shown on the home feed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artist {
    pub name: String,
    #[serde(default)]
    pub plays: u64,
}

/// Body of `GET /main`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(from = "RawHomeFeed")]
pub struct HomeFeed {
    pub new_tracks: Vec<Track>,
    pub artists: Vec<Artist>,
}

#[derive(Deserialize)]
struct RawHomeFeed {
    #[serde(default)]
    tracks: Option<RawHomeTracks>,
    #[serde(default)]
    artists: Option<Vec<Artist>>,
}

#[derive(Deserialize)]
struct RawHomeTracks {
    #[serde(default, rename = "newTracks")]
    new_tracks: Option<Vec<Track>>,
}

impl From<RawHomeFeed> for HomeFeed {
    fn from(raw: RawHomeFeed) -> Self {
        HomeFeed {
            new_tracks: raw
                .tracks
                .and_then(|t| t.new_tracks)
                .unwrap_or_default(),
            artists: raw.artists.unwrap_or_default(),
        }
    }
}

/// Format a length in seconds as `m:ss`.
///
/// Missing, zero, negative and non-finite values render as `0:00`.
///
/// ```
/// use core_library::models::format_duration;
///
/// assert_eq!(format_duration(Some(185.7)), "3:05");
/// assert_eq!(format_duration(None), "0:00");
/// ```
pub fn format_duration(seconds: Option<f64>) -> String {
    let seconds = match seconds {
        Some(s) if s.is_finite() && s > 0.0 => s.floor() as u64,
        _ => return "0:00".to_string(),
    };
    format!("{}:{:02}", seconds / 60, seconds % 60)
}

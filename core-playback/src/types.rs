//! # Player State Types

use core_library::models::{Track, TrackId};
use serde::{Deserialize, Deserializer, Serialize};

/// Coarse player status derived from [`PlaybackState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlayerStatus {
    /// Nothing selected.
    Idle,
    /// A track is selected and its stream is loading or buffering.
    Loading,
    Playing,
    /// A track is selected but not playing.
    Paused,
}

/// Observable state of the player.
///
/// Owned by [`AudioPlayer`](crate::player::AudioPlayer) and published through a
/// `watch` channel after every change.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaybackState {
    pub current_track: Option<Track>,
    /// Whether the media element is actually playing.
    pub is_playing: bool,
    pub is_loading: bool,
    /// Position in seconds.
    pub current_time: f64,
    /// Duration in seconds, `0` until metadata is loaded.
    pub duration: f64,
    /// Queue used by next/previous navigation.
    pub current_track_list: Vec<Track>,
    /// Username that owns the current track's stream.
    pub owner: Option<String>,
}

impl PlaybackState {
    pub fn status(&self) -> PlayerStatus {
        match (&self.current_track, self.is_loading, self.is_playing) {
            (None, _, _) => PlayerStatus::Idle,
            (Some(_), true, _) => PlayerStatus::Loading,
            (Some(_), false, true) => PlayerStatus::Playing,
            (Some(_), false, false) => PlayerStatus::Paused,
        }
    }

    pub fn current_track_id(&self) -> Option<&TrackId> {
        self.current_track.as_ref().map(|t| &t.track_id)
    }

    pub fn is_current(&self, track_id: &TrackId) -> bool {
        self.current_track_id() == Some(track_id)
    }

    /// Forget the current track and its position. The queue is kept.
    pub(crate) fn clear_track(&mut self) {
        self.current_track = None;
        self.is_playing = false;
        self.is_loading = false;
        self.current_time = 0.0;
        self.duration = 0.0;
    }
}

/// Response of `GET /gettrackmetasend`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TrackMetadata {
    #[serde(default, deserialize_with = "non_empty")]
    pub owner: Option<String>,
    #[serde(default)]
    pub track_id: TrackId,
    #[serde(default)]
    pub title: Option<String>,
    #[serde(default)]
    pub artist_name: Option<String>,
    #[serde(default)]
    pub duration: Option<f64>,
    #[serde(default)]
    pub genre: Option<String>,
    #[serde(default)]
    pub release_year: Option<serde_json::Value>,
    #[serde(default)]
    pub likes: Option<u64>,
}

impl TrackMetadata {
    /// The owner username, needed to build the stream URL.
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }
}

fn non_empty<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<String>, D::Error> {
    let value = Option::<String>::deserialize(deserializer)?;
    Ok(value.filter(|s| !s.trim().is_empty()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_derivation() {
        let mut state = PlaybackState::default();
        assert_eq!(state.status(), PlayerStatus::Idle);

        state.current_track = Some(Track::new("1", "One"));
        state.is_loading = true;
        assert_eq!(state.status(), PlayerStatus::Loading);

        state.is_loading = false;
        state.is_playing = true;
        assert_eq!(state.status(), PlayerStatus::Playing);

        state.is_playing = false;
        assert_eq!(state.status(), PlayerStatus::Paused);
    }

    #[test]
    fn test_clear_track_keeps_queue() {
        let mut state = PlaybackState {
            current_track: Some(Track::new("1", "One")),
            is_playing: true,
            current_time: 12.0,
            duration: 180.0,
            current_track_list: vec![Track::new("1", "One")],
            ..Default::default()
        };

        state.clear_track();
        assert_eq!(state.status(), PlayerStatus::Idle);
        assert_eq!(state.current_time, 0.0);
        assert_eq!(state.current_track_list.len(), 1);
    }

    #[test]
    fn test_metadata_owner() {
        let meta: TrackMetadata =
            serde_json::from_value(json!({ "owner": "ann", "track_id": 4, "release_year": 2020 }))
                .unwrap();
        assert_eq!(meta.owner(), Some("ann"));
        assert_eq!(meta.track_id.as_str(), "4");

        let meta: TrackMetadata = serde_json::from_value(json!({ "owner": "  " })).unwrap();
        assert_eq!(meta.owner(), None);
    }
}

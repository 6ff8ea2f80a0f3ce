//! Circular next/previous navigation over the player's queue.

use crate::player::AudioPlayer;
use core_library::models::{Track, TrackId};
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Next,
    Previous,
}

/// Index of the neighbour of `current` in `queue`, wrapping at both ends.
///
/// `None` when the queue is empty or `current` is not in it.
pub fn neighbour_index(queue: &[Track], current: &TrackId, direction: Direction) -> Option<usize> {
    let len = queue.len();
    let index = queue.iter().position(|t| &t.track_id == current)?;
    Some(match direction {
        Direction::Next => (index + 1) % len,
        Direction::Previous => (index + len - 1) % len,
    })
}

impl AudioPlayer {
    /// Play the track after the current one, wrapping to the first.
    pub async fn play_next_track(&self) {
        self.step(Direction::Next).await;
    }

    /// Play the track before the current one, wrapping to the last.
    pub async fn play_previous_track(&self) {
        self.step(Direction::Previous).await;
    }

    async fn step(&self, direction: Direction) {
        let (target, queue) = {
            let state = self.state();
            let target = state.current_track_id().and_then(|current| {
                neighbour_index(&state.current_track_list, current, direction)
                    .map(|i| state.current_track_list[i].clone())
            });
            (target, state.current_track_list)
        };

        match target {
            Some(track) if !track.track_id.is_empty() => {
                self.toggle_play_pause(&track, &queue).await;
            }
            _ => {
                debug!(?direction, "No track to move to, stopping");
                self.stop_track();
            }
        }
    }
}

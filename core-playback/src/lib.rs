//! # Playback Module
//!
//! Drives the host's audio element to play HLS streams from the backend.
//!
//! ## Overview
//!
//! This module handles:
//! - Starting a track: metadata lookup, stream check, session attach
//! - Play/pause toggling and seeking
//! - Circular next/previous navigation over the current queue
//! - HLS session lifecycle and error recovery
//!
//! ## Components
//!
//! - [`AudioPlayer`] - Playback orchestrator and state owner
//! - [`StreamSessionManager`] - One live HLS session at a time
//! - [`AudioElementManager`] - Creates and resets the media element
//! - [`TrackApiService`] - Metadata and stream endpoints
//!
//! The player reports failures as notifications on the event bus rather than
//! returning them; observe [`PlaybackState`] through [`AudioPlayer::subscribe`].

pub mod api;
pub mod error;
pub mod media;
pub mod player;
pub mod queue;
pub mod session;
pub mod types;

pub use api::TrackApiService;
pub use error::{PlaybackError, Result};
pub use media::AudioElementManager;
pub use player::AudioPlayer;
pub use queue::{neighbour_index, Direction};
pub use session::{ErrorCallback, StreamSessionManager};
pub use types::{PlaybackState, PlayerStatus, TrackMetadata};

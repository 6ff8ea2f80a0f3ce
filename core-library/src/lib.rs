//! # Library Module
//!
//! Remote catalog access for the streaming backend.
//!
//! ## Overview
//!
//! This module manages:
//! - Track, playlist and artist models as the backend returns them
//! - The home feed and the user's uploaded tracks
//! - Playlist listing, paging, track counts and edits
//! - Duration formatting for track listings

pub mod api;
pub mod error;
pub mod models;
pub mod repositories;

pub use api::{Access, ApiClient};
pub use error::{LibraryError, Result};
pub use models::{
    format_duration, Artist, HomeFeed, Playlist, PlaylistDetails, PlaylistVisibility, Track,
    TrackId,
};
pub use repositories::{
    CatalogRepository, PlaylistRepository, RemoteCatalogRepository, RemotePlaylistRepository,
    TrackWindow,
};

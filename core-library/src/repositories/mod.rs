//! # Repository Pattern Implementation
//!
//! Repository traits over the backend's catalog and playlist endpoints.
//!
//! ## Architecture
//!
//! - Traits define the interface for each repository
//! - `Remote*` implementations go through [`ApiClient`](crate::api::ApiClient)
//! - All operations return `Result<T>` for error handling
//! - Listings take a [`TrackWindow`] (`start`/`end`)
//!
//! ## Available Repositories
//!
//! - `CatalogRepository` - Home feed and the user's uploaded tracks
//! - `PlaylistRepository` - User playlists with track management

pub mod catalog;
pub mod pagination;
pub mod playlist;

pub use catalog::{CatalogRepository, RemoteCatalogRepository};
pub use pagination::{PageRequest, TrackWindow, DEFAULT_PAGE_SIZE};
pub use playlist::{PlaylistRepository, RemotePlaylistRepository};

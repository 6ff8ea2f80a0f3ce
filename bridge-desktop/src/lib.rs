//! # Desktop Bridge Implementations
//!
//! Default implementations of bridge traits for desktop platforms
//! (macOS, Windows, Linux).
//!
//! ## Overview
//!
//! - [`ReqwestHttpClient`]: backend calls over `reqwest` with rustls, retrying
//!   `GET`s on transient failures
//! - [`KeyringSecureStore`]: access and refresh tokens in the OS keychain
//!
//! `core-runtime` picks these up as defaults when its `desktop-shims` feature
//! is on. Media elements and the HLS engine have no desktop default; the
//! embedding application injects them.
//!
//! ## Feature Flags
//!
//! - `secure-store`: Enable OS keychain integration (default)
//!
//! ## Usage
//!
//! ```ignore
//! use bridge_desktop::{KeyringSecureStore, ReqwestHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> bridge_traits::error::Result<()> {
//!     let http_client = ReqwestHttpClient::new()?;
//!     let secure_store = KeyringSecureStore::new();
//!
//!     // Use in core configuration
//!     Ok(())
//! }
//! ```

mod http;

#[cfg(feature = "secure-store")]
mod secure_store;

pub use http::ReqwestHttpClient;

#[cfg(feature = "secure-store")]
pub use secure_store::KeyringSecureStore;

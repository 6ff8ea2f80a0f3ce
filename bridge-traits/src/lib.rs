//! # Host Bridge Traits
//!
//! Platform abstraction traits that must be implemented by each host platform.
//!
//! ## Overview
//!
//! This crate defines the contract between the player core and the host it
//! runs in. Each trait represents a capability the core requires but cannot
//! provide itself: the network, credential storage, the native audio element
//! and the adaptive streaming library.
//!
//! ## Traits
//!
//! ### Networking
//! - [`HttpClient`](http::HttpClient) - Async HTTP operations with bearer auth, retry, TLS
//!
//! ### Security & Storage
//! - [`SecureStore`](storage::SecureStore) - Credential persistence (Keychain/Keystore)
//!
//! ### Media
//! - [`MediaElement`](media::MediaElement) - Native audio element (play, pause, seek, events)
//! - [`MediaElementFactory`](media::MediaElementFactory) - Creates media elements on demand
//! - [`StreamEngine`](streaming::StreamEngine) - HLS library entry point
//! - [`StreamHandle`](streaming::StreamHandle) - One live HLS attachment
//!
//! ## Platform Requirements
//!
//! | Platform | Implementation Crate | Status |
//! |----------|---------------------|--------|
//! | Desktop  | `bridge-desktop`    | HTTP + secure store |
//!
//! Media and streaming adapters are always injected by the host.
//!
//! A missing capability is reported when `CoreConfig` is built
//! (`Error::CapabilityMissing`), never at first use. Every trait is
//! `Send + Sync`; implementations are shared across tasks behind `Arc`.

pub mod error;
pub mod http;
pub mod media;
pub mod storage;
pub mod streaming;

pub use error::BridgeError;

pub use http::{HttpClient, HttpMethod, HttpRequest, HttpResponse, RetryPolicy};
pub use media::{
    CrossOrigin, MediaElement, MediaElementFactory, MediaElementOptions, MediaEvent,
    MediaListener, PlayError, Preload, HLS_MIME_TYPE,
};
pub use storage::SecureStore;
pub use streaming::{StreamConfig, StreamEngine, StreamEvent, StreamHandle};

//! # Core Configuration Module
//!
//! Provides configuration management for the player core.
//!
//! ## Overview
//!
//! The configuration system uses a builder pattern to construct a `CoreConfig`
//! instance that holds the backend location, streaming parameters and the
//! bridges every service needs. It enforces fail-fast validation so a
//! misconfigured host errors at startup, not at the first click on "play".
//!
//! ## Required Dependencies
//!
//! - `HttpClient` - Backend API access (desktop default: reqwest)
//! - `SecureStore` - Access/refresh token persistence (desktop default: keyring)
//!
//! When the `desktop-shims` feature is enabled, desktop-ready defaults are
//! injected automatically if not provided.
//!
//! ## Usage
//!
//! ```ignore
//! use core_runtime::config::CoreConfig;
//! use std::time::Duration;
//!
//! let config = CoreConfig::builder()
//!     .api_base_url("https://music.example.com")
//!     .request_timeout(Duration::from_secs(15))
//!     .http_client(Arc::new(MyHttpClient))
//!     .secure_store(Arc::new(MySecureStore))
//!     .build()?;
//! ```

use crate::error::{Error, Result};
use crate::events::DEFAULT_EVENT_BUFFER_SIZE;
use bridge_traits::{HttpClient, MediaElementOptions, SecureStore, StreamConfig};
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Backend address used when none is configured.
pub const DEFAULT_API_BASE_URL: &str = "http://localhost:8080";

/// Default per-request timeout for backend calls.
pub const DEFAULT_REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

const MAX_REQUEST_TIMEOUT: Duration = Duration::from_secs(300);

/// Core configuration for the player core.
///
/// Use [`CoreConfigBuilder`] to construct instances.
#[derive(Clone)]
pub struct CoreConfig {
    /// Root of the backend HTTP API
    pub api_base_url: Url,

    /// Timeout applied to every backend request
    pub request_timeout: Duration,

    /// Parameters handed to the HLS library for every new session
    pub stream_config: StreamConfig,

    /// Options applied when the audio element is created
    pub media_options: MediaElementOptions,

    /// Capacity of the event bus channel
    pub event_buffer_size: usize,

    /// HTTP client for backend requests (required)
    pub http_client: Arc<dyn HttpClient>,

    /// Token storage (required)
    pub secure_store: Arc<dyn SecureStore>,
}

impl std::fmt::Debug for CoreConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CoreConfig")
            .field("api_base_url", &self.api_base_url.as_str())
            .field("request_timeout", &self.request_timeout)
            .field("stream_config", &self.stream_config)
            .field("media_options", &self.media_options)
            .field("event_buffer_size", &self.event_buffer_size)
            .field("http_client", &"HttpClient { ... }")
            .field("secure_store", &"SecureStore { ... }")
            .finish()
    }
}

impl CoreConfig {
    /// Creates a new builder for constructing a `CoreConfig`.
    pub fn builder() -> CoreConfigBuilder {
        CoreConfigBuilder::default()
    }

    /// Validates the configuration and returns an error if invalid.
    ///
    /// This checks:
    /// - The API base URL is an http(s) URL without query or fragment
    /// - The request timeout is non-zero and at most five minutes
    /// - The event buffer can hold at least one event
    pub fn validate(&self) -> Result<()> {
        validate_api_base_url(&self.api_base_url)?;

        if self.request_timeout.is_zero() {
            return Err(Error::Config(
                "Request timeout must be greater than zero".to_string(),
            ));
        }

        if self.request_timeout > MAX_REQUEST_TIMEOUT {
            return Err(Error::Config(format!(
                "Request timeout exceeds maximum of {} seconds",
                MAX_REQUEST_TIMEOUT.as_secs()
            )));
        }

        if self.event_buffer_size == 0 {
            return Err(Error::Config(
                "Event buffer size must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Join an endpoint path onto the API base URL.
    ///
    /// ```
    /// # use core_runtime::config::api_url;
    /// # use url::Url;
    /// let base = Url::parse("http://localhost:8080").unwrap();
    /// assert_eq!(api_url(&base, "/main"), "http://localhost:8080/main");
    /// ```
    pub fn endpoint(&self, path: &str) -> String {
        api_url(&self.api_base_url, path)
    }
}

/// Join an endpoint path onto a base URL, keeping any path prefix the base has.
pub fn api_url(base: &Url, path: &str) -> String {
    format!(
        "{}/{}",
        base.as_str().trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}

fn validate_api_base_url(url: &Url) -> Result<()> {
    if !matches!(url.scheme(), "http" | "https") {
        return Err(Error::Config(format!(
            "API base URL must use http or https, got '{}'",
            url.scheme()
        )));
    }

    if url.query().is_some() || url.fragment().is_some() {
        return Err(Error::Config(
            "API base URL must not contain a query string or fragment".to_string(),
        ));
    }

    Ok(())
}

#[cfg(not(feature = "desktop-shims"))]
fn http_client_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "HttpClient".to_string(),
        message: "HttpClient implementation is required for backend requests. \
                 Desktop: enable the 'desktop-shims' feature to use the default ReqwestHttpClient. \
                 Other hosts: inject a platform-native adapter."
            .to_string(),
    }
}

#[cfg(not(feature = "desktop-shims"))]
fn secure_store_missing_error() -> Error {
    Error::CapabilityMissing {
        capability: "SecureStore".to_string(),
        message: "SecureStore implementation is required for token persistence. \
                 Desktop: enable the 'desktop-shims' feature to use the default KeyringSecureStore. \
                 Web: inject a localStorage-backed store."
            .to_string(),
    }
}

#[cfg(feature = "desktop-shims")]
fn provide_default_http_client(timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    use bridge_desktop::ReqwestHttpClient;

    let client =
        ReqwestHttpClient::with_timeout(timeout).map_err(|source| Error::DefaultBridge {
            capability: "HttpClient",
            source,
        })?;
    Ok(Arc::new(client))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_http_client(_timeout: Duration) -> Result<Arc<dyn HttpClient>> {
    Err(http_client_missing_error())
}

#[cfg(feature = "desktop-shims")]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    use bridge_desktop::KeyringSecureStore;

    Ok(Arc::new(KeyringSecureStore::new()))
}

#[cfg(not(feature = "desktop-shims"))]
fn provide_default_secure_store() -> Result<Arc<dyn SecureStore>> {
    Err(secure_store_missing_error())
}

/// Builder for constructing [`CoreConfig`] instances.
#[derive(Default)]
pub struct CoreConfigBuilder {
    api_base_url: Option<String>,
    request_timeout: Option<Duration>,
    stream_config: Option<StreamConfig>,
    media_options: Option<MediaElementOptions>,
    event_buffer_size: Option<usize>,
    http_client: Option<Arc<dyn HttpClient>>,
    secure_store: Option<Arc<dyn SecureStore>>,
}

impl CoreConfigBuilder {
    /// Sets the backend root, e.g. `https://music.example.com`.
    pub fn api_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = Some(url.into());
        self
    }

    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = Some(timeout);
        self
    }

    /// Overrides the HLS session parameters.
    pub fn stream_config(mut self, config: StreamConfig) -> Self {
        self.stream_config = Some(config);
        self
    }

    pub fn media_options(mut self, options: MediaElementOptions) -> Self {
        self.media_options = Some(options);
        self
    }

    pub fn event_buffer_size(mut self, size: usize) -> Self {
        self.event_buffer_size = Some(size);
        self
    }

    /// Sets the HTTP client implementation.
    pub fn http_client(mut self, client: Arc<dyn HttpClient>) -> Self {
        self.http_client = Some(client);
        self
    }

    /// Sets the secure store implementation.
    pub fn secure_store(mut self, store: Arc<dyn SecureStore>) -> Self {
        self.secure_store = Some(store);
        self
    }

    /// Builds the final `CoreConfig` instance.
    ///
    /// # Errors
    ///
    /// - [`Error::Config`] when the base URL does not parse or a value is out of range
    /// - [`Error::CapabilityMissing`] when a required bridge is absent and no
    ///   platform default is compiled in
    pub fn build(self) -> Result<CoreConfig> {
        let raw_url = self
            .api_base_url
            .unwrap_or_else(|| DEFAULT_API_BASE_URL.to_string());
        let api_base_url = Url::parse(&raw_url)
            .map_err(|e| Error::Config(format!("Invalid API base URL '{}': {}", raw_url, e)))?;

        let request_timeout = self.request_timeout.unwrap_or(DEFAULT_REQUEST_TIMEOUT);

        let http_client = match self.http_client {
            Some(client) => client,
            None => provide_default_http_client(request_timeout)?,
        };

        let secure_store = match self.secure_store {
            Some(store) => store,
            None => provide_default_secure_store()?,
        };

        let config = CoreConfig {
            api_base_url,
            request_timeout,
            stream_config: self.stream_config.unwrap_or_default(),
            media_options: self.media_options.unwrap_or_default(),
            event_buffer_size: self.event_buffer_size.unwrap_or(DEFAULT_EVENT_BUFFER_SIZE),
            http_client,
            secure_store,
        };

        config.validate()?;

        Ok(config)
    }
}

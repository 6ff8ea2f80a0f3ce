//! Track metadata and stream endpoints.

use crate::error::{PlaybackError, Result};
use crate::types::TrackMetadata;
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest};
use core_library::models::TrackId;
use core_runtime::config::api_url;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, instrument, warn};
use url::{form_urlencoded, Url};

/// Talks to the metadata and stream endpoints used when starting playback.
#[derive(Clone)]
pub struct TrackApiService {
    http_client: Arc<dyn HttpClient>,
    api_base_url: Url,
    request_timeout: Duration,
}

impl TrackApiService {
    pub fn new(http_client: Arc<dyn HttpClient>, api_base_url: Url, request_timeout: Duration) -> Self {
        Self {
            http_client,
            api_base_url,
            request_timeout,
        }
    }

    /// Fetch `GET /gettrackmetasend?track_id=…`.
    ///
    /// # Errors
    ///
    /// - [`PlaybackError::NotAuthenticated`] / [`PlaybackError::MissingTrackId`]
    ///   before any request when either input is empty
    /// - [`PlaybackError::Unauthorized`] on 401
    /// - [`PlaybackError::MetadataFetch`] on any other non-2xx status
    #[instrument(skip(self, token), fields(track_id = %track_id))]
    pub async fn fetch_track_metadata(
        &self,
        track_id: &TrackId,
        token: &str,
    ) -> Result<TrackMetadata> {
        if token.is_empty() {
            return Err(PlaybackError::NotAuthenticated);
        }
        if track_id.is_empty() {
            return Err(PlaybackError::MissingTrackId);
        }

        let url = self.url("/gettrackmetasend", &[("track_id", track_id.as_str())]);
        let request = HttpRequest::new(HttpMethod::Get, url)
            .header("Content-Type", "application/json")
            .bearer_token(token)
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            warn!(status = response.status, "Track metadata request failed");
            if response.status == 401 {
                return Err(PlaybackError::Unauthorized);
            }
            return Err(PlaybackError::MetadataFetch {
                status: response.status,
                message: response.text().unwrap_or_default(),
            });
        }

        serde_json::from_slice(&response.body).map_err(|source| PlaybackError::Decode {
            context: "/gettrackmetasend".to_string(),
            source,
        })
    }

    /// Check the stream URL. `true` iff the backend answers 2xx.
    pub async fn check_stream_availability(
        &self,
        owner: &str,
        track_id: &TrackId,
        token: &str,
    ) -> Result<bool> {
        let request = HttpRequest::new(HttpMethod::Get, self.stream_url(owner, track_id))
            .bearer_token(token)
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;
        debug!(status = response.status, owner, track_id = %track_id, "Stream check");
        Ok(response.is_success())
    }

    /// HLS manifest URL for a track.
    pub fn stream_url(&self, owner: &str, track_id: &TrackId) -> String {
        self.url(
            "/streammusicsend",
            &[
                ("username", owner),
                ("trackID", track_id.as_str()),
                ("startPosition", "0"),
            ],
        )
    }

    fn url(&self, path: &str, query: &[(&str, &str)]) -> String {
        let query = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query)
            .finish();
        format!("{}?{}", api_url(&self.api_base_url, path), query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Offline;

    #[async_trait::async_trait]
    impl HttpClient for Offline {
        async fn execute(&self, _request: HttpRequest) -> bridge_traits::error::Result<bridge_traits::HttpResponse> {
            Err(bridge_traits::BridgeError::NotAvailable("offline".to_string()))
        }
    }

    fn service() -> TrackApiService {
        TrackApiService::new(
            Arc::new(Offline),
            Url::parse("http://localhost:8080").unwrap(),
            Duration::from_secs(5),
        )
    }

    #[test]
    fn test_stream_url_encodes_values() {
        assert_eq!(
            service().stream_url("ann", &TrackId::from("42")),
            "http://localhost:8080/streammusicsend?username=ann&trackID=42&startPosition=0"
        );
        assert_eq!(
            service().stream_url("dj ann&co", &TrackId::from("7")),
            "http://localhost:8080/streammusicsend?username=dj+ann%26co&trackID=7&startPosition=0"
        );
    }

    #[tokio::test]
    async fn test_metadata_preconditions_skip_request() {
        let svc = service();
        assert!(matches!(
            svc.fetch_track_metadata(&TrackId::from("1"), "").await,
            Err(PlaybackError::NotAuthenticated)
        ));
        assert!(matches!(
            svc.fetch_track_metadata(&TrackId::default(), "token").await,
            Err(PlaybackError::MissingTrackId)
        ));
    }

    #[tokio::test]
    async fn test_transport_failure_is_bridge_error() {
        let err = service()
            .fetch_track_metadata(&TrackId::from("1"), "token")
            .await
            .unwrap_err();
        assert!(matches!(err, PlaybackError::Bridge(_)));
    }
}

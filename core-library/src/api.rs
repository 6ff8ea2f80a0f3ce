//! Backend request plumbing shared by the repositories.

use crate::error::{LibraryError, Result};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_auth::TokenStore;
use core_runtime::config::api_url;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};
use url::{form_urlencoded, Url};

/// Whether an endpoint needs the bearer token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    Public,
    Authenticated,
}

/// Thin wrapper over [`HttpClient`] that knows the API root and where to get
/// the access token.
#[derive(Clone)]
pub struct ApiClient {
    http_client: Arc<dyn HttpClient>,
    token_store: TokenStore,
    api_base_url: Url,
    request_timeout: Duration,
}

impl ApiClient {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token_store: TokenStore,
        api_base_url: Url,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            token_store,
            api_base_url,
            request_timeout,
        }
    }

    /// Build `{base}{path}?{query}` with form-encoded query values.
    pub fn url(&self, path: &str, query: &[(&str, String)]) -> String {
        let base = api_url(&self.api_base_url, path);
        if query.is_empty() {
            return base;
        }
        let encoded = form_urlencoded::Serializer::new(String::new())
            .extend_pairs(query.iter().map(|(k, v)| (*k, v.as_str())))
            .finish();
        format!("{}?{}", base, encoded)
    }

    pub async fn get_json<T: DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
        access: Access,
    ) -> Result<T> {
        let request = HttpRequest::new(HttpMethod::Get, self.url(path, query));
        let response = self.send(request, path, access).await?;
        decode(&response, path)
    }

    pub async fn post<B: Serialize + ?Sized>(
        &self,
        path: &str,
        query: &[(&str, String)],
        body: Option<&B>,
    ) -> Result<HttpResponse> {
        let mut request = HttpRequest::new(HttpMethod::Post, self.url(path, query));
        if let Some(body) = body {
            request = request.json(body)?;
        }
        self.send(request, path, Access::Authenticated).await
    }

    async fn send(
        &self,
        request: HttpRequest,
        path: &str,
        access: Access,
    ) -> Result<HttpResponse> {
        let mut request = request
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout);

        if access == Access::Authenticated {
            let token = self
                .token_store
                .current_access_token()
                .ok_or(LibraryError::NotAuthenticated)?;
            request = request.bearer_token(token);
        }

        debug!(endpoint = path, "Sending backend request");
        let response = self.http_client.execute(request).await?;

        if response.is_success() {
            return Ok(response);
        }

        warn!(endpoint = path, status = response.status, "Backend request failed");
        if response.status == 401 {
            return Err(LibraryError::Unauthorized);
        }
        Err(LibraryError::RequestFailed {
            endpoint: path.to_string(),
            status: response.status,
            message: response.text().unwrap_or_default(),
        })
    }
}

fn decode<T: DeserializeOwned>(response: &HttpResponse, context: &str) -> Result<T> {
    serde_json::from_slice(&response.body).map_err(|source| LibraryError::Decode {
        context: context.to_string(),
        source,
    })
}

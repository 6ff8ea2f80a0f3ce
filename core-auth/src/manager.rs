//! # Authentication Manager
//!
//! Signs users in against the backend, validates the stored session and signs
//! out, emitting [`AuthEvent`]s on the application's event bus.
//!
//! ## Flow
//!
//! 1. `sign_in` posts the credentials to `/signinsend`. The access token comes
//!    back in the `Authorization` response header, the refresh token in a
//!    `refresh_token` cookie.
//! 2. Tokens are persisted through [`TokenStore`].
//! 3. `validate_session` asks `/getuserdatasend` for the profile; a 401 or 403
//!    clears the stored tokens.
//! 4. `logout` calls `/logout` and clears the tokens.

use crate::error::{AuthError, Result};
use crate::token_store::TokenStore;
use crate::types::{
    parse_bearer, refresh_token_from_cookie, AuthTokens, SignInAnswer, SignInRequest,
    UserProfile, USER_PROFILE_FIELDS,
};
use bridge_traits::http::{HttpClient, HttpMethod, HttpRequest, HttpResponse};
use core_runtime::config::api_url;
use core_runtime::events::{AuthEvent, CoreEvent, EventBus};
use core_runtime::logging::redact_identifier;
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, instrument, warn};
use url::Url;

/// Coordinates sign-in state for the single signed-in user.
#[derive(Clone)]
pub struct AuthManager {
    http_client: Arc<dyn HttpClient>,
    token_store: TokenStore,
    event_bus: EventBus,
    api_base_url: Url,
    request_timeout: Duration,
}

impl AuthManager {
    pub fn new(
        http_client: Arc<dyn HttpClient>,
        token_store: TokenStore,
        event_bus: EventBus,
        api_base_url: Url,
        request_timeout: Duration,
    ) -> Self {
        Self {
            http_client,
            token_store,
            event_bus,
            api_base_url,
            request_timeout,
        }
    }

    pub fn token_store(&self) -> &TokenStore {
        &self.token_store
    }

    /// Whether an access token is held. Does not contact the backend.
    pub fn is_authenticated(&self) -> bool {
        self.token_store.has_access_token()
    }

    /// Sign in with an email or username and a password.
    ///
    /// # Errors
    ///
    /// - [`AuthError::InvalidCredentials`] for a wrong password
    /// - [`AuthError::UnknownUser`] when no account matches the identifier
    /// - [`AuthError::MissingAccessToken`] when the backend accepted the
    ///   credentials but sent no token; stored tokens are cleared
    #[instrument(skip(self, password), fields(identifier = %redact_identifier(identifier)))]
    pub async fn sign_in(&self, identifier: &str, password: &str) -> Result<AuthTokens> {
        let body = SignInRequest::new(identifier, password);
        let request = HttpRequest::new(HttpMethod::Post, self.endpoint("/signinsend"))
            .json(&body)?
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;

        if !response.is_success() {
            let answer: SignInAnswer = response.json().unwrap_or_default();
            let error = answer.into_error(body.identifier());
            warn!(status = response.status, error = %error, "Sign-in rejected");
            self.emit(AuthEvent::AuthError {
                message: error.to_string(),
            });
            return Err(error);
        }

        let Some(access_token) = response
            .header("Authorization")
            .and_then(parse_bearer)
            .map(str::to_string)
        else {
            warn!("Sign-in response had no Authorization header");
            if let Err(e) = self.token_store.clear().await {
                warn!(error = %e, "Failed to clear tokens after sign-in failure");
            }
            return Err(AuthError::MissingAccessToken);
        };

        let refresh_token = response
            .header("Set-Cookie")
            .and_then(refresh_token_from_cookie)
            .map(str::to_string);

        let tokens = AuthTokens::new(access_token, refresh_token);
        self.token_store.store(&tokens).await?;

        info!("Sign-in completed successfully");
        self.emit(AuthEvent::SignedIn {
            identifier: body.identifier().to_string(),
        });
        Ok(tokens)
    }

    /// Fetch the signed-in user's profile.
    ///
    /// A 401 or 403 clears the stored tokens and returns
    /// [`AuthError::NotAuthenticated`].
    pub async fn fetch_profile(&self) -> Result<UserProfile> {
        let response = self.request_user_data().await?;
        let values: Vec<Value> =
            serde_json::from_slice(&response.body).map_err(|source| {
                AuthError::SerializationFailed {
                    context: "user data response".to_string(),
                    source,
                }
            })?;
        UserProfile::from_values(&values)
    }

    /// Check the stored token against the backend.
    ///
    /// Returns `false` without a request when no token is held, and `false`
    /// on any failure. Only a 401 or 403 removes the stored tokens.
    pub async fn validate_session(&self) -> bool {
        match self.request_user_data().await {
            Ok(_) => true,
            Err(AuthError::NotAuthenticated) => false,
            Err(e) => {
                warn!(error = %e, "Session validation failed");
                false
            }
        }
    }

    /// Sign out on the backend, then forget the stored tokens.
    pub async fn logout(&self) -> Result<()> {
        let mut request = HttpRequest::new(HttpMethod::Get, self.endpoint("/logout"))
            .header("Content-Type", "application/json")
            .timeout(self.request_timeout);
        if let Some(token) = self.token_store.current_access_token() {
            request = request.bearer_token(token);
        }

        let response = self.http_client.execute(request).await?;
        if !response.is_success() {
            warn!(status = response.status, "Logout rejected by backend");
            return Err(AuthError::UnexpectedResponse {
                endpoint: "/logout".to_string(),
                status: response.status,
            });
        }

        self.token_store.clear().await?;
        info!("Signed out");
        self.emit(AuthEvent::SignedOut);
        Ok(())
    }

    async fn request_user_data(&self) -> Result<HttpResponse> {
        let token = self
            .token_store
            .current_access_token()
            .ok_or(AuthError::NotAuthenticated)?;

        let request = HttpRequest::new(HttpMethod::Post, self.endpoint("/getuserdatasend"))
            .bearer_token(token)
            .json(&USER_PROFILE_FIELDS)?
            .timeout(self.request_timeout);

        let response = self.http_client.execute(request).await?;

        match response.status {
            status if response.is_success() => {
                debug!(status, "User data fetched");
                Ok(response)
            }
            401 | 403 => {
                warn!(status = response.status, "Stored token rejected, clearing session");
                self.token_store.clear().await?;
                self.emit(AuthEvent::SessionExpired);
                Err(AuthError::NotAuthenticated)
            }
            status => Err(AuthError::UnexpectedResponse {
                endpoint: "/getuserdatasend".to_string(),
                status,
            }),
        }
    }

    fn endpoint(&self, path: &str) -> String {
        api_url(&self.api_base_url, path)
    }

    fn emit(&self, event: AuthEvent) {
        if self.event_bus.emit(CoreEvent::Auth(event)).is_err() {
            debug!("No auth event subscribers");
        }
    }
}

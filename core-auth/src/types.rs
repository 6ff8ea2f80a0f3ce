use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

use crate::error::{AuthError, Result};

/// Fields requested from `/getuserdatasend`, in response order.
pub const USER_PROFILE_FIELDS: [&str; 4] = ["artistName", "firstName", "username", "plays"];

/// Access token plus the optional refresh token issued at sign-in.
///
/// `Debug` never prints token values.
#[derive(Clone, PartialEq, Eq)]
pub struct AuthTokens {
    access_token: String,
    refresh_token: Option<String>,
}

impl AuthTokens {
    pub fn new(access_token: impl Into<String>, refresh_token: Option<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token,
        }
    }

    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    pub fn refresh_token(&self) -> Option<&str> {
        self.refresh_token.as_deref()
    }
}

impl fmt::Debug for AuthTokens {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AuthTokens")
            .field("access_token", &"[REDACTED]")
            .field("has_refresh_token", &self.refresh_token.is_some())
            .finish()
    }
}

/// Body of `POST /signinsend`.
///
/// The backend accepts either an email or a username; the unused one is sent
/// as an empty string.
#[derive(Clone, Serialize, PartialEq, Eq)]
pub struct SignInRequest {
    pub email: String,
    pub username: String,
    pub password: String,
}

impl SignInRequest {
    /// Build a request from a single login field. Anything containing `@` is
    /// treated as an email.
    pub fn new(identifier: &str, password: impl Into<String>) -> Self {
        let identifier = identifier.trim();
        let (email, username) = if is_email(identifier) {
            (identifier.to_string(), String::new())
        } else {
            (String::new(), identifier.to_string())
        };

        Self {
            email,
            username,
            password: password.into(),
        }
    }

    pub fn identifier(&self) -> &str {
        if self.email.is_empty() {
            &self.username
        } else {
            &self.email
        }
    }
}

impl fmt::Debug for SignInRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SignInRequest")
            .field("email", &self.email)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

pub fn is_email(identifier: &str) -> bool {
    identifier.contains('@')
}

/// Error body returned by `/signinsend` on failure.
#[derive(Debug, Default, Deserialize)]
pub(crate) struct SignInAnswer {
    #[serde(default)]
    pub answer: Option<String>,
}

impl SignInAnswer {
    /// Map the backend's failure answer onto an [`AuthError`].
    pub(crate) fn into_error(self, identifier: &str) -> AuthError {
        match self.answer.as_deref() {
            Some("wrong password") => AuthError::InvalidCredentials,
            Some("email does not exist") | Some("username does not exist") => {
                AuthError::UnknownUser(identifier.to_string())
            }
            Some(other) => AuthError::AuthenticationFailed(other.to_string()),
            None => AuthError::AuthenticationFailed("sign-in rejected".to_string()),
        }
    }
}

/// Strip the `Bearer ` scheme from an `Authorization` header value.
///
/// The scheme is matched case-insensitively; a header carrying only the
/// scheme has no token.
pub fn parse_bearer(header: &str) -> Option<&str> {
    let header = header.trim();
    let token = match header.split_once(char::is_whitespace) {
        Some((scheme, rest)) if scheme.eq_ignore_ascii_case("bearer") => rest.trim(),
        None if header.eq_ignore_ascii_case("bearer") => "",
        _ => header,
    };
    (!token.is_empty()).then_some(token)
}

/// Find `refresh_token=` in a `Set-Cookie` or `Cookie` header value.
pub fn refresh_token_from_cookie(header: &str) -> Option<&str> {
    header
        .split([';', ','])
        .map(str::trim)
        .find_map(|cookie| cookie.strip_prefix("refresh_token="))
        .filter(|value| !value.is_empty())
}

/// Current user's profile, as returned by `/getuserdatasend`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    pub artist_name: Option<String>,
    pub first_name: Option<String>,
    pub username: String,
    pub plays: u64,
}

impl UserProfile {
    /// Build a profile from the positional array the backend returns for
    /// [`USER_PROFILE_FIELDS`].
    pub fn from_values(values: &[Value]) -> Result<Self> {
        let text = |index: usize| -> Option<String> {
            values
                .get(index)
                .and_then(Value::as_str)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        };

        let username = text(2).ok_or_else(|| {
            AuthError::AuthenticationFailed("user data response has no username".to_string())
        })?;

        let plays = match values.get(3) {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0),
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };

        Ok(Self {
            artist_name: text(0),
            first_name: text(1),
            username,
            plays,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn identifier_with_at_sign_is_email() {
        let request = SignInRequest::new("listener@example.com", "pw");
        assert_eq!(request.email, "listener@example.com");
        assert!(request.username.is_empty());
        assert_eq!(request.identifier(), "listener@example.com");
    }

    #[test]
    fn identifier_without_at_sign_is_username() {
        let request = SignInRequest::new("  listener ", "pw");
        assert!(request.email.is_empty());
        assert_eq!(request.username, "listener");
    }

    #[test]
    fn sign_in_request_serializes_all_fields() {
        let body = serde_json::to_value(SignInRequest::new("listener", "pw")).unwrap();
        assert_eq!(body, json!({ "email": "", "username": "listener", "password": "pw" }));
    }

    #[test]
    fn debug_output_hides_secrets() {
        let tokens = AuthTokens::new("secret-token", Some("refresh".to_string()));
        let rendered = format!("{:?}", tokens);
        assert!(!rendered.contains("secret-token"));
        assert!(rendered.contains("has_refresh_token: true"));

        let request = SignInRequest::new("listener", "hunter2");
        assert!(!format!("{:?}", request).contains("hunter2"));
    }

    #[test]
    fn answers_map_to_errors() {
        let wrong = SignInAnswer {
            answer: Some("wrong password".to_string()),
        };
        assert!(matches!(wrong.into_error("x"), AuthError::InvalidCredentials));

        let missing = SignInAnswer {
            answer: Some("username does not exist".to_string()),
        };
        assert!(matches!(missing.into_error("bob"), AuthError::UnknownUser(u) if u == "bob"));

        assert!(matches!(
            SignInAnswer::default().into_error("x"),
            AuthError::AuthenticationFailed(_)
        ));
    }

    #[test]
    fn bearer_header_parsing() {
        assert_eq!(parse_bearer("Bearer abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("abc.def"), Some("abc.def"));
        assert_eq!(parse_bearer("Bearer "), None);
        assert_eq!(parse_bearer("  bearer\t"), None);
        assert_eq!(parse_bearer("BEARER  xyz "), Some("xyz"));
    }

    #[test]
    fn refresh_cookie_parsing() {
        assert_eq!(
            refresh_token_from_cookie("refresh_token=r123; Path=/; HttpOnly"),
            Some("r123")
        );
        assert_eq!(refresh_token_from_cookie("session=1; other=2"), None);
    }

    #[test]
    fn profile_from_positional_values() {
        let values = vec![json!("DJ Test"), json!("Ann"), json!("ann"), json!(42)];
        let profile = UserProfile::from_values(&values).unwrap();
        assert_eq!(profile.artist_name.as_deref(), Some("DJ Test"));
        assert_eq!(profile.username, "ann");
        assert_eq!(profile.plays, 42);

        let values = vec![json!(""), json!(null), json!("ann"), json!("7")];
        let profile = UserProfile::from_values(&values).unwrap();
        assert_eq!(profile.artist_name, None);
        assert_eq!(profile.first_name, None);
        assert_eq!(profile.plays, 7);
    }

    #[test]
    fn profile_requires_username() {
        assert!(UserProfile::from_values(&[json!("a"), json!("b")]).is_err());
    }
}

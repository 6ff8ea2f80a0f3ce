use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum AuthError {
    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Wrong password")]
    InvalidCredentials,

    #[error("No account matches {0}")]
    UnknownUser(String),

    #[error("Authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("Sign-in succeeded but the response carried no access token")]
    MissingAccessToken,

    #[error("Secure storage unavailable: {0}")]
    SecureStorageUnavailable(String),

    #[error("Unexpected response from {endpoint}: HTTP {status}")]
    UnexpectedResponse { endpoint: String, status: u16 },

    #[error("Serialization failed: {context}")]
    SerializationFailed {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("HTTP error: {0}")]
    Http(#[from] BridgeError),
}

pub type Result<T> = std::result::Result<T, AuthError>;

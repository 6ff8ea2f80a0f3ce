//! # Playback Error Types
//!
//! Errors raised while starting or controlling playback. The player never
//! returns these to its caller; it turns them into user notifications.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur during playback operations.
#[derive(Error, Debug)]
pub enum PlaybackError {
    // ========================================================================
    // Request Errors
    // ========================================================================
    /// No access token is held.
    #[error("Authorization error")]
    NotAuthenticated,

    /// The track has no id.
    #[error("Track ID missing")]
    MissingTrackId,

    // ========================================================================
    // Backend Errors
    // ========================================================================
    /// The backend rejected the access token.
    #[error("Unauthorized: invalid or expired token")]
    Unauthorized,

    /// Track metadata request failed.
    #[error("Failed to fetch track metadata: {status} {message}")]
    MetadataFetch { status: u16, message: String },

    /// Metadata did not name the track owner, so no stream URL can be built.
    #[error("Could not resolve the track owner")]
    OwnerUnknown,

    /// The stream check returned a non-success status.
    #[error("Stream unavailable")]
    StreamUnavailable,

    /// Response body could not be decoded.
    #[error("Invalid response from {context}")]
    Decode {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    // ========================================================================
    // Platform Errors
    // ========================================================================
    /// Neither the streaming library nor the media element can play HLS.
    #[error("HLS not supported")]
    UnsupportedFormat,

    /// A bridge call failed (network, media element, streaming library).
    #[error("{0}")]
    Bridge(#[from] BridgeError),
}

impl PlaybackError {
    /// Returns `true` if retrying the same request may succeed.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PlaybackError::StreamUnavailable
                | PlaybackError::MetadataFetch { .. }
                | PlaybackError::Bridge(_)
        )
    }

    /// Returns `true` if the user has to sign in again.
    pub fn is_auth_error(&self) -> bool {
        matches!(
            self,
            PlaybackError::NotAuthenticated | PlaybackError::Unauthorized
        )
    }

    /// Errors detected before any request is made. These are shown to the
    /// user as-is instead of with the generic `Error:` prefix.
    pub(crate) fn is_precondition(&self) -> bool {
        matches!(
            self,
            PlaybackError::NotAuthenticated | PlaybackError::MissingTrackId
        )
    }
}

/// Result type for playback operations.
pub type Result<T> = std::result::Result<T, PlaybackError>;

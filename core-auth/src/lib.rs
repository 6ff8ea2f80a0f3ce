//! # Authentication Module
//!
//! Session handling for the streaming backend.
//!
//! ## Overview
//!
//! The backend issues a bearer access token on sign-in and a refresh token as
//! an HTTP-only cookie. This crate persists both through the host's secure
//! store, exposes the current access token to the player and library
//! services, and emits auth events on the shared event bus.
//!
//! ## Features
//!
//! - Email or username sign-in
//! - Token persistence via platform-specific secure stores
//! - Session validation with automatic token removal on 401/403
//! - Observable access token for components that react to sign-out

pub mod error;
pub mod manager;
pub mod token_store;
pub mod types;

pub use error::{AuthError, Result};
pub use manager::AuthManager;
pub use token_store::{TokenStore, ACCESS_TOKEN_KEY, REFRESH_TOKEN_KEY};
pub use types::{AuthTokens, SignInRequest, UserProfile};

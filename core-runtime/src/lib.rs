//! # Core Runtime Module
//!
//! Provides foundational runtime infrastructure for the player core:
//! - Logging and tracing infrastructure
//! - Configuration management
//! - Event bus system
//! - User-facing notifications
//!
//! ## Overview
//!
//! Every other crate in the workspace depends on this one. It fixes the
//! logging conventions, the shape of configuration and the events hosts
//! observe.

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod notifications;

pub use config::{CoreConfig, CoreConfigBuilder};
pub use error::{Error, Result};
pub use events::{CoreEvent, EventBus};
pub use notifications::{Notification, NotificationKind, Notifier};

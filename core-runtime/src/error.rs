//! Errors raised while assembling the runtime: building [`CoreConfig`],
//! installing the log subscriber, or creating a desktop default bridge.
//!
//! [`CoreConfig`]: crate::config::CoreConfig

use bridge_traits::BridgeError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    /// A config or logging value was rejected.
    #[error("Configuration error: {0}")]
    Config(String),

    /// No implementation was injected and no desktop default exists.
    #[error("Capability missing: {capability} - {message}")]
    CapabilityMissing { capability: String, message: String },

    /// A desktop default bridge could not be created.
    #[error("Failed to create default {capability}: {source}")]
    DefaultBridge {
        capability: &'static str,
        #[source]
        source: BridgeError,
    },
}

pub type Result<T> = std::result::Result<T, Error>;

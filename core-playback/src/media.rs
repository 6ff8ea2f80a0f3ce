//! Media element lifecycle helpers.

use bridge_traits::error::Result;
use bridge_traits::media::{MediaElement, MediaElementFactory, MediaElementOptions, MediaListener};
use std::sync::Arc;
use tracing::debug;

/// Creates, binds and resets the player's audio element.
#[derive(Clone)]
pub struct AudioElementManager {
    factory: Arc<dyn MediaElementFactory>,
    options: MediaElementOptions,
}

impl AudioElementManager {
    pub fn new(factory: Arc<dyn MediaElementFactory>, options: MediaElementOptions) -> Self {
        Self { factory, options }
    }

    /// Create an element with the configured preload and CORS mode
    /// (`auto` / `use-credentials` by default).
    pub fn create_audio_element(&self) -> Result<Arc<dyn MediaElement>> {
        debug!(
            preload = ?self.options.preload,
            cross_origin = %self.options.cross_origin,
            "Creating audio element"
        );
        self.factory.create(&self.options)
    }

    /// Route the element's events to `listener`, replacing any previous one.
    pub fn bind(&self, element: &Arc<dyn MediaElement>, listener: Arc<dyn MediaListener>) {
        element.set_listener(Some(listener));
    }

    /// Pause, drop the source and reload so the element releases its buffer.
    pub fn cleanup(&self, element: &Arc<dyn MediaElement>) {
        element.pause();
        element.set_source(None);
        element.load();
    }
}

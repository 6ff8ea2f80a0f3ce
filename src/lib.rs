//! Workspace umbrella crate.
//!
//! Exposes shared feature flags that map to the individual workspace crates.
//! Host applications can depend on `tunestream-workspace` and enable the
//! documented features without wiring each crate individually.

#[cfg(feature = "headless")]
pub use core_service;

#[cfg(all(feature = "desktop-shims", not(feature = "headless")))]
pub use core_service;

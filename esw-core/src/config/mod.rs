//! Configuration types
//!
//! Compile-time telemetry parameters and user settings stored as postcard
//! binary data.

#[cfg(feature = "serde")]
pub mod persist;
pub mod types;

#[cfg(feature = "serde")]
pub use persist::{load_settings, save_settings, ConfigError, MAX_SETTINGS_SIZE};
pub use types::*;

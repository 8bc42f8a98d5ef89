//! Settings persistence
//!
//! Loads and stores [`Settings`] through a [`SettingsStore`].
//! Callers fall back to defaults when nothing valid is stored.

use crate::traits::{SettingsStore, StorageError, StorageKey};

use super::types::{Settings, SETTINGS_VERSION};

/// Maximum serialized settings size
pub const MAX_SETTINGS_SIZE: usize = 32;

/// Configuration persistence errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ConfigError {
    /// Storage operation failed
    Storage(StorageError),
    /// Serialization failed
    Serialize,
    /// Stored bytes could not be decoded
    Deserialize,
    /// Stored record has a different layout version
    VersionMismatch,
}

impl From<StorageError> for ConfigError {
    fn from(e: StorageError) -> Self {
        ConfigError::Storage(e)
    }
}

/// Load settings from storage
pub fn load_settings<S: SettingsStore>(store: &mut S) -> Result<Settings, ConfigError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let len = store.read(StorageKey::Settings, &mut buffer)?;
    let bytes = buffer.get(..len).ok_or(ConfigError::Deserialize)?;

    let settings: Settings = postcard::from_bytes(bytes).map_err(|_| ConfigError::Deserialize)?;
    if settings.version != SETTINGS_VERSION {
        return Err(ConfigError::VersionMismatch);
    }
    Ok(settings)
}

/// Store settings
pub fn save_settings<S: SettingsStore>(store: &mut S, settings: &Settings) -> Result<(), ConfigError> {
    let mut buffer = [0u8; MAX_SETTINGS_SIZE];
    let bytes = postcard::to_slice(settings, &mut buffer).map_err(|_| ConfigError::Serialize)?;
    store.write(StorageKey::Settings, bytes)?;
    Ok(())
}

//! Persistent settings storage

/// Storage keys for persisted data
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u32)]
pub enum StorageKey {
    /// User settings (binary postcard format)
    Settings = 1,
}

/// Errors from settings storage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum StorageError {
    /// Key not found
    NotFound,
    /// Buffer too small for the data
    BufferTooSmall,
    /// Storage is full
    Full,
    /// Platform storage failure
    Io,
}

/// Trait for small key-value persistence
pub trait SettingsStore {
    /// Read a value by key into `buffer`, returning the number of bytes read
    fn read(&mut self, key: StorageKey, buffer: &mut [u8]) -> Result<usize, StorageError>;

    /// Write a value by key
    fn write(&mut self, key: StorageKey, data: &[u8]) -> Result<(), StorageError>;
}

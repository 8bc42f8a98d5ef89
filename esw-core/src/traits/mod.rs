//! Platform abstraction traits
//!
//! These traits define the interface between the application logic
//! and the watch platform services.

pub mod clock;
pub mod sensors;
pub mod storage;
pub mod transport;
pub mod ui;

pub use clock::Clock;
pub use sensors::{
    AccelSample, CompassReading, CompassStatus, SensorService, ACCEL_RANGE_MG,
};
pub use storage::{SettingsStore, StorageError, StorageKey};
pub use transport::{MessageChannel, Transport};
pub use ui::Ui;

//! Configuration type definitions

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::alert::{REPLY_ATTEMPTS, REPLY_RETRY_DELAY_MS};
use crate::clock::SamplingRate;
use crate::telemetry::ACCEL_BATCH_SIZE;

/// Compass heading filter in degrees
pub const HEADING_FILTER_DEG: u16 = 1;

/// Current settings record layout
pub const SETTINGS_VERSION: u8 = 1;

/// Telemetry and reply parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct TelemetryConfig {
    /// Accelerometer sampling rate
    pub sampling_rate: SamplingRate,
    /// Samples per accelerometer batch
    pub accel_batch_size: usize,
    /// Minimum heading change that produces a compass event
    pub heading_filter_deg: u16,
    /// Reply attempts before giving up
    pub reply_attempts: u8,
    /// Blocking delay between reply attempts
    pub reply_retry_delay_ms: u32,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            sampling_rate: SamplingRate::Hz25,
            accel_batch_size: ACCEL_BATCH_SIZE,
            heading_filter_deg: HEADING_FILTER_DEG,
            reply_attempts: REPLY_ATTEMPTS,
            reply_retry_delay_ms: REPLY_RETRY_DELAY_MS,
        }
    }
}

/// User preferences that survive restarts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Settings {
    /// Record layout version
    pub version: u8,
    /// Vibrate when an alert arrives
    pub vibrate_on_alert: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: SETTINGS_VERSION,
            vibrate_on_alert: true,
        }
    }
}

impl Settings {
    /// Flip the vibration preference, returning the new value
    pub fn toggle_vibration(&mut self) -> bool {
        self.vibrate_on_alert = !self.vibrate_on_alert;
        self.vibrate_on_alert
    }
}

//! Sensor service traits and sample types

use crate::clock::SamplingRate;

/// Full-scale accelerometer range in milli-g (±4 g)
pub const ACCEL_RANGE_MG: i16 = 4000;

/// One accelerometer sample in milli-g
///
/// The sensor reports within ±[`ACCEL_RANGE_MG`]; the message layout is
/// sized for that range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct AccelSample {
    pub x: i16,
    pub y: i16,
    pub z: i16,
}

impl AccelSample {
    pub const fn new(x: i16, y: i16, z: i16) -> Self {
        Self { x, y, z }
    }

    /// Axes in wire order
    pub fn as_array(self) -> [i16; 3] {
        [self.x, self.y, self.z]
    }

    /// Sample with every axis limited to the sensor range
    pub fn clamped(self) -> Self {
        let clamp = |v: i16| v.clamp(-ACCEL_RANGE_MG, ACCEL_RANGE_MG);
        Self::new(clamp(self.x), clamp(self.y), clamp(self.z))
    }
}

/// Compass calibration status reported with each heading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompassStatus {
    /// Heading is not yet valid
    Invalid,
    /// Calibration in progress; a heading is available but unreliable
    Calibrating,
    /// Heading is ready for use
    Calibrated,
}

/// A compass heading event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct CompassReading {
    /// Heading in whole degrees (0-359)
    pub heading_deg: i32,
    pub status: CompassStatus,
}

impl CompassReading {
    pub const fn calibrated(heading_deg: i32) -> Self {
        Self {
            heading_deg,
            status: CompassStatus::Calibrated,
        }
    }
}

/// Trait for the platform sensor service
///
/// Subscribing starts periodic callbacks into the event loop;
/// unsubscribing takes effect before the next scheduled callback.
pub trait SensorService {
    /// Deliver accelerometer batches of `batch_size` samples at `rate`
    fn subscribe_accel(&mut self, rate: SamplingRate, batch_size: usize);

    /// Stop accelerometer batches
    fn unsubscribe_accel(&mut self);

    /// Deliver compass headings, suppressing changes below `heading_filter_deg`
    fn subscribe_compass(&mut self, heading_filter_deg: u16);

    /// Stop compass headings
    fn unsubscribe_compass(&mut self);
}

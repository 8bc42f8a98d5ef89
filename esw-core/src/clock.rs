//! Sample clock
//!
//! Millisecond timestamps used to stamp compass events and to compute
//! accelerometer batch deltas against the session start.

/// Milliseconds since an arbitrary epoch
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Timestamp(u64);

impl Timestamp {
    /// Create a timestamp from raw milliseconds
    pub const fn from_millis(ms: u64) -> Self {
        Self(ms)
    }

    /// Create a timestamp from a (seconds, sub-second milliseconds) pair
    pub const fn from_parts(secs: u64, ms: u16) -> Self {
        Self(secs.saturating_mul(1000).saturating_add(ms as u64))
    }

    /// Raw milliseconds
    pub const fn as_millis(self) -> u64 {
        self.0
    }

    /// Signed delta from `start` to `self` in milliseconds
    ///
    /// Negative when `self` predates `start`. Saturates at the `i32` range.
    pub fn delta_since(self, start: Timestamp) -> i32 {
        if self.0 >= start.0 {
            (self.0 - start.0).min(i32::MAX as u64) as i32
        } else {
            -((start.0 - self.0).min(i32::MAX as u64) as i32)
        }
    }
}

/// Local wall-clock time for the watch face
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct WallTime {
    pub hour: u8,
    pub minute: u8,
    /// 0 = Sunday
    pub weekday: u8,
    /// 1 = January
    pub month: u8,
    pub day: u8,
}

/// Accelerometer sampling rates offered by the sensor service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SamplingRate {
    Hz10,
    #[default]
    Hz25,
    Hz50,
    Hz100,
}

impl SamplingRate {
    /// Samples per second
    pub fn as_hz(self) -> u32 {
        match self {
            SamplingRate::Hz10 => 10,
            SamplingRate::Hz25 => 25,
            SamplingRate::Hz50 => 50,
            SamplingRate::Hz100 => 100,
        }
    }
}

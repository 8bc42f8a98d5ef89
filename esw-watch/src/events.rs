//! Events delivered to the app by platform callbacks

use heapless::Vec;

use esw_core::clock::{Timestamp, WallTime};
use esw_core::telemetry::ACCEL_BATCH_SIZE;
use esw_core::traits::{AccelSample, CompassReading};
use esw_protocol::TransportError;

/// Watch buttons handled by the app
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Button {
    /// Answer yes
    Up,
    /// Answer no, or toggle vibration when nothing is pending
    Down,
}

/// Everything the event loop reacts to
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Event {
    /// Accelerometer batch ready
    AccelBatch {
        timestamp: Timestamp,
        samples: Vec<AccelSample, ACCEL_BATCH_SIZE>,
    },
    /// Compass heading changed
    Compass(CompassReading),
    /// A dictionary from the phone is waiting in the inbox
    Inbound,
    /// The platform dropped an inbound message
    InboxDropped(TransportError),
    /// The last outbound message was acknowledged
    OutboxSent,
    /// The last outbound message was lost
    OutboxFailed(TransportError),
    /// Button pressed
    Button(Button),
    /// Phone link came up or went down
    ConnectionChanged(bool),
    /// Wall clock crossed a minute
    MinuteTick(WallTime),
}

impl Event {
    /// Build an accelerometer event, keeping at most one batch of samples
    pub fn accel_batch(timestamp: Timestamp, samples: &[AccelSample]) -> Self {
        let len = samples.len().min(ACCEL_BATCH_SIZE);
        let mut batch = Vec::new();
        // Cannot fail: `len` never exceeds the capacity
        let _ = batch.extend_from_slice(&samples[..len]);
        Event::AccelBatch {
            timestamp,
            samples: batch,
        }
    }
}

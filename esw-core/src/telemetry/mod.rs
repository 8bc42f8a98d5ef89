//! Sensor telemetry uplink
//!
//! Turns sensor callbacks into transport messages. Accelerometer batches
//! are forwarded one message per batch; compass headings accumulate in a
//! double buffer and go out 25 pairs at a time.

pub mod accel;
pub mod compass;

pub use accel::{AccelError, AccelPipeline, ACCEL_BATCH_SIZE};
pub use compass::{
    ActiveBuffer, BufferError, CompassBuffer, CompassChannel, CompassError, CompassOutcome,
    COMPASS_BUFFER_CAPACITY, COMPASS_PAIRS_PER_FLUSH,
};

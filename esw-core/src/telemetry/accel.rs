//! Accelerometer pipeline
//!
//! Each platform batch becomes exactly one outbound message; nothing is
//! buffered across batches and failed sends are not retried, since a
//! stale batch is worth less than the next one.

use esw_protocol::{accel_batch, DictError, TransportError};

use crate::clock::Timestamp;
use crate::traits::{AccelSample, Transport};

/// Samples per platform batch and per message
pub const ACCEL_BATCH_SIZE: usize = 25;

/// Errors from forwarding a batch
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AccelError {
    /// The platform delivered fewer samples than a full batch
    ShortBatch { received: usize },
    /// Building the message failed
    Encode(DictError),
    /// The transport refused the message
    Transport(TransportError),
}

impl From<DictError> for AccelError {
    fn from(e: DictError) -> Self {
        AccelError::Encode(e)
    }
}

impl From<TransportError> for AccelError {
    fn from(e: TransportError) -> Self {
        AccelError::Transport(e)
    }
}

/// Batch forwarder with per-session counters
#[derive(Debug, Clone, Default)]
pub struct AccelPipeline {
    reference: Timestamp,
    batches_sent: u32,
    batches_dropped: u32,
}

impl AccelPipeline {
    pub const fn new() -> Self {
        Self {
            reference: Timestamp::from_millis(0),
            batches_sent: 0,
            batches_dropped: 0,
        }
    }

    /// Prepare for a new session starting at `reference`
    pub fn begin(&mut self, reference: Timestamp) {
        self.reference = reference;
        self.batches_sent = 0;
        self.batches_dropped = 0;
    }

    /// Batches accepted by the transport this session
    pub fn batches_sent(&self) -> u32 {
        self.batches_sent
    }

    /// Batches rejected or refused this session
    pub fn batches_dropped(&self) -> u32 {
        self.batches_dropped
    }

    /// Forward one batch stamped at `timestamp`
    ///
    /// Only the first [`ACCEL_BATCH_SIZE`] samples are sent. Axes outside
    /// the sensor range are clamped so a full batch always fits a message.
    pub fn on_batch<T: Transport>(
        &mut self,
        samples: &[AccelSample],
        timestamp: Timestamp,
        transport: &mut T,
    ) -> Result<(), AccelError> {
        let result = self.forward(samples, timestamp, transport);
        match result {
            Ok(()) => self.batches_sent = self.batches_sent.saturating_add(1),
            Err(_) => self.batches_dropped = self.batches_dropped.saturating_add(1),
        }
        result
    }

    fn forward<T: Transport>(
        &self,
        samples: &[AccelSample],
        timestamp: Timestamp,
        transport: &mut T,
    ) -> Result<(), AccelError> {
        if samples.len() < ACCEL_BATCH_SIZE {
            return Err(AccelError::ShortBatch {
                received: samples.len(),
            });
        }

        let delta_ms = timestamp.delta_since(self.reference);
        let message = accel_batch(
            delta_ms,
            samples[..ACCEL_BATCH_SIZE]
                .iter()
                .map(|s| s.clamped().as_array()),
        )?;
        transport.send(&message)?;
        Ok(())
    }
}

//! Compass double buffer
//!
//! Calibrated headings are stored as `(delta_ms, heading)` pairs in the
//! active buffer. When it fills, its pairs are sent as one message and the
//! other buffer becomes active, so the producer never writes into a buffer
//! that is being drained.
//!
//! Buffer layout (50 slots, 25 pairs):
//! ```text
//! ┌────────┬─────────┬────────┬─────────┬─────┬─────────┐
//! │ delta0 │ heading0│ delta1 │ heading1│ ... │heading24│
//! └────────┴─────────┴────────┴─────────┴─────┴─────────┘
//!   0        1         2        3                49
//! ```
//! Only `[0, cursor)` is ever read. Slots past the cursor may hold values
//! from an earlier fill.

use esw_protocol::{compass_pairs, DictError, TransportError};

use crate::clock::Timestamp;
use crate::traits::{CompassReading, CompassStatus, Transport};

/// Slots per buffer
pub const COMPASS_BUFFER_CAPACITY: usize = 50;

/// Pairs sent by a full flush
pub const COMPASS_PAIRS_PER_FLUSH: usize = COMPASS_BUFFER_CAPACITY / 2;

/// Errors from writing into a compass buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BufferError {
    /// No room for another pair
    Full,
    /// Cursor is not on a pair boundary
    Misaligned,
}

/// Errors from the compass channel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompassError {
    /// Writing the reading failed
    Buffer(BufferError),
    /// Building the flush message failed
    Encode(DictError),
    /// The transport refused the flush
    Transport(TransportError),
}

impl From<BufferError> for CompassError {
    fn from(e: BufferError) -> Self {
        CompassError::Buffer(e)
    }
}

impl From<DictError> for CompassError {
    fn from(e: DictError) -> Self {
        CompassError::Encode(e)
    }
}

impl From<TransportError> for CompassError {
    fn from(e: TransportError) -> Self {
        CompassError::Transport(e)
    }
}

/// Fixed-capacity store of delta/heading pairs
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CompassBuffer {
    slots: [i32; COMPASS_BUFFER_CAPACITY],
    cursor: usize,
}

impl Default for CompassBuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl CompassBuffer {
    /// Create an empty buffer
    pub const fn new() -> Self {
        Self {
            slots: [0; COMPASS_BUFFER_CAPACITY],
            cursor: 0,
        }
    }

    /// Next free slot
    pub fn cursor(&self) -> usize {
        self.cursor
    }

    /// Number of complete pairs written
    pub fn pair_count(&self) -> usize {
        self.cursor / 2
    }

    /// Returns true when no further pair fits
    pub fn is_full(&self) -> bool {
        self.cursor + 2 > COMPASS_BUFFER_CAPACITY
    }

    /// Returns true if nothing has been written since the last reset
    pub fn is_empty(&self) -> bool {
        self.cursor == 0
    }

    /// Written slots, `[0, cursor)`
    pub fn valid(&self) -> &[i32] {
        &self.slots[..self.cursor]
    }

    /// Complete pairs in insertion order
    ///
    /// A dangling delta at an odd cursor is not yielded.
    pub fn pairs(&self) -> impl Iterator<Item = (i32, i32)> + '_ {
        self.valid().chunks_exact(2).map(|pair| (pair[0], pair[1]))
    }

    /// Append a delta and its heading
    pub fn push_pair(&mut self, delta_ms: i32, heading_deg: i32) -> Result<(), BufferError> {
        if self.cursor % 2 != 0 {
            return Err(BufferError::Misaligned);
        }
        if self.is_full() {
            return Err(BufferError::Full);
        }

        // Delta always precedes its heading
        self.slots[self.cursor] = delta_ms;
        self.slots[self.cursor + 1] = heading_deg;
        self.cursor += 2;
        self.check_invariants();
        Ok(())
    }

    /// Rewind for reuse; stale slots are left in place
    pub fn reset(&mut self) {
        self.cursor = 0;
        self.check_invariants();
    }

    fn check_invariants(&self) {
        debug_assert!(self.cursor <= COMPASS_BUFFER_CAPACITY);
        debug_assert!(self.cursor % 2 == 0);
    }

    #[cfg(test)]
    fn from_raw(slots: [i32; COMPASS_BUFFER_CAPACITY], cursor: usize) -> Self {
        Self { slots, cursor }
    }
}

/// Selector for the buffer currently being written
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ActiveBuffer {
    #[default]
    First,
    Second,
}

impl ActiveBuffer {
    /// The idle buffer
    pub fn other(self) -> Self {
        match self {
            ActiveBuffer::First => ActiveBuffer::Second,
            ActiveBuffer::Second => ActiveBuffer::First,
        }
    }

    fn index(self) -> usize {
        match self {
            ActiveBuffer::First => 0,
            ActiveBuffer::Second => 1,
        }
    }
}

/// What happened to a compass reading
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum CompassOutcome {
    /// Status was not calibrated; nothing written
    Ignored(CompassStatus),
    /// Pair written, buffer not yet full
    Buffered { cursor: usize },
    /// Buffer filled, was sent, and the other buffer is now active
    Flushed { from: ActiveBuffer, pairs: usize },
}

/// Double-buffered compass stream
///
/// Only the flush-and-swap step changes which buffer is active, and no
/// code path writes to the idle buffer.
#[derive(Debug, Clone)]
pub struct CompassChannel {
    buffers: [CompassBuffer; 2],
    active: ActiveBuffer,
    reference: Timestamp,
}

impl Default for CompassChannel {
    fn default() -> Self {
        Self::new()
    }
}

impl CompassChannel {
    /// Create a channel with the first buffer active
    pub const fn new() -> Self {
        Self {
            buffers: [CompassBuffer::new(), CompassBuffer::new()],
            active: ActiveBuffer::First,
            reference: Timestamp::from_millis(0),
        }
    }

    /// Which buffer is being written
    pub fn active(&self) -> ActiveBuffer {
        self.active
    }

    /// The buffer being written
    pub fn active_buffer(&self) -> &CompassBuffer {
        &self.buffers[self.active.index()]
    }

    /// Write cursor of the active buffer
    pub fn cursor(&self) -> usize {
        self.active_buffer().cursor()
    }

    /// Session start used for event deltas
    pub fn reference(&self) -> Timestamp {
        self.reference
    }

    /// Prepare for a new session starting at `reference`
    pub fn begin(&mut self, reference: Timestamp) {
        self.reference = reference;
        self.active_mut().reset();
    }

    /// Handle one compass event observed at `now`
    ///
    /// When the event fills the active buffer, the buffer is flushed and
    /// swapped. The swap happens even if the send fails; the error is
    /// returned after the other buffer has become active.
    pub fn on_reading<T: Transport>(
        &mut self,
        reading: CompassReading,
        now: Timestamp,
        transport: &mut T,
    ) -> Result<CompassOutcome, CompassError> {
        if reading.status != CompassStatus::Calibrated {
            return Ok(CompassOutcome::Ignored(reading.status));
        }

        let delta_ms = now.delta_since(self.reference);
        self.active_mut().push_pair(delta_ms, reading.heading_deg)?;

        if !self.active_buffer().is_full() {
            return Ok(CompassOutcome::Buffered {
                cursor: self.cursor(),
            });
        }

        let from = self.active;
        let pairs = self.flush_and_swap(transport)?;
        Ok(CompassOutcome::Flushed { from, pairs })
    }

    /// Send every complete pair of the active buffer, then swap
    fn flush_and_swap<T: Transport>(&mut self, transport: &mut T) -> Result<usize, CompassError> {
        let result = send_pairs(self.active_buffer(), transport);
        self.active = self.active.other();
        self.active_mut().reset();
        result
    }

    /// Send the valid prefix of the active buffer and rewind it
    ///
    /// Sends nothing when there is no complete pair. Returns the number of
    /// pairs handed to the transport.
    pub fn flush_remaining<T: Transport>(&mut self, transport: &mut T) -> Result<usize, CompassError> {
        let result = if self.active_buffer().pair_count() == 0 {
            Ok(0)
        } else {
            send_pairs(self.active_buffer(), transport)
        };
        self.active_mut().reset();
        result
    }

    /// Drop the partial fill without sending
    pub fn discard(&mut self) {
        self.active_mut().reset();
    }

    fn active_mut(&mut self) -> &mut CompassBuffer {
        &mut self.buffers[self.active.index()]
    }
}

fn send_pairs<T: Transport>(
    buffer: &CompassBuffer,
    transport: &mut T,
) -> Result<usize, CompassError> {
    let message = compass_pairs(buffer.pairs())?;
    transport.send(&message)?;
    Ok(buffer.pair_count())
}

//! Message channel traits
//!
//! Sends report whether a message was *accepted for transmission*; delivery
//! is reported later through completion callbacks on the event loop.
//! Nothing here retries: callers decide the retry policy.

use esw_protocol::{Outbox, TransportError};

/// Trait for sending dictionaries to the phone
pub trait Transport {
    /// Hand a message to the channel
    fn send(&mut self, message: &Outbox) -> Result<(), TransportError>;
}

impl<T: Transport + ?Sized> Transport for &mut T {
    fn send(&mut self, message: &Outbox) -> Result<(), TransportError> {
        (**self).send(message)
    }
}

/// Trait for the raw platform outbox
pub trait MessageChannel {
    /// Queue encoded bytes for transmission
    fn transmit(&mut self, bytes: &[u8]) -> Result<(), TransportError>;
}

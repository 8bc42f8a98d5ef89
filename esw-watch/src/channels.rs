//! Event queue and inbox
//!
//! Platform callbacks post events; the main loop drains them in arrival
//! order. Received dictionaries wait in a separate single-slot inbox so
//! queued events stay small. Everything runs on one thread, so both use a
//! no-op mutex.

use embassy_sync::blocking_mutex::raw::NoopRawMutex;
use embassy_sync::channel::Channel;
use heapless::Vec;

use esw_protocol::{TransportError, INBOX_CAPACITY};

use crate::events::Event;

/// Queue capacity
pub const EVENT_QUEUE_SIZE: usize = 8;

/// Received dictionaries held until handled
pub const INBOX_DEPTH: usize = 1;

/// Bounded single-threaded event queue
pub type EventQueue = Channel<NoopRawMutex, Event, EVENT_QUEUE_SIZE>;

/// Raw bytes of one received dictionary
pub type InboundMessage = Vec<u8, INBOX_CAPACITY>;

/// Received dictionaries, announced by [`Event::Inbound`]
pub type Inbox = Channel<NoopRawMutex, InboundMessage, INBOX_DEPTH>;

/// Post an event, dropping it if the queue is full
///
/// Returns false if the event was dropped.
pub fn post(queue: &EventQueue, event: Event) -> bool {
    if queue.try_send(event).is_err() {
        warn!("Event queue full, dropping event");
        return false;
    }
    true
}

/// Store a received dictionary and announce it
///
/// Oversized messages, and messages arriving while the inbox is still
/// occupied, are reported as [`Event::InboxDropped`] instead. Returns false
/// if the message was dropped.
pub fn deliver(queue: &EventQueue, inbox: &Inbox, bytes: &[u8]) -> bool {
    let message = match InboundMessage::from_slice(bytes) {
        Ok(message) => message,
        Err(_) => {
            warn!("Inbound message too large: {} bytes", bytes.len());
            post(queue, Event::InboxDropped(TransportError::BufferOverflow));
            return false;
        }
    };

    if inbox.try_send(message).is_err() {
        warn!("Inbox occupied, dropping message");
        post(queue, Event::InboxDropped(TransportError::Busy));
        return false;
    }

    if !post(queue, Event::Inbound) {
        // Unannounced messages would block the slot
        let _ = inbox.try_receive();
        return false;
    }
    true
}

//! Transport adapter
//!
//! Wraps the platform outbox and enforces a single message in flight.
//! A message counts as in flight from the moment the channel accepts it
//! until the sent/failed completion callback arrives.

use esw_protocol::{Outbox, TransportError};

use crate::traits::{MessageChannel, Transport};

/// Channel counters since boot
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct LinkStats {
    /// Messages accepted for transmission
    pub accepted: u32,
    /// Sends refused before transmission (busy or channel error)
    pub refused: u32,
    /// Messages acknowledged by the phone
    pub delivered: u32,
    /// Messages that failed after acceptance
    pub failed: u32,
    /// Inbound messages dropped by the platform
    pub inbound_dropped: u32,
}

/// Outbox tracking adapter over a [`MessageChannel`]
#[derive(Debug)]
pub struct Uplink<C> {
    channel: C,
    in_flight: bool,
    stats: LinkStats,
}

impl<C: MessageChannel> Uplink<C> {
    pub fn new(channel: C) -> Self {
        Self {
            channel,
            in_flight: false,
            stats: LinkStats::default(),
        }
    }

    /// True while an accepted message awaits its completion callback
    pub fn is_busy(&self) -> bool {
        self.in_flight
    }

    pub fn stats(&self) -> LinkStats {
        self.stats
    }

    pub fn channel(&self) -> &C {
        &self.channel
    }

    /// Completion: the phone acknowledged the message
    pub fn on_sent(&mut self) {
        self.in_flight = false;
        self.stats.delivered = self.stats.delivered.saturating_add(1);
    }

    /// Completion: the message was lost after acceptance
    pub fn on_failed(&mut self, _reason: TransportError) {
        self.in_flight = false;
        self.stats.failed = self.stats.failed.saturating_add(1);
    }

    /// The platform dropped an inbound message
    pub fn on_inbox_dropped(&mut self, _reason: TransportError) {
        self.stats.inbound_dropped = self.stats.inbound_dropped.saturating_add(1);
    }

    /// Link loss discards any pending outbound message
    pub fn on_disconnected(&mut self) {
        self.in_flight = false;
    }
}

impl<C: MessageChannel> Transport for Uplink<C> {
    fn send(&mut self, message: &Outbox) -> Result<(), TransportError> {
        if self.in_flight {
            self.stats.refused = self.stats.refused.saturating_add(1);
            return Err(TransportError::Busy);
        }

        match self.channel.transmit(message.as_bytes()) {
            Ok(()) => {
                self.in_flight = true;
                self.stats.accepted = self.stats.accepted.saturating_add(1);
                Ok(())
            }
            Err(e) => {
                self.stats.refused = self.stats.refused.saturating_add(1);
                Err(e)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use esw_protocol::reply;

    #[derive(Default)]
    struct FakeChannel {
        transmitted: usize,
        refuse: Option<TransportError>,
    }

    impl MessageChannel for FakeChannel {
        fn transmit(&mut self, _bytes: &[u8]) -> Result<(), TransportError> {
            if let Some(e) = self.refuse {
                return Err(e);
            }
            self.transmitted += 1;
            Ok(())
        }
    }

    #[test]
    fn test_second_send_is_busy_until_completion() {
        let mut uplink = Uplink::new(FakeChannel::default());
        let message = reply("YES").unwrap();

        assert_eq!(uplink.send(&message), Ok(()));
        assert!(uplink.is_busy());
        assert_eq!(uplink.send(&message), Err(TransportError::Busy));
        assert_eq!(uplink.channel().transmitted, 1);

        uplink.on_sent();
        assert!(!uplink.is_busy());
        assert_eq!(uplink.send(&message), Ok(()));
        assert_eq!(uplink.channel().transmitted, 2);
    }

    #[test]
    fn test_failure_completion_frees_outbox() {
        let mut uplink = Uplink::new(FakeChannel::default());
        let message = reply("NO").unwrap();

        uplink.send(&message).unwrap();
        uplink.on_failed(TransportError::Timeout);

        assert!(!uplink.is_busy());
        assert_eq!(uplink.stats().failed, 1);
        assert_eq!(uplink.stats().delivered, 0);
    }

    #[test]
    fn test_refused_send_leaves_outbox_free() {
        let mut uplink = Uplink::new(FakeChannel {
            refuse: Some(TransportError::NotConnected),
            ..Default::default()
        });
        let message = reply("YES").unwrap();

        assert_eq!(uplink.send(&message), Err(TransportError::NotConnected));
        assert!(!uplink.is_busy());
        assert_eq!(uplink.stats().refused, 1);
        assert_eq!(uplink.stats().accepted, 0);
    }

    #[test]
    fn test_disconnect_clears_in_flight() {
        let mut uplink = Uplink::new(FakeChannel::default());
        uplink.send(&reply("YES").unwrap()).unwrap();

        uplink.on_disconnected();
        assert!(!uplink.is_busy());
    }

    #[test]
    fn test_inbox_drop_counted() {
        let mut uplink = Uplink::new(FakeChannel::default());
        uplink.on_inbox_dropped(TransportError::BufferOverflow);
        assert_eq!(uplink.stats().inbound_dropped, 1);
    }
}

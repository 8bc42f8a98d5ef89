//! Alert/confirmation protocol
//!
//! The phone pushes an alert; the watch shows it and waits for the user
//! to answer yes or no. The answer is retried a bounded number of times
//! with a fixed blocking delay between attempts. Until an answer is
//! accepted by the transport the alert stays pending.

use embedded_hal::delay::DelayNs;
use heapless::String;

use esw_protocol::{ReplyToken, TransportError};

use crate::traits::Transport;

/// Maximum stored alert length in bytes
pub const ALERT_MAX_BYTES: usize = 2000;

/// Reply attempts before giving up
pub const REPLY_ATTEMPTS: u8 = 3;

/// Delay between reply attempts
pub const REPLY_RETRY_DELAY_MS: u32 = 300;

/// Protocol states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum AlertState {
    /// No alert awaiting an answer
    #[default]
    Idle,
    /// Alert shown, answer not yet transmitted
    AwaitingResponse,
}

/// Result of a confirm press
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyOutcome {
    /// Nothing was pending; nothing was sent
    NotPending,
    /// The answer was accepted on attempt `attempts`
    Sent { token: ReplyToken, attempts: u8 },
    /// Every attempt failed; the alert is still pending
    GaveUp {
        token: ReplyToken,
        last_error: TransportError,
    },
}

/// Alert text and confirmation state
#[derive(Debug, Clone)]
pub struct AlertProtocol {
    state: AlertState,
    text: String<ALERT_MAX_BYTES>,
    attempts: u8,
    retry_delay_ms: u32,
}

impl Default for AlertProtocol {
    fn default() -> Self {
        Self::new()
    }
}

impl AlertProtocol {
    pub fn new() -> Self {
        Self::with_retry(REPLY_ATTEMPTS, REPLY_RETRY_DELAY_MS)
    }

    /// Protocol with a custom retry policy; at least one attempt is made
    pub fn with_retry(attempts: u8, retry_delay_ms: u32) -> Self {
        Self {
            state: AlertState::Idle,
            text: String::new(),
            attempts: attempts.max(1),
            retry_delay_ms,
        }
    }

    pub fn state(&self) -> AlertState {
        self.state
    }

    /// True while an alert awaits an answer
    pub fn is_pending(&self) -> bool {
        self.state == AlertState::AwaitingResponse
    }

    /// The stored alert text
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Store a new alert and start waiting for an answer
    ///
    /// Text beyond [`ALERT_MAX_BYTES`] is dropped at a character boundary.
    /// Returns true if the text was truncated.
    pub fn on_alert(&mut self, text: &str) -> bool {
        let end = floor_char_boundary(text, ALERT_MAX_BYTES);
        self.text.clear();
        // Cannot fail: `end` never exceeds the capacity
        let _ = self.text.push_str(&text[..end]);
        self.state = AlertState::AwaitingResponse;
        end < text.len()
    }

    /// Send the user's answer if an alert is pending
    ///
    /// Blocks for the retry delay between failed attempts.
    pub fn confirm<T, D>(&mut self, token: ReplyToken, transport: &mut T, delay: &mut D) -> ReplyOutcome
    where
        T: Transport,
        D: DelayNs,
    {
        if !self.is_pending() {
            return ReplyOutcome::NotPending;
        }

        let message = match token.to_outbox() {
            Ok(message) => message,
            Err(_) => {
                return ReplyOutcome::GaveUp {
                    token,
                    last_error: TransportError::BufferOverflow,
                }
            }
        };

        let mut last_error = TransportError::Unknown;
        for attempt in 1..=self.attempts {
            match transport.send(&message) {
                Ok(()) => {
                    self.state = AlertState::Idle;
                    return ReplyOutcome::Sent {
                        token,
                        attempts: attempt,
                    };
                }
                Err(e) => {
                    last_error = e;
                    if attempt < self.attempts {
                        delay.delay_ms(self.retry_delay_ms);
                    }
                }
            }
        }

        ReplyOutcome::GaveUp { token, last_error }
    }
}

/// Largest char boundary not above `max`
fn floor_char_boundary(text: &str, max: usize) -> usize {
    if text.len() <= max {
        return text.len();
    }
    let mut end = max;
    while !text.is_char_boundary(end) {
        end -= 1;
    }
    end
}

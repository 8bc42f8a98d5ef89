//! Session state definition

use super::events::SessionEvent;

/// Session states
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// No sensor subscriptions
    #[default]
    Stopped,
    /// Sensors subscribed, telemetry streaming
    Collecting,
}

impl SessionState {
    /// Check if sensor callbacks should be forwarded
    pub fn is_collecting(&self) -> bool {
        matches!(self, SessionState::Collecting)
    }

    /// Process an event and return the next state
    pub fn transition(self, event: SessionEvent) -> Self {
        use SessionEvent::*;
        use SessionState::*;

        match (self, event) {
            (Stopped, Start) => Collecting,
            (Collecting, Stop) => Stopped,
            (Collecting, LinkLost) => Stopped,

            // Default: stay in current state
            _ => self,
        }
    }
}

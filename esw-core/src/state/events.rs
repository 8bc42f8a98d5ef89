//! Events that trigger session transitions

/// Events that can trigger session transitions
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionEvent {
    /// Phone requested recording ("TURN ON")
    Start,
    /// Phone requested the end of recording ("TURN OFF")
    Stop,
    /// Link to the phone was lost
    LinkLost,
}

impl SessionEvent {
    /// Check if buffered data should be sent when this event ends a session
    pub fn flushes(&self) -> bool {
        matches!(self, SessionEvent::Stop)
    }
}

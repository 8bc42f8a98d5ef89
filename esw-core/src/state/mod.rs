//! Session state machine
//!
//! Defines when sensor data is being collected and streamed.
//! The state machine is explicit, finite, and deterministic.

pub mod events;
pub mod machine;

pub use events::SessionEvent;
pub use machine::SessionState;

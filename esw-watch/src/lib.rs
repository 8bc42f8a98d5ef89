//! ExtraSensory watch app
//!
//! The watch side of the ExtraSensory system: streams accelerometer and
//! compass telemetry to the paired phone and answers the phone's activity
//! alerts.
//!
//! # Architecture
//!
//! ```text
//! platform callbacks ──► EventQueue ──► App::run_pending
//!        │                                 │
//!        └── received bytes ──► Inbox ─────┤
//!             ┌──────────────┬─────────────┼──────────────┐
//!             ▼              ▼             ▼              ▼
//!      SessionController  AlertProtocol  Uplink      Ui / Settings
//!      (accel + compass)  (YES / NO)     (outbox)
//! ```
//!
//! Every callback runs to completion on one thread. The only blocking
//! operation is the fixed delay between reply attempts.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

// Must come first so the logging macros are visible to the other modules
#[macro_use]
mod fmt;

pub mod app;
pub mod channels;
pub mod events;

pub use app::App;
pub use channels::{
    deliver, post, EventQueue, Inbox, InboundMessage, EVENT_QUEUE_SIZE, INBOX_DEPTH,
};
pub use events::{Button, Event};

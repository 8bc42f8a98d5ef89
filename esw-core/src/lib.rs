//! Board-agnostic core logic for the watch app
//!
//! This crate contains all application logic that does not depend on
//! the watch platform:
//!
//! - Platform traits (transport, sensors, clock, UI, settings storage)
//! - Sample clock and timestamps
//! - Accelerometer pipeline and compass double-buffer
//! - Transport adapter with outbox tracking
//! - Alert/confirmation protocol
//! - Session state machine and controller
//! - Configuration type definitions

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod alert;
pub mod clock;
pub mod config;
pub mod session;
pub mod state;
pub mod telemetry;
pub mod traits;
pub mod uplink;

//! Watch ↔ phone message channel protocol
//!
//! This crate defines the dictionary messages exchanged between the watch
//! app and the paired phone. Every message is a small dictionary mapping
//! integer keys to short text values.
//!
//! # Wire Overview
//!
//! ```text
//! ┌───────┬─────────────────────────────────────────────┬─────┐
//! │ COUNT │ TUPLE 0                                     │ ... │
//! │ 1B    │ KEY 4B LE │ TYPE 1B │ LENGTH 2B LE │ DATA   │     │
//! └───────┴─────────────────────────────────────────────┴─────┘
//! ```
//!
//! Text values are NUL-terminated and `LENGTH` counts the terminator.
//! The outbound capacity is small, so builders fail cleanly instead of
//! truncating a sensor batch.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod dict;
pub mod messages;
pub mod result;

pub use dict::{DictError, DictReader, Outbox, Tuple, INBOX_CAPACITY, OUTBOX_CAPACITY};
pub use messages::{
    accel_batch, compass_pairs, reply, PhoneCommand, RecordingCommand, ReplyToken,
};
pub use result::TransportError;

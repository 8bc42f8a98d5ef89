//! Transport result codes
//!
//! The platform message service reports every outbox and inbox operation
//! with a numeric status. Success is `Ok(())`; everything else maps to a
//! [`TransportError`].

/// Status code for a successful operation
pub const CODE_OK: u32 = 0;

/// Reasons the message channel refused or lost a message
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum TransportError {
    /// The phone did not acknowledge in time
    Timeout,
    /// The phone rejected the message
    Rejected,
    /// No link to the phone
    NotConnected,
    /// The companion app is not running on the phone
    AppNotRunning,
    /// Malformed arguments were passed to the channel
    InvalidArgs,
    /// A previous message is still in flight
    Busy,
    /// The message does not fit into the channel buffer
    BufferOverflow,
    /// The outbox was released twice
    AlreadyReleased,
    /// Not enough memory to queue the message
    OutOfMemory,
    /// The channel has been closed
    Closed,
    /// Platform-internal failure
    InternalError,
    /// Unrecognized status code
    Unknown,
}

// Wire status codes
const CODE_TIMEOUT: u32 = 1 << 1;
const CODE_REJECTED: u32 = 1 << 2;
const CODE_NOT_CONNECTED: u32 = 1 << 3;
const CODE_APP_NOT_RUNNING: u32 = 1 << 4;
const CODE_INVALID_ARGS: u32 = 1 << 5;
const CODE_BUSY: u32 = 1 << 6;
const CODE_BUFFER_OVERFLOW: u32 = 1 << 7;
const CODE_ALREADY_RELEASED: u32 = 1 << 9;
const CODE_OUT_OF_MEMORY: u32 = 1 << 12;
const CODE_CLOSED: u32 = 1 << 13;
const CODE_INTERNAL_ERROR: u32 = 1 << 14;
const CODE_UNKNOWN: u32 = u32::MAX;

impl TransportError {
    /// Interpret a platform status code
    ///
    /// Returns `Ok(())` for [`CODE_OK`]. Codes this crate does not know
    /// become [`TransportError::Unknown`].
    pub fn check(code: u32) -> Result<(), Self> {
        match code {
            CODE_OK => Ok(()),
            other => Err(Self::from_code(other)),
        }
    }

    /// Map a non-zero status code to an error
    pub fn from_code(code: u32) -> Self {
        match code {
            CODE_TIMEOUT => TransportError::Timeout,
            CODE_REJECTED => TransportError::Rejected,
            CODE_NOT_CONNECTED => TransportError::NotConnected,
            CODE_APP_NOT_RUNNING => TransportError::AppNotRunning,
            CODE_INVALID_ARGS => TransportError::InvalidArgs,
            CODE_BUSY => TransportError::Busy,
            CODE_BUFFER_OVERFLOW => TransportError::BufferOverflow,
            CODE_ALREADY_RELEASED => TransportError::AlreadyReleased,
            CODE_OUT_OF_MEMORY => TransportError::OutOfMemory,
            CODE_CLOSED => TransportError::Closed,
            CODE_INTERNAL_ERROR => TransportError::InternalError,
            _ => TransportError::Unknown,
        }
    }

    /// Wire status code for this error
    pub fn code(self) -> u32 {
        match self {
            TransportError::Timeout => CODE_TIMEOUT,
            TransportError::Rejected => CODE_REJECTED,
            TransportError::NotConnected => CODE_NOT_CONNECTED,
            TransportError::AppNotRunning => CODE_APP_NOT_RUNNING,
            TransportError::InvalidArgs => CODE_INVALID_ARGS,
            TransportError::Busy => CODE_BUSY,
            TransportError::BufferOverflow => CODE_BUFFER_OVERFLOW,
            TransportError::AlreadyReleased => CODE_ALREADY_RELEASED,
            TransportError::OutOfMemory => CODE_OUT_OF_MEMORY,
            TransportError::Closed => CODE_CLOSED,
            TransportError::InternalError => CODE_INTERNAL_ERROR,
            TransportError::Unknown => CODE_UNKNOWN,
        }
    }

    /// Stable name for log output
    pub fn as_str(self) -> &'static str {
        match self {
            TransportError::Timeout => "SEND_TIMEOUT",
            TransportError::Rejected => "SEND_REJECTED",
            TransportError::NotConnected => "NOT_CONNECTED",
            TransportError::AppNotRunning => "APP_NOT_RUNNING",
            TransportError::InvalidArgs => "INVALID_ARGS",
            TransportError::Busy => "BUSY",
            TransportError::BufferOverflow => "BUFFER_OVERFLOW",
            TransportError::AlreadyReleased => "ALREADY_RELEASED",
            TransportError::OutOfMemory => "OUT_OF_MEMORY",
            TransportError::Closed => "CLOSED",
            TransportError::InternalError => "INTERNAL_ERROR",
            TransportError::Unknown => "UNKNOWN_ERROR",
        }
    }

    /// Returns true if the link itself is gone rather than congested
    pub fn is_link_down(self) -> bool {
        matches!(
            self,
            TransportError::NotConnected | TransportError::AppNotRunning | TransportError::Closed
        )
    }
}

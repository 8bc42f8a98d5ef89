//! Message layouts for the watch ↔ phone channel
//!
//! Messages are distinguished by the keys they carry:
//! - Watch → Phone: accelerometer batches, compass flushes, reply tokens
//! - Phone → Watch: recording commands, alert text

use core::fmt::Write;

use heapless::String;

use crate::dict::{DictError, Outbox, Tuple, INBOX_CAPACITY};

// Keys: Watch → Phone
pub const KEY_ACCEL_DELTA: u32 = 0;
pub const KEY_ACCEL_FIRST_SAMPLE: u32 = 1;
pub const KEY_COMPASS_FIRST_PAIR: u32 = 0;
pub const KEY_REPLY: u32 = 42;

// Keys: Phone → Watch
pub const KEY_RECORDING: u32 = 1;
pub const KEY_ALERT: u32 = 2;

/// Recording command values
pub const RECORDING_ON: &str = "TURN ON";
pub const RECORDING_OFF: &str = "TURN OFF";

/// Scratch size for a single formatted value
const VALUE_SCRATCH: usize = 24;

/// Build an accelerometer batch message
///
/// Slot 0 carries the batch delta in milliseconds, slots `1..` carry one
/// `"x,y,z"` sample each. A 25-sample batch fits the outbox when every
/// axis lies within ±4000; wider values can fail with `BufferTooSmall`.
pub fn accel_batch<I>(delta_ms: i32, samples: I) -> Result<Outbox, DictError>
where
    I: IntoIterator<Item = [i16; 3]>,
{
    let mut outbox = Outbox::new();
    let mut value = String::<VALUE_SCRATCH>::new();

    write!(value, "{}", delta_ms).map_err(|_| DictError::BufferTooSmall)?;
    outbox.write_cstring(KEY_ACCEL_DELTA, &value)?;

    for (key, [x, y, z]) in (KEY_ACCEL_FIRST_SAMPLE..).zip(samples) {
        value.clear();
        write!(value, "{},{},{}", x, y, z).map_err(|_| DictError::BufferTooSmall)?;
        outbox.write_cstring(key, &value)?;
    }

    Ok(outbox)
}

/// Build a compass flush message
///
/// Each `(delta_ms, heading)` pair becomes `"delta:heading"` in the next slot.
pub fn compass_pairs<I>(pairs: I) -> Result<Outbox, DictError>
where
    I: IntoIterator<Item = (i32, i32)>,
{
    let mut outbox = Outbox::new();
    let mut value = String::<VALUE_SCRATCH>::new();

    for (key, (delta_ms, heading)) in (KEY_COMPASS_FIRST_PAIR..).zip(pairs) {
        value.clear();
        write!(value, "{}:{}", delta_ms, heading).map_err(|_| DictError::BufferTooSmall)?;
        outbox.write_cstring(key, &value)?;
    }

    Ok(outbox)
}

/// Build a reply or status message
pub fn reply(text: &str) -> Result<Outbox, DictError> {
    let mut outbox = Outbox::new();
    outbox.write_cstring(KEY_REPLY, text)?;
    Ok(outbox)
}

/// The user's answer to an alert
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ReplyToken {
    Yes,
    No,
}

impl ReplyToken {
    /// Wire text for this answer
    pub fn as_str(self) -> &'static str {
        match self {
            ReplyToken::Yes => "YES",
            ReplyToken::No => "NO",
        }
    }

    /// Build the reply message for this answer
    pub fn to_outbox(self) -> Result<Outbox, DictError> {
        reply(self.as_str())
    }
}

/// Recording switch requested by the phone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RecordingCommand {
    On,
    Off,
}

/// Commands parsed from phone-originated tuples
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PhoneCommand<'a> {
    /// Start or stop sensor collection
    Recording(RecordingCommand),
    /// Alert text to present to the user
    Alert(&'a str),
}

impl<'a> PhoneCommand<'a> {
    /// Parse a command from a tuple
    ///
    /// Unknown keys and unknown recording values yield `None`.
    pub fn from_tuple(tuple: &Tuple<'a>) -> Option<Self> {
        match tuple.key {
            KEY_RECORDING => match tuple.value {
                RECORDING_ON => Some(PhoneCommand::Recording(RecordingCommand::On)),
                RECORDING_OFF => Some(PhoneCommand::Recording(RecordingCommand::Off)),
                _ => None,
            },
            KEY_ALERT => Some(PhoneCommand::Alert(tuple.value)),
            _ => None,
        }
    }

    /// Encode this command into a dictionary (for testing or simulation)
    pub fn to_outbox(&self) -> Result<Outbox<INBOX_CAPACITY>, DictError> {
        let mut outbox = Outbox::new();
        match self {
            PhoneCommand::Recording(RecordingCommand::On) => {
                outbox.write_cstring(KEY_RECORDING, RECORDING_ON)?
            }
            PhoneCommand::Recording(RecordingCommand::Off) => {
                outbox.write_cstring(KEY_RECORDING, RECORDING_OFF)?
            }
            PhoneCommand::Alert(text) => outbox.write_cstring(KEY_ALERT, text)?,
        }
        Ok(outbox)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dict::{DictReader, OUTBOX_CAPACITY};

    #[test]
    fn test_accel_batch_layout() {
        let samples = [[-3, 15, 990], [0, 0, 1000]];
        let outbox = accel_batch(140, samples).unwrap();
        let reader = outbox.reader();

        assert_eq!(outbox.count(), 3);
        assert_eq!(reader.get(0), Some("140"));
        assert_eq!(reader.get(1), Some("-3,15,990"));
        assert_eq!(reader.get(2), Some("0,0,1000"));
    }

    #[test]
    fn test_full_accel_batch_fits_outbox() {
        // Widest sample text within the ±4000 mg sensor range
        let samples = [[-4000i16, -4000, -4000]; 25];
        let outbox = accel_batch(i32::MIN, samples).unwrap();

        assert_eq!(outbox.count(), 26);
        assert!(outbox.len() <= OUTBOX_CAPACITY);
    }

    #[test]
    fn test_compass_pairs_layout() {
        let outbox = compass_pairs([(10, 10), (25, 15)]).unwrap();
        let reader = outbox.reader();

        assert_eq!(outbox.count(), 2);
        assert_eq!(reader.get(0), Some("10:10"));
        assert_eq!(reader.get(1), Some("25:15"));
    }

    #[test]
    fn test_compass_no_pairs() {
        let outbox = compass_pairs(core::iter::empty()).unwrap();
        assert!(outbox.is_empty());
    }

    #[test]
    fn test_reply_tokens() {
        let yes = ReplyToken::Yes.to_outbox().unwrap();
        assert_eq!(yes.reader().get(KEY_REPLY), Some("YES"));

        let no = ReplyToken::No.to_outbox().unwrap();
        assert_eq!(no.reader().get(KEY_REPLY), Some("NO"));
    }

    #[test]
    fn test_phone_command_recording() {
        let on = Tuple {
            key: KEY_RECORDING,
            value: "TURN ON",
        };
        assert_eq!(
            PhoneCommand::from_tuple(&on),
            Some(PhoneCommand::Recording(RecordingCommand::On))
        );

        let bogus = Tuple {
            key: KEY_RECORDING,
            value: "turn on",
        };
        assert_eq!(PhoneCommand::from_tuple(&bogus), None);
    }

    #[test]
    fn test_phone_command_unknown_key() {
        let tuple = Tuple {
            key: 77,
            value: "hello",
        };
        assert_eq!(PhoneCommand::from_tuple(&tuple), None);
    }

    #[test]
    fn test_phone_command_roundtrip() {
        let original = PhoneCommand::Alert("Are you walking?");
        let outbox = original.to_outbox().unwrap();

        let mut reader = DictReader::new(outbox.as_bytes()).unwrap();
        let tuple = reader.next().unwrap().unwrap();
        assert_eq!(PhoneCommand::from_tuple(&tuple), Some(original));
    }
}

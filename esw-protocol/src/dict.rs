//! Dictionary encoding and decoding for the message channel.
//!
//! Dictionary format:
//! - COUNT (1 byte): number of tuples that follow
//! - per tuple:
//!   - KEY (4 bytes, little endian)
//!   - TYPE (1 byte): value type, only C strings are produced
//!   - LENGTH (2 bytes, little endian): data length including the NUL
//!   - DATA (LENGTH bytes)

use heapless::Vec;

/// Maximum outbound dictionary size in bytes
pub const OUTBOX_CAPACITY: usize = 656;

/// Maximum inbound dictionary size in bytes
pub const INBOX_CAPACITY: usize = 2048;

/// Bytes taken by a tuple before its data (KEY + TYPE + LENGTH)
pub const TUPLE_HEADER_SIZE: usize = 4 + 1 + 2;

/// Maximum tuples per dictionary (COUNT is a single byte)
pub const MAX_TUPLES: usize = u8::MAX as usize;

/// Tuple value type for NUL-terminated text
const TYPE_CSTRING: u8 = 1;

/// Errors that can occur while building or reading a dictionary
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DictError {
    /// The tuple does not fit into the remaining capacity
    BufferTooSmall,
    /// The dictionary already holds the maximum number of tuples
    TooManyTuples,
    /// Input ended in the middle of a tuple
    Truncated,
    /// Text value is not valid UTF-8
    InvalidUtf8,
    /// Tuple carries a value type other than a C string
    UnsupportedType,
}

/// A single key/text pair
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Tuple<'a> {
    /// Integer key
    pub key: u32,
    /// Text value, without the NUL terminator
    pub value: &'a str,
}

/// An encoded dictionary under construction
///
/// The outbox always holds a valid encoding: a failed write leaves the
/// previously written tuples untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outbox<const N: usize = OUTBOX_CAPACITY> {
    bytes: Vec<u8, N>,
}

impl<const N: usize> Default for Outbox<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> Outbox<N> {
    /// Create an empty dictionary
    pub fn new() -> Self {
        let mut bytes = Vec::new();
        // COUNT byte; an outbox with N == 0 cannot hold anything anyway
        let _ = bytes.push(0);
        Self { bytes }
    }

    /// Number of tuples written so far
    pub fn count(&self) -> u8 {
        self.bytes.first().copied().unwrap_or(0)
    }

    /// Returns true if no tuple has been written
    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    /// Encoded size in bytes
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Bytes still available for tuples
    pub fn remaining(&self) -> usize {
        N - self.bytes.len()
    }

    /// The encoded dictionary
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Read back the tuples written so far
    pub fn reader(&self) -> DictReader<'_> {
        DictReader {
            bytes: &self.bytes,
            pos: 1,
            remaining: self.count(),
        }
    }

    /// Append a text tuple
    pub fn write_cstring(&mut self, key: u32, value: &str) -> Result<(), DictError> {
        let count = self.count();
        if count as usize >= MAX_TUPLES {
            return Err(DictError::TooManyTuples);
        }

        let data_len = value.len() + 1;
        if data_len > u16::MAX as usize
            || self.bytes.is_empty()
            || TUPLE_HEADER_SIZE + data_len > self.remaining()
        {
            return Err(DictError::BufferTooSmall);
        }

        let start = self.bytes.len();
        if self.push_tuple(key, data_len as u16, value).is_err() {
            self.bytes.truncate(start);
            return Err(DictError::BufferTooSmall);
        }

        self.bytes[0] = count + 1;
        Ok(())
    }

    fn push_tuple(&mut self, key: u32, data_len: u16, value: &str) -> Result<(), ()> {
        self.bytes.extend_from_slice(&key.to_le_bytes())?;
        self.bytes.push(TYPE_CSTRING).map_err(|_| ())?;
        self.bytes.extend_from_slice(&data_len.to_le_bytes())?;
        self.bytes.extend_from_slice(value.as_bytes())?;
        self.bytes.push(0).map_err(|_| ())
    }
}

/// Zero-copy iterator over the tuples of a received dictionary
///
/// Iteration stops after the first error.
#[derive(Debug, Clone)]
pub struct DictReader<'a> {
    bytes: &'a [u8],
    pos: usize,
    remaining: u8,
}

impl<'a> DictReader<'a> {
    /// Start reading an encoded dictionary
    pub fn new(bytes: &'a [u8]) -> Result<Self, DictError> {
        let count = *bytes.first().ok_or(DictError::Truncated)?;
        Ok(Self {
            bytes,
            pos: 1,
            remaining: count,
        })
    }

    /// Find the first tuple with `key`, skipping malformed input
    pub fn get(&self, key: u32) -> Option<&'a str> {
        self.clone()
            .filter_map(Result::ok)
            .find(|t| t.key == key)
            .map(|t| t.value)
    }

    fn take(&mut self, n: usize) -> Result<&'a [u8], DictError> {
        let end = self.pos.checked_add(n).ok_or(DictError::Truncated)?;
        let slice = self.bytes.get(self.pos..end).ok_or(DictError::Truncated)?;
        self.pos = end;
        Ok(slice)
    }

    fn read_tuple(&mut self) -> Result<Tuple<'a>, DictError> {
        let header = self.take(TUPLE_HEADER_SIZE)?;
        let key = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        let value_type = header[4];
        let length = u16::from_le_bytes([header[5], header[6]]) as usize;
        let data = self.take(length)?;

        // Byte arrays and integers are never sent to the watch
        if value_type != TYPE_CSTRING {
            return Err(DictError::UnsupportedType);
        }

        // C string semantics: text ends at the first NUL
        let text = match data.iter().position(|&b| b == 0) {
            Some(nul) => &data[..nul],
            None => data,
        };
        let value = core::str::from_utf8(text).map_err(|_| DictError::InvalidUtf8)?;

        Ok(Tuple { key, value })
    }
}

impl<'a> Iterator for DictReader<'a> {
    type Item = Result<Tuple<'a>, DictError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.remaining == 0 {
            return None;
        }
        match self.read_tuple() {
            Ok(tuple) => {
                self.remaining -= 1;
                Some(Ok(tuple))
            }
            Err(e) => {
                self.remaining = 0;
                Some(Err(e))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_empty_outbox() {
        let outbox: Outbox = Outbox::new();
        assert_eq!(outbox.as_bytes(), &[0]);
        assert!(outbox.is_empty());
        assert_eq!(outbox.reader().count(), 0);
    }

    #[test]
    fn test_encode_single_tuple() {
        let mut outbox: Outbox = Outbox::new();
        outbox.write_cstring(42, "YES").unwrap();

        assert_eq!(
            outbox.as_bytes(),
            &[1, 42, 0, 0, 0, 1, 4, 0, b'Y', b'E', b'S', 0]
        );
    }

    #[test]
    fn test_read_back_in_order() {
        let mut outbox: Outbox = Outbox::new();
        outbox.write_cstring(0, "120").unwrap();
        outbox.write_cstring(1, "-3,15,990").unwrap();

        let mut reader = DictReader::new(outbox.as_bytes()).unwrap();
        assert_eq!(reader.next(), Some(Ok(Tuple { key: 0, value: "120" })));
        assert_eq!(
            reader.next(),
            Some(Ok(Tuple {
                key: 1,
                value: "-3,15,990"
            }))
        );
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_overflow_leaves_outbox_unchanged() {
        let mut outbox: Outbox<16> = Outbox::new();
        outbox.write_cstring(1, "abc").unwrap();
        let before = outbox.clone();

        assert_eq!(
            outbox.write_cstring(2, "too long for it"),
            Err(DictError::BufferTooSmall)
        );
        assert_eq!(outbox, before);
    }

    #[test]
    fn test_truncated_input() {
        let mut outbox: Outbox = Outbox::new();
        outbox.write_cstring(2, "hello").unwrap();
        let bytes = outbox.as_bytes();

        let mut reader = DictReader::new(&bytes[..bytes.len() - 2]).unwrap();
        assert_eq!(reader.next(), Some(Err(DictError::Truncated)));
        assert_eq!(reader.next(), None);
    }

    #[test]
    fn test_empty_input() {
        assert!(matches!(DictReader::new(&[]), Err(DictError::Truncated)));
    }

    #[test]
    fn test_invalid_utf8() {
        let bytes = [1, 2, 0, 0, 0, 1, 3, 0, 0xFF, 0xFE, 0];
        let mut reader = DictReader::new(&bytes).unwrap();
        assert_eq!(reader.next(), Some(Err(DictError::InvalidUtf8)));
    }

    #[test]
    fn test_integer_tuple_rejected() {
        let bytes = [1, 7, 0, 0, 0, 2, 4, 0, 1, 0, 0, 0];
        let mut reader = DictReader::new(&bytes).unwrap();
        assert_eq!(reader.next(), Some(Err(DictError::UnsupportedType)));
    }

    #[test]
    fn test_text_stops_at_nul() {
        let bytes = [1, 2, 0, 0, 0, 1, 5, 0, b'h', b'i', 0, b'x', 0];
        let reader = DictReader::new(&bytes).unwrap();
        assert_eq!(reader.get(2), Some("hi"));
    }

    #[test]
    fn test_get_missing_key() {
        let mut outbox: Outbox = Outbox::new();
        outbox.write_cstring(1, "TURN ON").unwrap();
        assert_eq!(outbox.reader().get(2), None);
        assert_eq!(outbox.reader().get(1), Some("TURN ON"));
    }

    proptest! {
        #[test]
        fn prop_written_tuples_read_back(
            entries in proptest::collection::vec((any::<u32>(), "[a-zA-Z0-9:,-]{0,20}"), 0..20)
        ) {
            let mut outbox: Outbox = Outbox::new();
            let mut written = 0usize;
            for (key, value) in &entries {
                if outbox.write_cstring(*key, value).is_ok() {
                    written += 1;
                }
            }

            let tuples: heapless::Vec<Tuple, 32> =
                outbox.reader().map(|t| t.unwrap()).collect();
            prop_assert_eq!(tuples.len(), written);
            for (tuple, (key, value)) in tuples.iter().zip(entries.iter()) {
                prop_assert_eq!(tuple.key, *key);
                prop_assert_eq!(tuple.value, value.as_str());
            }
        }
    }
}

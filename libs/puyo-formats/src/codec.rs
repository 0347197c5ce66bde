//! Fixed-width little-endian primitives and the [`Codec`] byte source/sink interface.

use std::io::{Read, Write};

use crate::error::{FormatError, StreamError};

/// A binary format that is decoded from and encoded to fully materialized byte buffers.
pub trait Codec: Sized {
    /// External configuration required to decode the format, since it is not stored in-file.
    type Options;

    /// Decodes `bytes` into the in-memory representation of the format.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if `bytes` does not conform to the format.
    fn decode(bytes: &[u8], options: Self::Options) -> Result<Self, FormatError>;

    /// Encodes the in-memory representation back into its binary form.
    ///
    /// # Errors
    ///
    /// Returns a [`FormatError`] if a value cannot be represented in the binary form.
    fn encode(&self) -> Result<Vec<u8>, FormatError>;

    /// Reads `reader` to its end and decodes the result.
    ///
    /// # Errors
    ///
    /// - [`StreamError::Io`]: Returned if reading from `reader` fails.
    /// - [`StreamError::Format`]: Returned if [`Codec::decode()`] fails.
    fn read_from<R: Read>(mut reader: R, options: Self::Options) -> Result<Self, StreamError> {
        let mut bytes = Vec::new();
        reader.read_to_end(&mut bytes)?;

        Ok(Self::decode(&bytes, options)?)
    }

    /// Encodes `self` and writes the result into `writer`.
    ///
    /// # Errors
    ///
    /// - [`StreamError::Format`]: Returned if [`Codec::encode()`] fails.
    /// - [`StreamError::Io`]: Returned if writing to `writer` fails.
    fn write_to<W: Write>(&self, mut writer: W) -> Result<(), StreamError> {
        let bytes = self.encode()?;
        writer.write_all(&bytes)?;
        writer.flush()?;

        Ok(())
    }
}

/// Returns the little-endian `u16` at `offset` bytes from the start of `data`, or `None` if out
/// of bounds.
pub fn parse_u16_at(data: &[u8], offset: usize) -> Option<u16> {
    let bytes = data.get(offset..offset.checked_add(2)?)?;
    Some(u16::from_le_bytes([bytes[0], bytes[1]]))
}

/// Returns the little-endian unsigned integer of `width` bytes at `offset` bytes from the start
/// of `data`, or `None` if out of bounds.
///
/// `width` must be at most 8.
pub fn parse_uint_at(data: &[u8], offset: usize, width: usize) -> Option<u64> {
    debug_assert!(width <= 8);

    let bytes = data.get(offset..offset.checked_add(width)?)?;
    let mut buffer = [0; 8];
    buffer[..width].copy_from_slice(bytes);

    Some(u64::from_le_bytes(buffer))
}

/// Appends the low `width` bytes of `value` to `buffer` in little-endian order.
///
/// `width` must be at most 8.
pub fn push_uint(buffer: &mut Vec<u8>, value: u64, width: usize) {
    debug_assert!(width <= 8);

    buffer.extend_from_slice(&value.to_le_bytes()[..width]);
}

/// Splits `data` into records of exactly `N` bytes.
///
/// Returns `None` if the length of `data` is not a multiple of `N`.
pub fn records<const N: usize>(data: &[u8]) -> Option<impl Iterator<Item = &[u8; N]>> {
    if data.len() % N != 0 {
        return None;
    }

    Some(
        data.chunks_exact(N)
            .filter_map(|chunk| chunk.first_chunk::<N>()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fpd::FpdIndex;

    #[test]
    fn parses_little_endian_integers() {
        let data = [0x34, 0x12, 0x78, 0x56, 0x00, 0x00, 0x00, 0x00, 0xFF];

        assert_eq!(parse_u16_at(&data, 0), Some(0x1234));
        assert_eq!(parse_uint_at(&data, 0, 4), Some(0x5678_1234));
        assert_eq!(parse_uint_at(&data, 0, 8), Some(0x5678_1234));
        assert_eq!(parse_u16_at(&data, 8), None);
        assert_eq!(parse_uint_at(&data, 6, 4), None);
        assert_eq!(parse_uint_at(&data, usize::MAX, 4), None);
    }

    #[test]
    fn pushes_little_endian_integers() {
        let mut buffer = Vec::new();
        push_uint(&mut buffer, 0x0102_0304, 4);
        push_uint(&mut buffer, 0x0A, 8);

        assert_eq!(buffer, [4, 3, 2, 1, 0x0A, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn splits_exact_records() {
        let data = [1, 2, 3, 4, 5, 6];

        let split = records::<3>(&data).map(|records| records.collect::<Vec<_>>());
        assert_eq!(split, Some(vec![&[1, 2, 3], &[4, 5, 6]]));

        assert!(records::<4>(&data).is_none());
        assert_eq!(records::<3>(&[]).map(Iterator::count), Some(0));
    }

    #[test]
    fn streams_through_readers_and_writers() {
        let index = FpdIndex::from_text("ab", 1).unwrap();

        let mut sink = Vec::new();
        index.write_to(&mut sink).unwrap();
        assert_eq!(sink, [0x61, 0x00, 0x01, 0x62, 0x00, 0x01]);
        assert_eq!(FpdIndex::read_from(sink.as_slice(), ()).unwrap(), index);

        assert!(matches!(
            FpdIndex::read_from(&[0_u8][..], ()),
            Err(StreamError::Format(FormatError::MalformedRecord { .. }))
        ));
    }
}

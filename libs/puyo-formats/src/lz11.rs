//! LZ11 decompression.
//!
//! LZ11 is the LZSS variant that the Nintendo DS and 3DS releases compress their archives with.
//! A stream starts with the magic byte [`MAGIC`] followed by the 24-bit little-endian size of
//! the decompressed data. A size of zero means that the real size follows as a 32-bit integer.
//!
//! The data itself is a sequence of flag bytes, each followed by up to eight blocks. Flag bits
//! are consumed starting from the most significant one: a clear bit marks a literal byte, a set
//! bit a back-reference into the output.

use crate::{
    codec::parse_uint_at,
    error::{Format, FormatError},
};

/// The byte that every LZ11 stream starts with.
pub const MAGIC: u8 = 0x11;

/// The prefix that some files place in front of the LZ11 stream.
pub const COMP_PREFIX: &[u8; 4] = b"COMP";

/// Decompresses an LZ11 stream, optionally prefixed with [`COMP_PREFIX`].
///
/// # Errors
///
/// Returns [`FormatError::MalformedRecord`] if `data` does not start with [`MAGIC`], ends before
/// the declared size has been produced, refers to data before the start of the output, or
/// produces more data than declared.
pub fn decompress(data: &[u8]) -> Result<Vec<u8>, FormatError> {
    let mut input = Input::new(data.strip_prefix(COMP_PREFIX).unwrap_or(data));

    let magic = input.byte()?;
    if magic != MAGIC {
        return Err(FormatError::malformed(
            Format::Lz11,
            format!("magic byte {magic:#04x} instead of {MAGIC:#04x}"),
        ));
    }

    let mut size = input.uint(3)?;
    if size == 0 {
        size = input.uint(4)?;
    }
    let size = usize::try_from(size).map_err(|_| {
        FormatError::malformed(Format::Lz11, format!("decompressed size {size} is too large"))
    })?;

    let mut output = Vec::with_capacity(size.min(data.len().saturating_mul(8)));
    while output.len() < size {
        let flags = input.byte()?;

        for bit in (0..8).rev() {
            if output.len() >= size {
                break;
            }

            if flags & (1 << bit) == 0 {
                output.push(input.byte()?);
                continue;
            }

            let first = input.byte()?;
            let (count, last) = match first >> 4 {
                0 => {
                    let second = input.byte()?;
                    let count = (usize::from(first) << 4 | usize::from(second >> 4)) + 0x11;
                    (count, second)
                }
                1 => {
                    let second = input.byte()?;
                    let third = input.byte()?;
                    let count = (usize::from(first & 0xF) << 12
                        | usize::from(second) << 4
                        | usize::from(third >> 4))
                        + 0x111;
                    (count, third)
                }
                indicator => (usize::from(indicator) + 1, first),
            };
            let displacement = (usize::from(last & 0xF) << 8 | usize::from(input.byte()?)) + 1;

            let start = output.len().checked_sub(displacement).ok_or_else(|| {
                FormatError::malformed(
                    Format::Lz11,
                    format!(
                        "back-reference {displacement} bytes back with only {} bytes written",
                        output.len()
                    ),
                )
            })?;

            // Copied one byte at a time since the source may overlap the bytes being written.
            for index in start..start + count {
                let byte = output[index];
                output.push(byte);
            }
        }
    }

    if output.len() != size {
        return Err(FormatError::malformed(
            Format::Lz11,
            format!("decompressed {} bytes but expected {size}", output.len()),
        ));
    }

    Ok(output)
}

/// A cursor over compressed data.
struct Input<'a> {
    /// The compressed data.
    data: &'a [u8],
    /// The offset of the next unread byte.
    position: usize,
}

impl<'a> Input<'a> {
    /// Creates a new [`Input`] positioned at the start of `data`.
    const fn new(data: &'a [u8]) -> Self {
        Self { data, position: 0 }
    }

    /// Reads a single byte.
    fn byte(&mut self) -> Result<u8, FormatError> {
        self.uint(1).map(|value| value as u8)
    }

    /// Reads a little-endian unsigned integer of `width` bytes.
    fn uint(&mut self, width: usize) -> Result<u64, FormatError> {
        let value = parse_uint_at(self.data, self.position, width).ok_or_else(|| {
            FormatError::malformed(
                Format::Lz11,
                format!("stream ends at {:#x} in the middle of a block", self.data.len()),
            )
        })?;
        self.position += width;

        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Decompresses to `abcabcabcX`: three literals, a six byte back-reference and a literal.
    const SHORT_STREAM: &[u8] = &[
        0x11, 0x0A, 0x00, 0x00, // header
        0x10, b'a', b'b', b'c', 0x50, 0x02, b'X',
    ];

    #[test]
    fn decompresses_literals_and_back_references() {
        assert_eq!(decompress(SHORT_STREAM).unwrap(), b"abcabcabcX");

        let prefixed = [COMP_PREFIX.as_slice(), SHORT_STREAM].concat();
        assert_eq!(decompress(&prefixed).unwrap(), b"abcabcabcX");
    }

    #[test]
    fn decompresses_long_back_references() {
        // 8-bit count: 0x0F + 0x11 copies of the previous byte.
        let eight_bit = [0x11, 0x21, 0x00, 0x00, 0x40, b'z', 0x00, 0xF0, 0x00];
        assert_eq!(decompress(&eight_bit).unwrap(), vec![b'z'; 0x21]);

        // 16-bit count: 0xEF + 0x111 copies of the previous byte.
        let sixteen_bit = [0x11, 0x01, 0x02, 0x00, 0x40, b'z', 0x10, 0x0E, 0xF0, 0x00];
        assert_eq!(decompress(&sixteen_bit).unwrap(), vec![b'z'; 0x201]);
    }

    #[test]
    fn reads_extended_size() {
        let stream = [0x11, 0x00, 0x00, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00, b'h', b'i'];
        assert_eq!(decompress(&stream).unwrap(), b"hi");

        let empty = [0x11, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00];
        assert_eq!(decompress(&empty).unwrap(), b"");
    }

    #[test]
    fn rejects_malformed_streams() {
        let bad_magic = [0x10, 0x01, 0x00, 0x00, 0x00, b'a'];
        let truncated = &SHORT_STREAM[..SHORT_STREAM.len() - 1];
        let before_start = [0x11, 0x04, 0x00, 0x00, 0x80, 0x30, 0x05];
        let overrun = [0x11, 0x05, 0x00, 0x00, 0x10, b'a', b'b', b'c', 0x50, 0x02];

        let streams: [&[u8]; 5] = [&bad_magic, truncated, &before_start, &overrun, &[]];
        for stream in streams {
            assert!(
                matches!(
                    decompress(stream),
                    Err(FormatError::MalformedRecord {
                        format: Format::Lz11,
                        ..
                    })
                ),
                "{stream:02x?}"
            );
        }
    }
}

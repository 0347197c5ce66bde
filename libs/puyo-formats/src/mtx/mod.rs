//! The `mtx` dialog script.
//!
//! With `W` being the width of an offset (4 or 8 bytes), an `mtx` file is laid out as follows,
//! all integers little-endian:
//!
//! | Range               | Contents                                                     |
//! |---------------------|--------------------------------------------------------------|
//! | `0..W`              | The size of the file.                                        |
//! | `W..2W`             | The offset of the section table field, always `2W`.          |
//! | `2W..3W`            | The offset of the section table, always `3W`.                |
//! | `3W..3W + n * W`    | The offset of each of the `n` strings.                       |
//! | rest                | The strings, as 16-bit code units.                           |
//!
//! A string runs from its offset up to the offset of the next string, the last one up to the end
//! of the file. Code units below [`CONTROL_CODE_START`] are indices into an `fpd` character
//! table, the rest are control codes.

use core::fmt;

use crate::{
    codec::{Codec, parse_u16_at, parse_uint_at, push_uint},
    error::{Format, FormatError},
};

pub mod script;
pub mod xml;

/// The width of a single code unit in bytes.
const CODE_UNIT_WIDTH: usize = 2;

/// The first code unit that is a control code rather than a character index.
pub const CONTROL_CODE_START: u16 = 0xF800;

/// Waits for the player to press a button before continuing.
pub const CONTROL_ARROW: u16 = 0xF813;

/// Starts a new line.
pub const CONTROL_LINE_BREAK: u16 = 0xFFFD;

/// Ends the dialog.
pub const CONTROL_END: u16 = 0xFFFF;

/// A string of 16-bit code units.
pub type MtxString = Vec<u16>;

/// The width of the integers in the header and the offset table of an `mtx` file.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum OffsetWidth {
    /// 32-bit offsets, used by the Nintendo DS and Wii releases.
    #[default]
    Bits32,
    /// 64-bit offsets.
    Bits64,
}

impl OffsetWidth {
    /// Returns the number of bytes in an offset.
    pub const fn bytes(&self) -> usize {
        match self {
            Self::Bits32 => 4,
            Self::Bits64 => 8,
        }
    }

    /// Returns the number of bits in an offset.
    pub const fn bits(&self) -> usize {
        self.bytes() * 8
    }

    /// Returns the [`OffsetWidth`] with `bits` bits, or `None` if there is none.
    pub const fn from_bits(bits: usize) -> Option<Self> {
        match bits {
            32 => Some(Self::Bits32),
            64 => Some(Self::Bits64),
            _ => None,
        }
    }

    /// Returns the largest value an offset can hold.
    const fn max(&self) -> u64 {
        match self {
            Self::Bits32 => u32::MAX as u64,
            Self::Bits64 => u64::MAX,
        }
    }

    /// Returns the size of the fixed header.
    const fn header_size(&self) -> usize {
        3 * self.bytes()
    }
}

impl fmt::Display for OffsetWidth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-bit", self.bits())
    }
}

/// An `mtx` dialog script: a list of strings of raw code units.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Mtx {
    /// The width of the offsets when encoded.
    offset_width: OffsetWidth,
    /// The strings in file order.
    strings: Vec<MtxString>,
}

impl Mtx {
    /// Creates a new [`Mtx`].
    pub fn new(offset_width: OffsetWidth, strings: Vec<MtxString>) -> Self {
        Self {
            offset_width,
            strings,
        }
    }

    /// Returns the width of the offsets when encoded.
    pub const fn offset_width(&self) -> OffsetWidth {
        self.offset_width
    }

    /// Returns the strings in file order.
    pub fn strings(&self) -> &[MtxString] {
        &self.strings
    }

    /// Consumes the [`Mtx`], returning its strings.
    pub fn into_strings(self) -> Vec<MtxString> {
        self.strings
    }
}

impl Codec for Mtx {
    type Options = OffsetWidth;

    /// Decodes an `mtx` file whose header and offsets are `offset_width` wide.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedRecord`] if the header does not match the length of
    /// `bytes` or `offset_width`, or the offset table is truncated, misaligned, or out of order.
    fn decode(bytes: &[u8], offset_width: OffsetWidth) -> Result<Self, FormatError> {
        let width = offset_width.bytes();
        let read_offset = |offset: usize| -> Result<usize, FormatError> {
            let value = parse_uint_at(bytes, offset, width).ok_or_else(|| {
                FormatError::malformed(
                    Format::Mtx,
                    format!("offset at {offset:#x} is past the end of the file"),
                )
            })?;

            usize::try_from(value).map_err(|_| {
                FormatError::malformed(Format::Mtx, format!("offset {value:#x} is too large"))
            })
        };

        let header_size = offset_width.header_size();
        if bytes.len() < header_size {
            return Err(FormatError::malformed(
                Format::Mtx,
                format!("{} bytes is too short for a {offset_width} header", bytes.len()),
            ));
        }

        let size = read_offset(0)?;
        if size != bytes.len() {
            return Err(FormatError::malformed(
                Format::Mtx,
                format!("header declares {size} bytes but the file has {}", bytes.len()),
            ));
        }

        if read_offset(width)? != 2 * width {
            return Err(FormatError::malformed(
                Format::Mtx,
                format!("not a {offset_width} mtx file, try the other offset width"),
            ));
        }

        let table_offset = read_offset(2 * width)?;
        if table_offset != header_size {
            return Err(FormatError::malformed(
                Format::Mtx,
                format!("section table at {table_offset:#x} instead of {header_size:#x}"),
            ));
        }

        // An empty script ends right after the header.
        if table_offset == bytes.len() {
            return Ok(Self::new(offset_width, Vec::new()));
        }

        let table_end = read_offset(table_offset)?;
        if table_end <= table_offset
            || table_end > bytes.len()
            || (table_end - table_offset) % width != 0
        {
            return Err(FormatError::malformed(
                Format::Mtx,
                format!("first string offset {table_end:#x} does not end the offset table"),
            ));
        }

        let mut offsets = (table_offset..table_end)
            .step_by(width)
            .map(read_offset)
            .collect::<Result<Vec<_>, _>>()?;
        offsets.push(bytes.len());

        let strings = offsets
            .windows(2)
            .map(|window| {
                let (start, end) = (window[0], window[1]);
                if end < start {
                    return Err(FormatError::malformed(
                        Format::Mtx,
                        format!("string offset {end:#x} comes before {start:#x}"),
                    ));
                }

                if (end - start) % CODE_UNIT_WIDTH != 0 {
                    return Err(FormatError::malformed(
                        Format::Mtx,
                        format!("string at {start:#x} has an odd length of {}", end - start),
                    ));
                }

                Ok((start..end)
                    .step_by(CODE_UNIT_WIDTH)
                    .filter_map(|offset| parse_u16_at(bytes, offset))
                    .collect())
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(offset_width, strings))
    }

    /// Encodes the strings in order behind a freshly computed offset table.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::ValueOutOfRange`] if the file would be too large for its offset
    /// width.
    fn encode(&self) -> Result<Vec<u8>, FormatError> {
        let width = self.offset_width.bytes();
        let header_size = self.offset_width.header_size();

        let body_size = self
            .strings
            .iter()
            .map(|string| string.len() * CODE_UNIT_WIDTH)
            .sum::<usize>();
        let size = header_size + self.strings.len() * width + body_size;

        let size_value = u64::try_from(size).unwrap_or(u64::MAX);
        if size_value > self.offset_width.max() {
            return Err(FormatError::ValueOutOfRange {
                field: "mtx size",
                value: size_value,
                max: self.offset_width.max(),
            });
        }

        let mut bytes = Vec::with_capacity(size);
        push_uint(&mut bytes, size_value, width);
        push_uint(&mut bytes, (2 * width) as u64, width);
        push_uint(&mut bytes, header_size as u64, width);

        let mut offset = header_size + self.strings.len() * width;
        for string in &self.strings {
            push_uint(&mut bytes, offset as u64, width);
            offset += string.len() * CODE_UNIT_WIDTH;
        }

        for string in &self.strings {
            bytes.extend(string.iter().flat_map(|unit| unit.to_le_bytes()));
        }

        Ok(bytes)
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// A 32-bit file holding the strings `[0, 1, 0xFFFF]` and `[0xF813, 2]`.
    const SAMPLE_MTX: &[u8] = &[
        0x22, 0x00, 0x00, 0x00, // size
        0x08, 0x00, 0x00, 0x00, // section table field
        0x0C, 0x00, 0x00, 0x00, // section table
        0x14, 0x00, 0x00, 0x00, // string 0
        0x1A, 0x00, 0x00, 0x00, // string 1
        0x00, 0x00, 0x01, 0x00, 0xFF, 0xFF, // body 0
        0x13, 0xF8, 0x02, 0x00, 0x00, 0x00, 0x00, 0x00, // body 1
    ];

    #[test]
    fn decodes_sample() {
        let mtx = Mtx::decode(SAMPLE_MTX, OffsetWidth::Bits32).unwrap();

        assert_eq!(
            mtx.strings(),
            [vec![0, 1, CONTROL_END], vec![CONTROL_ARROW, 2, 0, 0]]
        );
        assert_eq!(mtx.encode().unwrap(), SAMPLE_MTX);
    }

    #[test]
    fn round_trips_both_offset_widths() {
        for offset_width in [OffsetWidth::Bits32, OffsetWidth::Bits64] {
            let mtx = Mtx::new(
                offset_width,
                vec![vec![5, 6, CONTROL_LINE_BREAK, 7, CONTROL_END], vec![], vec![1]],
            );

            let bytes = mtx.encode().unwrap();
            assert_eq!(bytes.len(), 6 * offset_width.bytes() + 12);
            assert_eq!(Mtx::decode(&bytes, offset_width).unwrap(), mtx);
        }
    }

    #[test]
    fn round_trips_empty_scripts() {
        let mtx = Mtx::new(OffsetWidth::Bits32, Vec::new());
        let bytes = mtx.encode().unwrap();

        assert_eq!(bytes, [12, 0, 0, 0, 8, 0, 0, 0, 12, 0, 0, 0]);
        assert_eq!(Mtx::decode(&bytes, OffsetWidth::Bits32).unwrap(), mtx);
    }

    #[test]
    fn detects_wrong_offset_width() {
        let bytes = Mtx::new(OffsetWidth::Bits64, vec![vec![1, 2]]).encode().unwrap();

        assert!(matches!(
            Mtx::decode(&bytes, OffsetWidth::Bits32),
            Err(FormatError::MalformedRecord {
                format: Format::Mtx,
                ..
            })
        ));
    }

    #[test]
    fn rejects_malformed_files() {
        let mut wrong_size = SAMPLE_MTX.to_vec();
        wrong_size[0] = 0x21;

        let mut truncated_table = SAMPLE_MTX.to_vec();
        truncated_table[12] = 0x40;

        let mut misaligned_table = SAMPLE_MTX.to_vec();
        misaligned_table[12] = 0x12;

        let mut decreasing = SAMPLE_MTX.to_vec();
        decreasing[16] = 0x13;

        let mut odd_string = SAMPLE_MTX.to_vec();
        odd_string[16] = 0x19;

        let mut moved_table = SAMPLE_MTX.to_vec();
        moved_table[8] = 0x10;

        for bytes in [
            &SAMPLE_MTX[..8],
            &SAMPLE_MTX[..SAMPLE_MTX.len() - 1],
            wrong_size.as_slice(),
            truncated_table.as_slice(),
            misaligned_table.as_slice(),
            decreasing.as_slice(),
            odd_string.as_slice(),
            moved_table.as_slice(),
        ] {
            assert!(
                matches!(
                    Mtx::decode(bytes, OffsetWidth::Bits32),
                    Err(FormatError::MalformedRecord { .. })
                ),
                "{bytes:02x?}"
            );
        }
    }
}

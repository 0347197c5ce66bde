//! Errors produced while decoding, encoding, or bridging the supported formats.

use core::{error, fmt};
use std::io;

use crate::fmp::GlyphDimensions;

/// The formats handled by this crate, used to give [`FormatError`]s context.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub enum Format {
    /// The `fpd` character table.
    Fpd,
    /// The `fmp` bitmap font.
    Fmp,
    /// The `mtx` dialog script.
    Mtx,
    /// LZ11 compressed data.
    Lz11,
    /// The CSV form of an `fpd` character table.
    Csv,
    /// The UTF-16 text form of an `fpd` character table.
    Utf16Text,
    /// The XML form of an `mtx` dialog script.
    Xml,
    /// The sheet form of an `fmp` bitmap font.
    Sheet,
}

impl Format {
    /// Returns the textual representation of the [`Format`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Fpd => "fpd",
            Self::Fmp => "fmp",
            Self::Mtx => "mtx",
            Self::Lz11 => "lz11",
            Self::Csv => "csv",
            Self::Utf16Text => "utf-16 text",
            Self::Xml => "xml",
            Self::Sheet => "glyph sheet",
        }
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Various errors that can occur while converting between formats.
///
/// Every conversion is all-or-nothing: the first error aborts the whole conversion.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum FormatError {
    /// The binary data violates the structure or length rules of its [`Format`].
    MalformedRecord {
        /// The [`Format`] being decoded.
        format: Format,
        /// What exactly was wrong.
        reason: String,
    },
    /// A numeric field does not fit into its on-disk bit width.
    ValueOutOfRange {
        /// The name of the field.
        field: &'static str,
        /// The offending value.
        value: u64,
        /// The largest value the field can hold.
        max: u64,
    },
    /// The character cannot be stored in a 16-bit code unit.
    UnsupportedCharacter(char),
    /// The character has no entry in the bound character table.
    UnmappableCharacter(char),
    /// An index refers past the end of the bound character table.
    IndexOutOfRange {
        /// The offending index.
        index: usize,
        /// The number of entries in the character table.
        len: usize,
    },
    /// A glyph does not have the dimensions declared for its table.
    DimensionMismatch {
        /// The ordinal of the offending glyph.
        ordinal: usize,
        /// The dimensions declared for the table.
        expected: GlyphDimensions,
        /// The dimensions of the glyph.
        found: GlyphDimensions,
    },
    /// An editable intermediate form is structurally invalid.
    IrValidation {
        /// The intermediate [`Format`] being read.
        format: Format,
        /// What exactly was wrong.
        reason: String,
    },
}

impl FormatError {
    /// Creates a [`FormatError::MalformedRecord`].
    pub(crate) fn malformed(format: Format, reason: impl Into<String>) -> Self {
        Self::MalformedRecord {
            format,
            reason: reason.into(),
        }
    }

    /// Creates a [`FormatError::IrValidation`].
    pub(crate) fn invalid_ir(format: Format, reason: impl Into<String>) -> Self {
        Self::IrValidation {
            format,
            reason: reason.into(),
        }
    }
}

impl fmt::Display for FormatError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedRecord { format, reason } => {
                write!(f, "malformed {format} data: {reason}")
            }
            Self::ValueOutOfRange { field, value, max } => {
                write!(f, "{field} {value:#x} does not fit (maximum is {max:#x})")
            }
            Self::UnsupportedCharacter(c) => write!(
                f,
                "character {c:?} (U+{:04X}) is outside the Basic Multilingual Plane",
                u32::from(*c)
            ),
            Self::UnmappableCharacter(c) => write!(
                f,
                "character {c:?} (U+{:04X}) is not in the character table",
                u32::from(*c)
            ),
            Self::IndexOutOfRange { index, len } => write!(
                f,
                "character index {index} is out of range for a table of {len} entries"
            ),
            Self::DimensionMismatch {
                ordinal,
                expected,
                found,
            } => write!(f, "glyph {ordinal} is {found} but the table expects {expected}"),
            Self::IrValidation { format, reason } => write!(f, "invalid {format}: {reason}"),
        }
    }
}

impl error::Error for FormatError {}

/// Various errors that can occur while reading from a byte source or writing to a byte sink.
#[derive(Debug)]
pub enum StreamError {
    /// The underlying reader or writer failed.
    Io(io::Error),
    /// The bytes could not be converted.
    Format(FormatError),
}

impl From<io::Error> for StreamError {
    fn from(value: io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<FormatError> for StreamError {
    fn from(value: FormatError) -> Self {
        Self::Format(value)
    }
}

impl fmt::Display for StreamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(error) => write!(f, "i/o error: {error}"),
            Self::Format(error) => fmt::Display::fmt(error, f),
        }
    }
}

impl error::Error for StreamError {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Self::Io(error) => Some(error),
            Self::Format(error) => Some(error),
        }
    }
}

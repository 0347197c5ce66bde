//! The UTF-16 little-endian text form of an [`FpdIndex`].

use std::collections::HashSet;

use crate::{
    error::{Format, FormatError},
    fpd::FpdIndex,
};

/// The byte order mark that UTF-16 little-endian text files start with.
pub const BOM_UTF16_LE: [u8; 2] = [0xFF, 0xFE];

impl FpdIndex {
    /// Builds a new [`FpdIndex`] from a UTF-16 little-endian text file, giving every character
    /// `width`.
    ///
    /// Characters are deduplicated in first-occurrence order.
    ///
    /// # Errors
    ///
    /// - [`FormatError::IrValidation`]: Returned if `text` does not start with
    ///     [`BOM_UTF16_LE`], has an odd length, or holds an unpaired surrogate.
    /// - [`FormatError::UnsupportedCharacter`]: Returned if a character lies outside the Basic
    ///     Multilingual Plane.
    pub fn from_utf16_text(text: &[u8], width: u8) -> Result<Self, FormatError> {
        let characters = decode_characters(text)?;

        Self::from_characters(characters.into_iter().map(|character| (character, width)))
    }

    /// Reads a UTF-16 little-endian text file as a character table, with the character at
    /// position `n` becoming index `n`.
    ///
    /// # Errors
    ///
    /// - [`FormatError::IrValidation`]: Returned if `text` does not start with
    ///     [`BOM_UTF16_LE`], has an odd length, holds an unpaired surrogate, or repeats a
    ///     character.
    /// - [`FormatError::UnsupportedCharacter`]: Returned if a character lies outside the Basic
    ///     Multilingual Plane.
    pub fn from_utf16_table(text: &[u8], width: u8) -> Result<Self, FormatError> {
        let characters = decode_characters(text)?;

        let mut seen = HashSet::with_capacity(characters.len());
        for (position, &character) in characters.iter().enumerate() {
            if !seen.insert(character) {
                return Err(FormatError::invalid_ir(
                    Format::Utf16Text,
                    format!("character {character:?} repeats at position {position}"),
                ));
            }
        }

        Self::from_characters(characters.into_iter().map(|character| (character, width)))
    }

    /// Writes the code units of this [`FpdIndex`] as a UTF-16 little-endian text file, starting
    /// with [`BOM_UTF16_LE`].
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::IrValidation`] if an entry holds a lone surrogate or repeats an
    /// earlier code point, neither of which the text form can hold.
    pub fn to_utf16_text(&self) -> Result<Vec<u8>, FormatError> {
        let mut text = Vec::with_capacity(2 + self.len() * 2);
        text.extend_from_slice(&BOM_UTF16_LE);

        for (index, entry) in self.iter().enumerate() {
            if entry.character().is_none() {
                return Err(FormatError::invalid_ir(
                    Format::Utf16Text,
                    format!("lone surrogate {:#06X} at index {index}", entry.code_point()),
                ));
            }
            if !self.is_canonical(index) {
                return Err(FormatError::invalid_ir(
                    Format::Utf16Text,
                    format!("code point {:#06X} repeats at index {index}", entry.code_point()),
                ));
            }

            text.extend(entry.code_point().to_le_bytes());
        }

        Ok(text)
    }
}

/// Decodes the characters of a UTF-16 little-endian text file that starts with
/// [`BOM_UTF16_LE`].
fn decode_characters(text: &[u8]) -> Result<Vec<char>, FormatError> {
    let Some(body) = text.strip_prefix(&BOM_UTF16_LE) else {
        return Err(FormatError::invalid_ir(
            Format::Utf16Text,
            "missing the UTF-16 little-endian byte order mark",
        ));
    };

    if body.len() % 2 != 0 {
        return Err(FormatError::invalid_ir(
            Format::Utf16Text,
            format!("odd byte length {} after the byte order mark", body.len()),
        ));
    }

    let units = body
        .chunks_exact(2)
        .map(|unit| u16::from_le_bytes([unit[0], unit[1]]));

    char::decode_utf16(units)
        .map(|character| {
            character.map_err(|error| {
                FormatError::invalid_ir(
                    Format::Utf16Text,
                    format!("unpaired surrogate {:#06X}", error.unpaired_surrogate()),
                )
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{codec::Codec, fpd::tests::SAMPLE_FPD};

    /// Encodes `text` as UTF-16 little-endian, prefixed with a byte order mark.
    fn utf16(text: &str) -> Vec<u8> {
        BOM_UTF16_LE
            .into_iter()
            .chain(text.encode_utf16().flat_map(u16::to_le_bytes))
            .collect()
    }

    #[test]
    fn creates_sample_table() {
        let text = utf16("ABC123波泼摸佛一二三らりるれろラリルレロ");
        let index = FpdIndex::from_utf16_text(&text, 0).unwrap();

        assert_eq!(index.encode().unwrap(), SAMPLE_FPD);
        assert_eq!(index.len(), 23);
        assert_eq!(index.to_utf16_text().unwrap(), text);
    }

    #[test]
    fn deduplicates_repeated_characters() {
        let index = FpdIndex::from_utf16_text(&utf16("ABA"), 4).unwrap();

        assert_eq!(index.to_string_lossy(), "AB");
        assert!(index.iter().all(|entry| entry.width() == 4));
    }

    #[test]
    fn requires_byte_order_mark() {
        let text = "ABC".encode_utf16().flat_map(u16::to_le_bytes).collect::<Vec<_>>();

        assert!(matches!(
            FpdIndex::from_utf16_text(&text, 0),
            Err(FormatError::IrValidation {
                format: Format::Utf16Text,
                ..
            })
        ));
    }

    #[test]
    fn rejects_unencodable_text() {
        assert_eq!(
            FpdIndex::from_utf16_text(&utf16("A😀"), 0),
            Err(FormatError::UnsupportedCharacter('😀'))
        );
        assert!(matches!(
            FpdIndex::from_utf16_text(&[0xFF, 0xFE, 0x00, 0xD8], 0),
            Err(FormatError::IrValidation { .. })
        ));
        assert_eq!(
            FpdIndex::from_utf16_text(&[0xFF, 0xFE, 0x41], 0),
            Err(FormatError::invalid_ir(
                Format::Utf16Text,
                "odd byte length 1 after the byte order mark"
            ))
        );
    }

    #[test]
    fn refuses_tables_the_text_form_cannot_hold() {
        let repeated = FpdIndex::decode(&[0x41, 0, 0, 0x42, 0, 0, 0x41, 0, 0, 0x43, 0, 0], ())
            .unwrap();
        assert!(matches!(
            repeated.to_utf16_text(),
            Err(FormatError::IrValidation {
                format: Format::Utf16Text,
                ..
            })
        ));

        let surrogate = FpdIndex::decode(&[0x41, 0, 0, 0x00, 0xD8, 0], ()).unwrap();
        assert!(matches!(
            surrogate.to_utf16_text(),
            Err(FormatError::IrValidation {
                format: Format::Utf16Text,
                ..
            })
        ));
    }

    #[test]
    fn reads_tables_position_for_position() {
        let index = FpdIndex::from_utf16_table(&utf16("ABC"), 0).unwrap();
        assert_eq!(index.index_of('C'), Some(2));
        assert_eq!(
            FpdIndex::from_utf16_table(&index.to_utf16_text().unwrap(), 0).unwrap(),
            index
        );

        assert!(matches!(
            FpdIndex::from_utf16_table(&utf16("ABAC"), 0),
            Err(FormatError::IrValidation {
                format: Format::Utf16Text,
                ..
            })
        ));
    }
}

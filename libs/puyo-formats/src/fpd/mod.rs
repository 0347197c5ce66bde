//! The `fpd` character table.
//!
//! An `fpd` file is a header-less sequence of 3 byte records, `XX XX YY`, where `XX XX` is a
//! UTF-16 code unit in little-endian order and `YY` is the width of the character. The position
//! of a record in the file is the index that `mtx` scripts and `fmp` glyphs refer to.

use std::collections::{HashMap, hash_map::Entry};

use crate::{
    codec::{Codec, records},
    error::{Format, FormatError},
};

pub mod csv;
pub mod text;

/// The number of bytes in a single `fpd` record.
pub const RECORD_SIZE: usize = 3;

/// A single `fpd` record: a character and the width with which it is drawn.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct CharacterEntry {
    /// The UTF-16 code unit of the character.
    code_point: u16,
    /// The width of the character, only used by the Nintendo DS releases.
    width: u8,
}

impl CharacterEntry {
    /// Creates a new [`CharacterEntry`].
    pub const fn new(code_point: u16, width: u8) -> Self {
        Self { code_point, width }
    }

    /// Creates a new [`CharacterEntry`] from values that may not fit the on-disk fields.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::ValueOutOfRange`] if `code_point` does not fit into 16 bits or
    /// `width` does not fit into 8 bits.
    pub fn try_new(code_point: u32, width: u32) -> Result<Self, FormatError> {
        let code_point = u16::try_from(code_point).map_err(|_| FormatError::ValueOutOfRange {
            field: "code point",
            value: u64::from(code_point),
            max: u64::from(u16::MAX),
        })?;
        let width = u8::try_from(width).map_err(|_| FormatError::ValueOutOfRange {
            field: "width",
            value: u64::from(width),
            max: u64::from(u8::MAX),
        })?;

        Ok(Self::new(code_point, width))
    }

    /// Creates a new [`CharacterEntry`] for `character`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedCharacter`] if `character` lies outside the Basic
    /// Multilingual Plane and would need a surrogate pair.
    pub fn from_char(character: char, width: u8) -> Result<Self, FormatError> {
        let code_point = u16::try_from(u32::from(character))
            .map_err(|_| FormatError::UnsupportedCharacter(character))?;

        Ok(Self::new(code_point, width))
    }

    /// Returns the UTF-16 code unit of this [`CharacterEntry`].
    pub const fn code_point(&self) -> u16 {
        self.code_point
    }

    /// Returns the width of this [`CharacterEntry`].
    pub const fn width(&self) -> u8 {
        self.width
    }

    /// Returns the character of this [`CharacterEntry`], or `None` if the code unit is a lone
    /// surrogate half.
    pub fn character(&self) -> Option<char> {
        char::from_u32(u32::from(self.code_point))
    }

    /// Decodes a single record.
    fn decode(record: &[u8; RECORD_SIZE]) -> Self {
        Self::new(u16::from_le_bytes([record[0], record[1]]), record[2])
    }

    /// Encodes this [`CharacterEntry`] into a single record.
    fn encode(&self) -> [u8; RECORD_SIZE] {
        let [low, high] = self.code_point.to_le_bytes();
        [low, high, self.width]
    }
}

/// An ordered `fpd` character table.
///
/// Entries are never deduplicated: two entries may share a code point. Looking up an index by
/// code point resolves to the lowest index among such duplicates, while looking up an entry by
/// index stays exact for every position.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FpdIndex {
    /// The entries in on-disk order.
    entries: Vec<CharacterEntry>,
    /// Maps a code point to the lowest index holding it.
    lookup: HashMap<u16, usize>,
}

impl FpdIndex {
    /// Creates a new [`FpdIndex`] holding `entries` in the given order.
    pub fn from_entries(entries: Vec<CharacterEntry>) -> Self {
        let mut lookup = HashMap::with_capacity(entries.len());
        for (index, entry) in entries.iter().enumerate() {
            lookup.entry(entry.code_point).or_insert(index);
        }

        Self { entries, lookup }
    }

    /// Builds a new [`FpdIndex`] from a sequence of characters and their widths.
    ///
    /// Each distinct character becomes one entry in first-occurrence order; the width recorded
    /// with its first occurrence wins.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedCharacter`] if a character lies outside the Basic
    /// Multilingual Plane.
    pub fn from_characters<I: IntoIterator<Item = (char, u8)>>(
        characters: I,
    ) -> Result<Self, FormatError> {
        let mut entries = Vec::new();
        let mut lookup = HashMap::new();

        for (character, width) in characters {
            let entry = CharacterEntry::from_char(character, width)?;
            if let Entry::Vacant(vacant) = lookup.entry(entry.code_point) {
                vacant.insert(entries.len());
                entries.push(entry);
            }
        }

        Ok(Self { entries, lookup })
    }

    /// Builds a new [`FpdIndex`] from the characters of `text`, all drawn with `width`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::UnsupportedCharacter`] if a character lies outside the Basic
    /// Multilingual Plane.
    pub fn from_text(text: &str, width: u8) -> Result<Self, FormatError> {
        Self::from_characters(text.chars().map(|character| (character, width)))
    }

    /// Returns the number of entries in this [`FpdIndex`].
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` if this [`FpdIndex`] has no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the [`CharacterEntry`] at `index`, or `None` if out of bounds.
    pub fn get(&self, index: usize) -> Option<CharacterEntry> {
        self.entries.get(index).copied()
    }

    /// Returns every [`CharacterEntry`] in index order.
    pub fn entries(&self) -> &[CharacterEntry] {
        &self.entries
    }

    /// Returns an [`Iterator`] over the entries in index order.
    pub fn iter(&self) -> impl Iterator<Item = CharacterEntry> + '_ {
        self.entries.iter().copied()
    }

    /// Returns the lowest index whose entry holds `code_point`.
    pub fn index_of_code_point(&self, code_point: u16) -> Option<usize> {
        self.lookup.get(&code_point).copied()
    }

    /// Returns the lowest index whose entry holds `character`.
    pub fn index_of(&self, character: char) -> Option<usize> {
        let code_point = u16::try_from(u32::from(character)).ok()?;
        self.index_of_code_point(code_point)
    }

    /// Returns `true` if `index` is the lowest index holding its code point, meaning that the
    /// entry can be addressed by code point.
    pub fn is_canonical(&self, index: usize) -> bool {
        self.get(index)
            .is_some_and(|entry| self.index_of_code_point(entry.code_point) == Some(index))
    }

    /// Returns the characters of the table in index order, with lone surrogates replaced by
    /// [`char::REPLACEMENT_CHARACTER`].
    pub fn to_string_lossy(&self) -> String {
        self.iter()
            .map(|entry| entry.character().unwrap_or(char::REPLACEMENT_CHARACTER))
            .collect()
    }
}

impl Codec for FpdIndex {
    type Options = ();

    /// Decodes an `fpd` file, assigning indices in stream order.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedRecord`] if the length of `bytes` is not a multiple of
    /// [`RECORD_SIZE`].
    fn decode(bytes: &[u8], (): ()) -> Result<Self, FormatError> {
        let records = records::<RECORD_SIZE>(bytes).ok_or_else(|| {
            FormatError::malformed(
                Format::Fpd,
                format!("length {} is not a multiple of {RECORD_SIZE}", bytes.len()),
            )
        })?;

        Ok(Self::from_entries(records.map(CharacterEntry::decode).collect()))
    }

    /// Encodes every entry as a 3 byte record, in index order.
    ///
    /// The fields of a [`CharacterEntry`] are range checked on construction, so encoding
    /// never fails.
    fn encode(&self) -> Result<Vec<u8>, FormatError> {
        Ok(self.entries.iter().flat_map(CharacterEntry::encode).collect())
    }
}

impl<'a> IntoIterator for &'a FpdIndex {
    type Item = CharacterEntry;
    type IntoIter = core::iter::Copied<core::slice::Iter<'a, CharacterEntry>>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter().copied()
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// `ABC123波泼摸佛一二三らりるれろラリルレロ` with zero widths.
    pub(crate) const SAMPLE_FPD: &[u8] = b"A\x00\x00B\x00\x00C\x00\x001\x00\x002\x00\x003\x00\x00\
        \xe2l\x00\xfcl\x00xd\x00[O\x00\x00N\x00\x8cN\x00\tN\x00\
        \x890\x00\x8a0\x00\x8b0\x00\x8c0\x00\x8d0\x00\
        \xe90\x00\xea0\x00\xeb0\x00\xec0\x00\xed0\x00";

    #[test]
    fn encodes_duplicates_positionally() {
        let index = FpdIndex::from_entries(vec![
            CharacterEntry::new(u16::from(b'A'), 5),
            CharacterEntry::new(u16::from(b'B'), 6),
            CharacterEntry::new(u16::from(b'A'), 7),
        ]);

        let bytes = index.encode().unwrap();
        assert_eq!(bytes, [0x41, 0x00, 0x05, 0x42, 0x00, 0x06, 0x41, 0x00, 0x07]);

        let decoded = FpdIndex::decode(&bytes, ()).unwrap();
        assert_eq!(decoded, index);
        assert_eq!(decoded.len(), 3);
        assert_eq!(decoded.index_of('A'), Some(0));
        assert_eq!(decoded.get(2), Some(CharacterEntry::new(u16::from(b'A'), 7)));
        assert!(decoded.is_canonical(0));
        assert!(!decoded.is_canonical(2));
    }

    #[test]
    fn decodes_sample_table() {
        let index = FpdIndex::decode(SAMPLE_FPD, ()).unwrap();

        assert_eq!(index.len(), 23);
        assert_eq!(index.to_string_lossy(), "ABC123波泼摸佛一二三らりるれろラリルレロ");
        assert_eq!(index.index_of('ら'), Some(13));
        assert_eq!(index.index_of('z'), None);
        assert_eq!(index.encode().unwrap(), SAMPLE_FPD);
    }

    #[test]
    fn rejects_partial_records() {
        for length in [1, 2, 4, 5, 31] {
            let error = FpdIndex::decode(&vec![0; length], ()).unwrap_err();
            assert!(matches!(
                error,
                FormatError::MalformedRecord {
                    format: Format::Fpd,
                    ..
                }
            ));
        }

        assert!(FpdIndex::decode(&[], ()).unwrap().is_empty());
    }

    #[test]
    fn duplicate_lookup_resolves_to_lowest_index() {
        let index = FpdIndex::from_entries(
            "abXcdX"
                .chars()
                .map(|c| CharacterEntry::from_char(c, 0).unwrap())
                .collect(),
        );

        assert_eq!(index.index_of('X'), Some(2));
        assert_eq!(index.get(5).and_then(|entry| entry.character()), Some('X'));
    }

    #[test]
    fn builds_from_text_in_first_occurrence_order() {
        let index = FpdIndex::from_characters([('b', 1), ('a', 2), ('b', 3)]).unwrap();

        assert_eq!(
            index.entries(),
            [
                CharacterEntry::new(u16::from(b'b'), 1),
                CharacterEntry::new(u16::from(b'a'), 2),
            ]
        );
    }

    #[test]
    fn rejects_supplementary_plane_characters() {
        assert_eq!(
            FpdIndex::from_text("A😀", 0),
            Err(FormatError::UnsupportedCharacter('😀'))
        );
    }

    #[test]
    fn range_checks_entry_fields() {
        assert_eq!(
            CharacterEntry::try_new(0x1_0000, 0),
            Err(FormatError::ValueOutOfRange {
                field: "code point",
                value: 0x1_0000,
                max: 0xFFFF,
            })
        );
        assert!(matches!(
            CharacterEntry::try_new(0x41, 0x100),
            Err(FormatError::ValueOutOfRange { field: "width", .. })
        ));
        assert_eq!(
            CharacterEntry::try_new(0xFFFF, 0xFF),
            Ok(CharacterEntry::new(0xFFFF, 0xFF))
        );
    }

    #[test]
    fn keeps_lone_surrogates() {
        let index = FpdIndex::decode(&[0x00, 0xD8, 0x02], ()).unwrap();

        assert_eq!(index.get(0).and_then(|entry| entry.character()), None);
        assert_eq!(index.index_of_code_point(0xD800), Some(0));
        assert_eq!(index.encode().unwrap(), [0x00, 0xD8, 0x02]);
    }
}

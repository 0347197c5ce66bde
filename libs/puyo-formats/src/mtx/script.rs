//! Resolution of `mtx` code units against an `fpd` character table.

use crate::{
    error::FormatError,
    fpd::FpdIndex,
    mtx::{CONTROL_ARROW, CONTROL_CODE_START, CONTROL_END, CONTROL_LINE_BREAK, Mtx, OffsetWidth},
};

/// A single resolved code unit of a dialog.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub enum Token {
    /// A character, stored as the lowest index holding it.
    Text(char),
    /// An explicit character index, used when the entry cannot be addressed by its character.
    Glyph(usize),
    /// Waits for the player to press a button.
    Arrow,
    /// Starts a new line.
    LineBreak,
    /// Ends the dialog.
    End,
    /// A control code without a known meaning.
    Control(u16),
    /// A code unit after a [`Token::End`] that the table does not hold, kept as written.
    Raw(u16),
}

impl Token {
    /// Resolves `unit` against `fpd`, with `trailing` set once the dialog has ended.
    fn resolve(unit: u16, fpd: &FpdIndex, trailing: bool) -> Result<Self, FormatError> {
        let token = match unit {
            CONTROL_ARROW => Self::Arrow,
            CONTROL_LINE_BREAK => Self::LineBreak,
            CONTROL_END => Self::End,
            CONTROL_CODE_START.. => Self::Control(unit),
            _ if trailing && usize::from(unit) >= fpd.len() => Self::Raw(unit),
            _ => {
                let index = usize::from(unit);
                let entry = fpd.get(index).ok_or(FormatError::IndexOutOfRange {
                    index,
                    len: fpd.len(),
                })?;

                match entry.character() {
                    Some(character) if fpd.is_canonical(index) && is_text_safe(character) => {
                        Self::Text(character)
                    }
                    _ => Self::Glyph(index),
                }
            }
        };

        Ok(token)
    }

    /// Turns this [`Token`] back into a code unit using `fpd`.
    fn compile(&self, fpd: &FpdIndex) -> Result<u16, FormatError> {
        let index = match *self {
            Self::Arrow => return Ok(CONTROL_ARROW),
            Self::LineBreak => return Ok(CONTROL_LINE_BREAK),
            Self::End => return Ok(CONTROL_END),
            Self::Control(unit) | Self::Raw(unit) => return Ok(unit),
            Self::Text(character) => fpd
                .index_of(character)
                .ok_or(FormatError::UnmappableCharacter(character))?,
            Self::Glyph(index) => index,
        };

        u16::try_from(index)
            .ok()
            .filter(|&unit| unit < CONTROL_CODE_START && index < fpd.len())
            .ok_or(FormatError::IndexOutOfRange {
                index,
                len: fpd.len(),
            })
    }
}

/// Returns `true` if `character` can be written as plain text in a dialog without being confused
/// with a [`Token::LineBreak`] or rejected by XML.
fn is_text_safe(character: char) -> bool {
    match character {
        '\t' => true,
        '\u{FFFE}' | '\u{FFFF}' => false,
        _ => !character.is_control(),
    }
}

/// A dialog: the resolved tokens of one `mtx` string.
pub type Dialog = Vec<Token>;

/// An `mtx` dialog script with its character indices resolved.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct Script {
    /// The width of the offsets of the `mtx` file.
    offset_width: OffsetWidth,
    /// The dialogs in file order.
    dialogs: Vec<Dialog>,
}

impl Script {
    /// Creates a new [`Script`].
    pub fn new(offset_width: OffsetWidth, dialogs: Vec<Dialog>) -> Self {
        Self {
            offset_width,
            dialogs,
        }
    }

    /// Resolves every code unit of `mtx` against `fpd`.
    ///
    /// Nothing is dropped: code units after a [`Token::End`] are kept, and entries that cannot
    /// round trip through their character become [`Token::Glyph`]s. Past the end of a dialog,
    /// code units the table does not hold become [`Token::Raw`].
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::IndexOutOfRange`] if a code unit before the end of its dialog
    /// refers past the end of `fpd`.
    pub fn resolve(mtx: &Mtx, fpd: &FpdIndex) -> Result<Self, FormatError> {
        let dialogs = mtx
            .strings()
            .iter()
            .map(|string| {
                let mut trailing = false;
                string
                    .iter()
                    .map(|&unit| -> Result<Token, FormatError> {
                        let token = Token::resolve(unit, fpd, trailing)?;
                        trailing |= token == Token::End;
                        Ok(token)
                    })
                    .collect::<Result<Dialog, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::new(mtx.offset_width(), dialogs))
    }

    /// Turns every token back into a code unit using `fpd`.
    ///
    /// Characters shared by several entries compile to the lowest index holding them.
    ///
    /// # Errors
    ///
    /// - [`FormatError::UnmappableCharacter`]: Returned if a character is not in `fpd`.
    /// - [`FormatError::IndexOutOfRange`]: Returned if a [`Token::Glyph`] refers past the end
    ///     of `fpd`, or an index collides with the control code range.
    pub fn compile(&self, fpd: &FpdIndex) -> Result<Mtx, FormatError> {
        let strings = self
            .dialogs
            .iter()
            .map(|dialog| {
                dialog
                    .iter()
                    .map(|token| token.compile(fpd))
                    .collect::<Result<Vec<_>, _>>()
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Mtx::new(self.offset_width, strings))
    }

    /// Returns the width of the offsets of the `mtx` file.
    pub const fn offset_width(&self) -> OffsetWidth {
        self.offset_width
    }

    /// Returns the dialogs in file order.
    pub fn dialogs(&self) -> &[Dialog] {
        &self.dialogs
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{codec::Codec, fpd::CharacterEntry};

    /// A table where `X` appears at indices 2 and 5.
    fn table() -> FpdIndex {
        FpdIndex::from_entries(
            "abXcdX\n"
                .chars()
                .map(|c| CharacterEntry::from_char(c, 0).unwrap())
                .collect(),
        )
    }

    #[test]
    fn duplicates_compile_to_lowest_index() {
        let script = Script::new(
            OffsetWidth::Bits32,
            vec![vec![Token::Text('X'), Token::Text('a'), Token::Text('X')]],
        );

        let mtx = script.compile(&table()).unwrap();
        assert_eq!(mtx.strings(), [vec![2_u16, 0, 2]]);
    }

    #[test]
    fn resolves_controls_and_characters() {
        let mtx = Mtx::new(
            OffsetWidth::Bits32,
            vec![vec![0, CONTROL_ARROW, 1, CONTROL_LINE_BREAK, 0xF883, CONTROL_END, 3]],
        );

        let script = Script::resolve(&mtx, &table()).unwrap();
        assert_eq!(
            script.dialogs(),
            [vec![
                Token::Text('a'),
                Token::Arrow,
                Token::Text('b'),
                Token::LineBreak,
                Token::Control(0xF883),
                Token::End,
                Token::Text('c'),
            ]]
        );
        assert_eq!(script.compile(&table()).unwrap(), mtx);
    }

    #[test]
    fn keeps_entries_that_text_cannot_address() {
        let mtx = Mtx::new(OffsetWidth::Bits64, vec![vec![5, 2, 6]]);

        let script = Script::resolve(&mtx, &table()).unwrap();
        assert_eq!(
            script.dialogs(),
            [vec![Token::Glyph(5), Token::Text('X'), Token::Glyph(6)]]
        );
        assert_eq!(script.compile(&table()).unwrap(), mtx);
    }

    #[test]
    fn rejects_dangling_indices() {
        let mtx = Mtx::new(OffsetWidth::Bits32, vec![vec![0, 7]]);

        assert_eq!(
            Script::resolve(&mtx, &table()),
            Err(FormatError::IndexOutOfRange { index: 7, len: 7 })
        );

        let script = Script::new(OffsetWidth::Bits32, vec![vec![Token::Glyph(100)]]);
        assert_eq!(
            script.compile(&table()),
            Err(FormatError::IndexOutOfRange {
                index: 100,
                len: 7,
            })
        );
    }

    #[test]
    fn rejects_unmappable_characters() {
        let script = Script::new(OffsetWidth::Bits32, vec![vec![Token::Text('z')]]);

        assert_eq!(
            script.compile(&table()),
            Err(FormatError::UnmappableCharacter('z'))
        );
    }

    #[test]
    fn binary_round_trip_through_script() {
        let mtx = Mtx::new(
            OffsetWidth::Bits32,
            vec![vec![4, 3, CONTROL_END, 0, 0], vec![CONTROL_ARROW]],
        );
        let bytes = mtx.encode().unwrap();

        let script = Script::resolve(&Mtx::decode(&bytes, OffsetWidth::Bits32).unwrap(), &table())
            .unwrap();
        assert_eq!(script.compile(&table()).unwrap().encode().unwrap(), bytes);
    }

    #[test]
    fn keeps_trailing_units_the_table_does_not_hold() {
        let mtx = Mtx::new(OffsetWidth::Bits32, vec![vec![0, CONTROL_END, 0x0100, 1, 0x7FFF]]);

        let script = Script::resolve(&mtx, &table()).unwrap();
        assert_eq!(
            script.dialogs(),
            [vec![
                Token::Text('a'),
                Token::End,
                Token::Raw(0x0100),
                Token::Text('b'),
                Token::Raw(0x7FFF),
            ]]
        );
        assert_eq!(script.compile(&table()).unwrap(), mtx);

        let unended = Mtx::new(OffsetWidth::Bits32, vec![vec![0x0100, CONTROL_END]]);
        assert_eq!(
            Script::resolve(&unended, &table()),
            Err(FormatError::IndexOutOfRange {
                index: 0x0100,
                len: 7,
            })
        );
    }
}

//! The CSV form of an [`FpdIndex`], the human-editable source used to create `fpd` files.
//!
//! Every row holds one entry in index order, duplicates included:
//!
//! ```text
//! code_point,width
//! A,0x5
//! ",",0x3
//! U+D800,0x0
//! ```
//!
//! Lone surrogate halves and control characters cannot sit in a text cell, so they are written
//! as `U+XXXX`. Widths are hexadecimal with an optional `0x` prefix.

use crate::{
    error::{Format, FormatError},
    fpd::{CharacterEntry, FpdIndex},
};

/// The header row every CSV character table starts with.
pub const HEADER: [&str; 2] = ["code_point", "width"];

/// The line terminator written after every row.
const LINE_TERMINATOR: &str = "\r\n";

impl FpdIndex {
    /// Writes this [`FpdIndex`] as a CSV character table.
    pub fn to_csv(&self) -> String {
        let mut csv = String::with_capacity((self.len() + 1) * 12);
        csv.push_str(&HEADER.join(","));
        csv.push_str(LINE_TERMINATOR);

        for entry in self {
            push_field(&mut csv, &format_code_point(entry.code_point()));
            csv.push_str(&format!(",{:#x}{LINE_TERMINATOR}", entry.width()));
        }

        csv
    }

    /// Reads a CSV character table, keeping every row as its own entry.
    ///
    /// # Errors
    ///
    /// - [`FormatError::IrValidation`]: Returned if the header is missing or wrong, a row does
    ///     not have exactly two columns, a quote is left open, or a cell cannot be parsed.
    /// - [`FormatError::UnsupportedCharacter`]: Returned if a character lies outside the Basic
    ///     Multilingual Plane.
    /// - [`FormatError::ValueOutOfRange`]: Returned if a width does not fit into 8 bits.
    pub fn from_csv(csv: &str) -> Result<Self, FormatError> {
        let csv = csv.strip_prefix('\u{FEFF}').unwrap_or(csv);
        let mut rows = parse_rows(csv)?.into_iter();

        match rows.next() {
            Some((_, header)) if header == HEADER => {}
            _ => {
                return Err(FormatError::invalid_ir(
                    Format::Csv,
                    format!("expected the header {}", HEADER.join(",")),
                ));
            }
        }

        let entries = rows
            .map(|(line, row)| {
                let [code_point, width] = <[String; 2]>::try_from(row).map_err(|row| {
                    FormatError::invalid_ir(
                        Format::Csv,
                        format!("line {line} has {} columns instead of 2", row.len()),
                    )
                })?;

                let code_point = parse_code_point(&code_point, line)?;
                let width = parse_width(&width, line)?;
                CharacterEntry::try_new(u32::from(code_point), width)
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self::from_entries(entries))
    }
}

/// Returns the cell text for `code_point`.
fn format_code_point(code_point: u16) -> String {
    match char::from_u32(u32::from(code_point)) {
        Some(character) if !character.is_control() => character.to_string(),
        _ => format!("U+{code_point:04X}"),
    }
}

/// Appends `field` to `csv`, quoting it if required.
fn push_field(csv: &mut String, field: &str) {
    if field.contains([',', '"', '\r', '\n']) {
        csv.push('"');
        csv.push_str(&field.replace('"', "\"\""));
        csv.push('"');
    } else {
        csv.push_str(field);
    }
}

/// Parses the `code_point` cell on `line`.
fn parse_code_point(field: &str, line: usize) -> Result<u16, FormatError> {
    let mut characters = field.chars();
    if let (Some(character), None) = (characters.next(), characters.next()) {
        return CharacterEntry::from_char(character, 0).map(|entry| entry.code_point());
    }

    field
        .strip_prefix("U+")
        .filter(|digits| digits.len() == 4)
        .and_then(|digits| u16::from_str_radix(digits, 16).ok())
        .ok_or_else(|| {
            FormatError::invalid_ir(
                Format::Csv,
                format!("line {line}: {field:?} is neither a single character nor U+XXXX"),
            )
        })
}

/// Parses the hexadecimal `width` cell on `line`.
fn parse_width(field: &str, line: usize) -> Result<u32, FormatError> {
    let digits = field.trim();
    let digits = digits
        .strip_prefix("0x")
        .or_else(|| digits.strip_prefix("0X"))
        .unwrap_or(digits);

    u32::from_str_radix(digits, 16).map_err(|_| {
        FormatError::invalid_ir(
            Format::Csv,
            format!("line {line}: {field:?} is not a hexadecimal width"),
        )
    })
}

/// Splits `csv` into rows of unquoted fields, each paired with the line it started on.
///
/// Blank lines are skipped.
fn parse_rows(csv: &str) -> Result<Vec<(usize, Vec<String>)>, FormatError> {
    let mut rows = Vec::new();
    let mut row = Vec::new();
    let mut field = String::new();

    let mut line = 1;
    let mut row_line = 1;
    let mut quoted = false;
    let mut in_row = false;

    let mut characters = csv.chars().peekable();
    while let Some(character) = characters.next() {
        if character == '\n' {
            line += 1;
        }

        if quoted {
            match character {
                '"' if characters.peek() == Some(&'"') => {
                    characters.next();
                    field.push('"');
                }
                '"' => quoted = false,
                _ => field.push(character),
            }
            continue;
        }

        match character {
            '"' if field.is_empty() => {
                quoted = true;
                in_row = true;
            }
            ',' => {
                row.push(core::mem::take(&mut field));
                in_row = true;
            }
            '\r' if characters.peek() == Some(&'\n') => {}
            '\n' => {
                if in_row || !field.is_empty() {
                    row.push(core::mem::take(&mut field));
                    rows.push((row_line, core::mem::take(&mut row)));
                }
                in_row = false;
                row_line = line;
            }
            _ => {
                field.push(character);
                in_row = true;
            }
        }
    }

    if quoted {
        return Err(FormatError::invalid_ir(
            Format::Csv,
            format!("line {row_line}: unterminated quoted field"),
        ));
    }

    if in_row || !field.is_empty() {
        row.push(field);
        rows.push((row_line, row));
    }

    Ok(rows)
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    #[test]
    fn writes_one_row_per_entry() {
        let index = FpdIndex::from_entries(vec![
            CharacterEntry::new(u16::from(b'A'), 5),
            CharacterEntry::new(u16::from(b','), 0x1F),
            CharacterEntry::new(u16::from(b'"'), 0),
            CharacterEntry::new(0xD800, 1),
            CharacterEntry::new(u16::from(b'\n'), 2),
            CharacterEntry::new(u16::from(b'A'), 7),
        ]);

        assert_eq!(
            index.to_csv(),
            "code_point,width\r\nA,0x5\r\n\",\",0x1f\r\n\"\"\"\",0x0\r\nU+D800,0x1\r\n\
             U+000A,0x2\r\nA,0x7\r\n"
        );
        assert_eq!(FpdIndex::from_csv(&index.to_csv()), Ok(index));
    }

    #[test]
    fn reads_hand_written_tables() {
        let csv = "\u{FEFF}code_point,width\nA,5\n波,0xC\n\nU+3089,0x0A\n\n";
        let index = FpdIndex::from_csv(csv).unwrap();

        assert_eq!(
            index.entries(),
            [
                CharacterEntry::new(0x41, 5),
                CharacterEntry::new(0x6CE2, 0xC),
                CharacterEntry::new(0x3089, 0xA),
            ]
        );
    }

    #[test]
    fn rejects_wrong_header() {
        assert!(matches!(
            FpdIndex::from_csv("character,width\nA,0x0\n"),
            Err(FormatError::IrValidation {
                format: Format::Csv,
                ..
            })
        ));
        assert!(matches!(
            FpdIndex::from_csv(""),
            Err(FormatError::IrValidation { .. })
        ));
    }

    #[test]
    fn rejects_malformed_rows() {
        for csv in [
            "code_point,width\nA\n",
            "code_point,width\nA,0x0,extra\n",
            "code_point,width\nAB,0x0\n",
            "code_point,width\n,0x0\n",
            "code_point,width\nA,wide\n",
            "code_point,width\n\"A,0x0\n",
        ] {
            assert!(
                matches!(
                    FpdIndex::from_csv(csv),
                    Err(FormatError::IrValidation { .. })
                ),
                "{csv:?}"
            );
        }
    }

    #[test]
    fn rejects_out_of_range_values() {
        assert!(matches!(
            FpdIndex::from_csv("code_point,width\nA,0x100\n"),
            Err(FormatError::ValueOutOfRange { field: "width", .. })
        ));
        assert_eq!(
            FpdIndex::from_csv("code_point,width\n😀,0x0\n"),
            Err(FormatError::UnsupportedCharacter('😀'))
        );
    }

    #[test]
    fn reports_line_numbers() {
        let error = FpdIndex::from_csv("code_point,width\nA,0x0\nB\n").unwrap_err();

        assert_eq!(
            error,
            FormatError::IrValidation {
                format: Format::Csv,
                reason: "line 3 has 1 columns instead of 2".to_string(),
            }
        );
    }
}

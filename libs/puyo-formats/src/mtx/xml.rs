//! The XML form of a [`Script`].
//!
//! ```xml
//! <?xml version="1.0" encoding="UTF-8"?>
//! <mtx offsets="32">
//!   <sheet>
//!     <text>Hello<arrow/>
//! World<control code="0xF883"/><glyph index="12"/><end/><raw unit="0x0400"/></text>
//!   </sheet>
//! </mtx>
//! ```
//!
//! Every `<text>` element is one dialog. Line breaks are literal newlines inside `<text>`, so
//! indentation is only ever written between the structural elements.

use core::fmt;

use quick_xml::{
    Reader, Writer,
    events::{BytesDecl, BytesEnd, BytesStart, BytesText, Event},
};

use crate::{
    error::{Format, FormatError},
    mtx::{
        CONTROL_CODE_START, OffsetWidth,
        script::{Dialog, Script, Token},
    },
};

/// The root element.
const MTX: &str = "mtx";
/// The element holding every dialog.
const SHEET: &str = "sheet";
/// The element holding a single dialog.
const TEXT: &str = "text";
/// A [`Token::Arrow`].
const ARROW: &str = "arrow";
/// A [`Token::End`].
const END: &str = "end";
/// A [`Token::Control`].
const CONTROL: &str = "control";
/// A [`Token::Glyph`].
const GLYPH: &str = "glyph";
/// A [`Token::Raw`].
const RAW: &str = "raw";

/// The attribute of [`MTX`] holding the offset width in bits.
const OFFSETS: &str = "offsets";
/// The attribute of [`CONTROL`] holding the control code.
const CODE: &str = "code";
/// The attribute of [`GLYPH`] holding the character index.
const INDEX: &str = "index";
/// The attribute of [`RAW`] holding the code unit.
const UNIT: &str = "unit";

impl Script {
    /// Writes this [`Script`] as an XML document.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::IrValidation`] if the XML writer fails.
    pub fn to_xml(&self) -> Result<String, FormatError> {
        let mut writer = Writer::new(Vec::new());

        write(
            &mut writer,
            Event::Decl(BytesDecl::new("1.0", Some("UTF-8"), None)),
        )?;
        write_indent(&mut writer, 0)?;

        let offsets = self.offset_width().bits().to_string();
        let mut root = BytesStart::new(MTX);
        root.push_attribute((OFFSETS, offsets.as_str()));
        write(&mut writer, Event::Start(root))?;
        write_indent(&mut writer, 1)?;

        write(&mut writer, Event::Start(BytesStart::new(SHEET)))?;
        for dialog in self.dialogs() {
            write_indent(&mut writer, 2)?;
            write_dialog(&mut writer, dialog)?;
        }
        write_indent(&mut writer, 1)?;
        write(&mut writer, Event::End(BytesEnd::new(SHEET)))?;

        write_indent(&mut writer, 0)?;
        write(&mut writer, Event::End(BytesEnd::new(MTX)))?;
        write_indent(&mut writer, 0)?;

        String::from_utf8(writer.into_inner()).map_err(xml_error)
    }

    /// Parses an XML document written by [`Script::to_xml()`], or edited by hand.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::IrValidation`] if the document is not well formed, or does not
    /// follow the structure of a dialog script.
    pub fn from_xml(xml: &str) -> Result<Self, FormatError> {
        let mut reader = Reader::from_str(xml);

        let mut scope = Scope::Document;
        let mut offset_width = None;
        let mut dialogs = Vec::<Dialog>::new();

        loop {
            let position = reader.buffer_position();
            let event = reader.read_event().map_err(|error| {
                FormatError::invalid_ir(Format::Xml, format!("at byte {position}: {error}"))
            })?;

            match event {
                Event::Start(element) => {
                    scope = match (scope, element.name().as_ref()) {
                        (Scope::Document, name) if name == MTX.as_bytes() => {
                            if offset_width.is_some() {
                                return Err(misplaced(&element, position));
                            }
                            offset_width = Some(parse_offsets(&element)?);
                            Scope::Mtx
                        }
                        (Scope::Mtx, name) if name == SHEET.as_bytes() => Scope::Sheet,
                        (Scope::Sheet, name) if name == TEXT.as_bytes() => {
                            dialogs.push(Dialog::new());
                            Scope::Text
                        }
                        _ => return Err(misplaced(&element, position)),
                    };
                }
                Event::Empty(element) => match (scope, element.name().as_ref()) {
                    (Scope::Document, name) if name == MTX.as_bytes() => {
                        if offset_width.is_some() {
                            return Err(misplaced(&element, position));
                        }
                        offset_width = Some(parse_offsets(&element)?);
                    }
                    (Scope::Mtx, name) if name == SHEET.as_bytes() => {}
                    (Scope::Sheet, name) if name == TEXT.as_bytes() => dialogs.push(Dialog::new()),
                    (Scope::Text, _) => {
                        let token = parse_token(&element, position)?;
                        if let Some(dialog) = dialogs.last_mut() {
                            dialog.push(token);
                        }
                    }
                    _ => return Err(misplaced(&element, position)),
                },
                Event::End(_) => {
                    scope = match scope {
                        Scope::Text => Scope::Sheet,
                        Scope::Sheet => Scope::Mtx,
                        Scope::Mtx | Scope::Document => Scope::Document,
                    };
                }
                Event::Text(text) => {
                    let text = text.unescape().map_err(xml_error)?;
                    push_text(scope, &mut dialogs, &text, position)?;
                }
                Event::CData(data) => {
                    let text = core::str::from_utf8(&data).map_err(xml_error)?;
                    push_text(scope, &mut dialogs, text, position)?;
                }
                Event::Decl(_) | Event::PI(_) | Event::Comment(_) | Event::DocType(_) => {}
                Event::Eof => break,
            }
        }

        if scope != Scope::Document {
            return Err(FormatError::invalid_ir(
                Format::Xml,
                format!("document ends inside <{}>", scope.as_str()),
            ));
        }

        let offset_width = offset_width.ok_or_else(|| {
            FormatError::invalid_ir(Format::Xml, format!("missing the <{MTX}> root element"))
        })?;

        Ok(Self::new(offset_width, dialogs))
    }
}

/// The element that the reader is currently inside of.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
enum Scope {
    /// Outside of the root element.
    Document,
    /// Inside of [`MTX`].
    Mtx,
    /// Inside of [`SHEET`].
    Sheet,
    /// Inside of [`TEXT`].
    Text,
}

impl Scope {
    /// Returns the name of the element that this [`Scope`] is inside of.
    const fn as_str(&self) -> &'static str {
        match self {
            Self::Document => "document",
            Self::Mtx => MTX,
            Self::Sheet => SHEET,
            Self::Text => TEXT,
        }
    }
}

/// Writes a single [`Event`].
fn write(writer: &mut Writer<Vec<u8>>, event: Event<'_>) -> Result<(), FormatError> {
    writer.write_event(event).map_err(xml_error)
}

/// Writes a line break followed by `depth` levels of indentation.
fn write_indent(writer: &mut Writer<Vec<u8>>, depth: usize) -> Result<(), FormatError> {
    let indent = format!("\n{}", "  ".repeat(depth));
    write(writer, Event::Text(BytesText::new(&indent)))
}

/// Writes `dialog` as a [`TEXT`] element.
fn write_dialog(writer: &mut Writer<Vec<u8>>, dialog: &Dialog) -> Result<(), FormatError> {
    write(writer, Event::Start(BytesStart::new(TEXT)))?;

    let mut run = String::new();
    for token in dialog {
        let element = match *token {
            Token::Text(character) => {
                run.push(character);
                continue;
            }
            Token::LineBreak => {
                run.push('\n');
                continue;
            }
            Token::Arrow => BytesStart::new(ARROW),
            Token::End => BytesStart::new(END),
            Token::Control(code) => {
                let mut element = BytesStart::new(CONTROL);
                element.push_attribute((CODE, format!("{code:#06X}").as_str()));
                element
            }
            Token::Raw(unit) => {
                let mut element = BytesStart::new(RAW);
                element.push_attribute((UNIT, format!("{unit:#06X}").as_str()));
                element
            }
            Token::Glyph(index) => {
                let mut element = BytesStart::new(GLYPH);
                element.push_attribute((INDEX, index.to_string().as_str()));
                element
            }
        };

        if !run.is_empty() {
            write(writer, Event::Text(BytesText::new(&run)))?;
            run.clear();
        }
        write(writer, Event::Empty(element))?;
    }

    if !run.is_empty() {
        write(writer, Event::Text(BytesText::new(&run)))?;
    }

    write(writer, Event::End(BytesEnd::new(TEXT)))
}

/// Appends the characters of `text` to the current dialog, or checks that `text` is only
/// indentation when outside of a dialog.
fn push_text(
    scope: Scope,
    dialogs: &mut [Dialog],
    text: &str,
    position: usize,
) -> Result<(), FormatError> {
    let dialog = match (scope, dialogs.last_mut()) {
        (Scope::Text, Some(dialog)) => dialog,
        _ if text.chars().all(char::is_whitespace) => return Ok(()),
        _ => {
            return Err(FormatError::invalid_ir(
                Format::Xml,
                format!(
                    "at byte {position}: text outside of <{TEXT}> in <{}>",
                    scope.as_str()
                ),
            ));
        }
    };

    let mut characters = text.chars().peekable();
    while let Some(character) = characters.next() {
        let token = match character {
            '\r' => {
                characters.next_if_eq(&'\n');
                Token::LineBreak
            }
            '\n' => Token::LineBreak,
            _ => Token::Text(character),
        };
        dialog.push(token);
    }

    Ok(())
}

/// Parses the [`OFFSETS`] attribute of the root element, defaulting to 32 bits.
fn parse_offsets(element: &BytesStart<'_>) -> Result<OffsetWidth, FormatError> {
    let Some(value) = attribute(element, OFFSETS)? else {
        return Ok(OffsetWidth::default());
    };

    value
        .parse::<usize>()
        .ok()
        .and_then(OffsetWidth::from_bits)
        .ok_or_else(|| {
            FormatError::invalid_ir(
                Format::Xml,
                format!("{OFFSETS}=\"{value}\" is neither 32 nor 64"),
            )
        })
}

/// Parses an empty element inside of a [`TEXT`] element.
fn parse_token(element: &BytesStart<'_>, position: usize) -> Result<Token, FormatError> {
    let token = match element.name().as_ref() {
        name if name == ARROW.as_bytes() => Token::Arrow,
        name if name == END.as_bytes() => Token::End,
        name if name == CONTROL.as_bytes() => {
            let value = required_attribute(element, CODE, position)?;

            let code = parse_hex(&value)
                .filter(|&code| code >= CONTROL_CODE_START)
                .ok_or_else(|| {
                    FormatError::invalid_ir(
                        Format::Xml,
                        format!(
                            "at byte {position}: {CODE}=\"{value}\" is not a control code \
                             ({CONTROL_CODE_START:#06X} to 0xFFFF)"
                        ),
                    )
                })?;

            Token::Control(code)
        }
        name if name == RAW.as_bytes() => {
            let value = required_attribute(element, UNIT, position)?;

            let unit = parse_hex(&value)
                .filter(|&unit| unit < CONTROL_CODE_START)
                .ok_or_else(|| {
                    FormatError::invalid_ir(
                        Format::Xml,
                        format!(
                            "at byte {position}: {UNIT}=\"{value}\" is not a code unit \
                             (0x0000 to {:#06X})",
                            CONTROL_CODE_START - 1
                        ),
                    )
                })?;

            Token::Raw(unit)
        }
        name if name == GLYPH.as_bytes() => {
            let value = required_attribute(element, INDEX, position)?;
            let index = value.parse::<usize>().map_err(|error| {
                FormatError::invalid_ir(
                    Format::Xml,
                    format!("at byte {position}: {INDEX}=\"{value}\": {error}"),
                )
            })?;

            Token::Glyph(index)
        }
        _ => return Err(misplaced(element, position)),
    };

    Ok(token)
}

/// Parses a hexadecimal `u16` with an optional `0x` prefix.
fn parse_hex(value: &str) -> Option<u16> {
    let digits = value
        .strip_prefix("0x")
        .or_else(|| value.strip_prefix("0X"))
        .unwrap_or(value);

    u16::from_str_radix(digits, 16).ok()
}

/// Returns the unescaped value of the attribute `name` of `element`, if present.
fn attribute(element: &BytesStart<'_>, name: &str) -> Result<Option<String>, FormatError> {
    for attribute in element.attributes() {
        let attribute = attribute.map_err(xml_error)?;
        if attribute.key.as_ref() == name.as_bytes() {
            let value = attribute.unescape_value().map_err(xml_error)?;
            return Ok(Some(value.into_owned()));
        }
    }

    Ok(None)
}

/// Returns the unescaped value of the attribute `name` of `element`.
fn required_attribute(
    element: &BytesStart<'_>,
    name: &str,
    position: usize,
) -> Result<String, FormatError> {
    attribute(element, name)?.ok_or_else(|| {
        FormatError::invalid_ir(
            Format::Xml,
            format!(
                "at byte {position}: <{}> is missing the {name} attribute",
                String::from_utf8_lossy(element.name().as_ref())
            ),
        )
    })
}

/// Creates the error for an element that is unknown or in the wrong place.
fn misplaced(element: &BytesStart<'_>, position: usize) -> FormatError {
    FormatError::invalid_ir(
        Format::Xml,
        format!(
            "at byte {position}: unexpected element <{}>",
            String::from_utf8_lossy(element.name().as_ref())
        ),
    )
}

/// Wraps an error of the XML reader or writer.
fn xml_error(error: impl fmt::Display) -> FormatError {
    FormatError::invalid_ir(Format::Xml, error.to_string())
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{
        codec::Codec,
        fpd::{CharacterEntry, FpdIndex},
        mtx::{CONTROL_ARROW, CONTROL_END, CONTROL_LINE_BREAK, Mtx},
    };

    /// A table where `l` appears at indices 2 and 6, and index 7 is a line feed.
    fn table() -> FpdIndex {
        FpdIndex::from_entries(
            "Hel<o&l\n W"
                .chars()
                .map(|c| CharacterEntry::from_char(c, 0).unwrap())
                .collect(),
        )
    }

    fn sample_script() -> Script {
        Script::new(
            OffsetWidth::Bits32,
            vec![
                vec![
                    Token::Text('H'),
                    Token::Text('<'),
                    Token::Arrow,
                    Token::LineBreak,
                    Token::Text('&'),
                    Token::Control(0xF883),
                    Token::Glyph(6),
                    Token::End,
                    Token::Raw(0x0400),
                ],
                vec![],
            ],
        )
    }

    #[test]
    fn writes_documents() {
        let xml = sample_script().to_xml().unwrap();

        assert_eq!(
            xml,
            "<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n\
             <mtx offsets=\"32\">\n  \
             <sheet>\n    \
             <text>H&lt;<arrow/>\n&amp;<control code=\"0xF883\"/><glyph index=\"6\"/><end/><raw unit=\"0x0400\"/></text>\n    \
             <text></text>\n  \
             </sheet>\n\
             </mtx>\n"
        );
    }

    #[test]
    fn reads_written_documents() {
        let script = sample_script();

        assert_eq!(Script::from_xml(&script.to_xml().unwrap()).unwrap(), script);
    }

    #[test]
    fn binary_round_trip_through_xml() {
        for offset_width in [OffsetWidth::Bits32, OffsetWidth::Bits64] {
            let mtx = Mtx::new(
                offset_width,
                vec![
                    vec![0, 1, 2, 6, 3, CONTROL_ARROW, CONTROL_LINE_BREAK, 7, 8, 9],
                    vec![4, 5, 0xF883, CONTROL_END, 0, 0x0123],
                    vec![],
                ],
            );
            let bytes = mtx.encode().unwrap();

            let script = Script::resolve(&Mtx::decode(&bytes, offset_width).unwrap(), &table())
                .unwrap();
            let xml = script.to_xml().unwrap();
            let compiled = Script::from_xml(&xml).unwrap().compile(&table()).unwrap();

            assert_eq!(compiled.encode().unwrap(), bytes, "{xml}");
        }
    }

    #[test]
    fn accepts_hand_written_documents() {
        let xml = "<mtx>\r\n<!-- intro -->\r\n<sheet><text>He\r\nl<![CDATA[<o]]><control code=\"f900\"/></text><text/></sheet></mtx>";

        assert_eq!(
            Script::from_xml(xml).unwrap(),
            Script::new(
                OffsetWidth::Bits32,
                vec![
                    vec![
                        Token::Text('H'),
                        Token::Text('e'),
                        Token::LineBreak,
                        Token::Text('l'),
                        Token::Text('<'),
                        Token::Text('o'),
                        Token::Control(0xF900),
                    ],
                    vec![],
                ],
            )
        );
    }

    #[test]
    fn rejects_malformed_documents() {
        for xml in [
            "",
            "<mtx offsets=\"16\"><sheet/></mtx>",
            "<mtx><sheet><text>a</sheet></mtx>",
            "<mtx><sheet><text>a</text></sheet>",
            "<mtx><sheet><text><bold/></text></sheet></mtx>",
            "<mtx><sheet><text><arrow></arrow></text></sheet></mtx>",
            "<mtx><text>a</text></mtx>",
            "<mtx><sheet>a<text/></sheet></mtx>",
            "<mtx><sheet><text><glyph/></text></sheet></mtx>",
            "<mtx><sheet><text><glyph index=\"-1\"/></text></sheet></mtx>",
            "<mtx><sheet><text><control code=\"0x0041\"/></text></sheet></mtx>",
            "<mtx><sheet><text><raw unit=\"0xF813\"/></text></sheet></mtx>",
            "<mtx><sheet><text><raw/></text></sheet></mtx>",
            "<mtx><sheet/></mtx><mtx><sheet/></mtx>",
        ] {
            assert!(
                matches!(
                    Script::from_xml(xml),
                    Err(FormatError::IrValidation {
                        format: Format::Xml,
                        ..
                    })
                ),
                "{xml}"
            );
        }
    }
}

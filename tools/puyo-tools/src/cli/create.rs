//! Command line parsing and construction of the `create` [`Action`]s.

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command};
use puyo_formats::FmpSize;

use crate::cli::{
    Action, CharacterTable, TableFormat, character_table_args, padding_arg,
    parse_character_table, parse_glyph_options, parse_paths, parse_table_format, path_args,
    size_arg, table_format_arg,
};

/// Description of which editable character table to turn into an `fpd` file.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CreateFpdConfiguration {
    /// The editable character table.
    pub input: PathBuf,
    /// The `fpd` file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The editable form of `input`.
    pub format: TableFormat,
    /// The width given to every character read from UTF-16 text.
    pub width: u8,
}

/// Description of which image to cut into an `fmp` file.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CreateFmpConfiguration {
    /// The image holding the glyph sheet.
    pub input: PathBuf,
    /// The `fmp` file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The size of the glyphs on the sheet.
    pub size: FmpSize,
    /// The number of pixels around each glyph on the sheet.
    pub padding: usize,
}

/// Description of which XML file to compile into an `mtx` file.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct CreateMtxConfiguration {
    /// The XML dialog script.
    pub input: PathBuf,
    /// The `mtx` file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The character table to look characters up in.
    pub table: CharacterTable,
}

/// Parses the arguments of the `create` subcommand.
#[expect(
    clippy::missing_panics_doc,
    reason = "create subcommand guarantees that these are present"
)]
pub fn parse_arguments(matches: &ArgMatches) -> Action {
    let (format_name, format_matches) = matches.subcommand().expect("format is required");
    let (input, output) = parse_paths(format_matches);

    match format_name {
        "fpd" => Action::CreateFpd(CreateFpdConfiguration {
            input,
            output,
            format: parse_table_format(format_matches),
            width: format_matches
                .get_one::<u8>("width")
                .copied()
                .expect("width has a default value"),
        }),
        "fmp" => {
            let (size, padding) = parse_glyph_options(format_matches);

            Action::CreateFmp(CreateFmpConfiguration {
                input,
                output,
                size: size.into(),
                padding,
            })
        }
        "mtx" => Action::CreateMtx(CreateMtxConfiguration {
            input,
            output,
            table: parse_character_table(format_matches),
        }),
        _ => unreachable!("unexpected format: {format_name:?}"),
    }
}

/// Returns the command parser for the `create` [`Action`]s.
pub fn subcommand_parser() -> Command {
    let width = Arg::new("width")
        .long("width")
        .help("Width given to every character of a UTF-16 text table")
        .value_parser(clap::value_parser!(u8))
        .default_value("0");

    let fpd = Command::new("fpd")
        .about("Creates an fpd character table from CSV or UTF-16 text")
        .args(path_args("Character table to read"))
        .arg(table_format_arg())
        .arg(width);

    let fmp = Command::new("fmp")
        .about("Creates an fmp font from an image of its glyphs, preferably BMP or PNG")
        .args(path_args("Image holding the glyph sheet"))
        .arg(size_arg())
        .arg(padding_arg());

    let (table_args, table_group) = character_table_args();
    let mtx = Command::new("mtx")
        .about("Creates an mtx dialog script from XML")
        .args(path_args("XML file holding the dialog script"))
        .args(table_args)
        .group(table_group);

    Command::new("create")
        .about("Creates game files from editable forms")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(fpd)
        .subcommand(fmp)
        .subcommand(mtx)
}

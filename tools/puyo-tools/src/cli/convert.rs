//! Command line parsing and construction of the `convert` [`Action`]s.

use std::path::PathBuf;

use clap::{Arg, ArgMatches, Command, builder::EnumValueParser};
use puyo_formats::{FmpSize, OffsetWidth, fmp::sheet::SheetLayout};

use crate::cli::{
    Action, CharacterTable, OffsetBits, SheetOrientation, TableFormat, character_table_args,
    padding_arg, parse_character_table, parse_glyph_options, parse_paths, parse_table_format,
    path_args, size_arg, table_format_arg,
};

/// Description of which `fpd` file to convert and into what.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConvertFpdConfiguration {
    /// The `fpd` file to convert.
    pub input: PathBuf,
    /// The file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The editable form to write.
    pub format: TableFormat,
}

/// Description of which `fmp` file to convert and how to lay out its glyphs.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConvertFmpConfiguration {
    /// The `fmp` file to convert.
    pub input: PathBuf,
    /// The image to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The size of the glyphs in the `fmp` file.
    pub size: FmpSize,
    /// How the glyphs are laid out on the image.
    pub layout: SheetLayout,
}

/// Description of which `mtx` file to convert and what to resolve it against.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct ConvertMtxConfiguration {
    /// The `mtx` file to convert.
    pub input: PathBuf,
    /// The XML file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
    /// The character table to resolve indices against.
    pub table: CharacterTable,
    /// The width of the offsets of the `mtx` file.
    pub offset_width: OffsetWidth,
}

/// Parses the arguments of the `convert` subcommand.
#[expect(
    clippy::missing_panics_doc,
    reason = "convert subcommand guarantees that these are present"
)]
pub fn parse_arguments(matches: &ArgMatches) -> Action {
    let (format_name, format_matches) = matches.subcommand().expect("format is required");
    let (input, output) = parse_paths(format_matches);

    match format_name {
        "fpd" => Action::ConvertFpd(ConvertFpdConfiguration {
            input,
            output,
            format: parse_table_format(format_matches),
        }),
        "fmp" => {
            let (size, padding) = parse_glyph_options(format_matches);
            let orientation = format_matches
                .get_one::<SheetOrientation>("orientation")
                .copied()
                .expect("orientation has a default value");

            Action::ConvertFmp(ConvertFmpConfiguration {
                input,
                output,
                size: size.into(),
                layout: SheetLayout {
                    padding,
                    orientation: orientation.into(),
                },
            })
        }
        "mtx" => {
            let offsets = format_matches
                .get_one::<OffsetBits>("offsets")
                .copied()
                .expect("offsets has a default value");

            Action::ConvertMtx(ConvertMtxConfiguration {
                input,
                output,
                table: parse_character_table(format_matches),
                offset_width: offsets.into(),
            })
        }
        _ => unreachable!("unexpected format: {format_name:?}"),
    }
}

/// Returns the command parser for the `convert` [`Action`]s.
pub fn subcommand_parser() -> Command {
    let fpd = Command::new("fpd")
        .about("Converts an fpd character table to CSV or UTF-16 text")
        .args(path_args("fpd file to convert"))
        .arg(table_format_arg());

    let orientation = Arg::new("orientation")
        .long("orientation")
        .help("Shape of the glyph sheet")
        .value_parser(EnumValueParser::<SheetOrientation>::new())
        .default_value(SheetOrientation::default().as_str());

    let fmp = Command::new("fmp")
        .about("Converts an fmp font to an image of its glyphs")
        .args(path_args("fmp file to convert"))
        .arg(size_arg())
        .arg(padding_arg())
        .arg(orientation);

    let offsets = Arg::new("offsets")
        .long("offsets")
        .help("Width of the offsets of the mtx file in bits")
        .value_parser(EnumValueParser::<OffsetBits>::new())
        .default_value(OffsetBits::default().as_str());

    let (table_args, table_group) = character_table_args();
    let mtx = Command::new("mtx")
        .about("Converts an mtx dialog script to XML")
        .args(path_args("mtx file to convert"))
        .args(table_args)
        .group(table_group)
        .arg(offsets);

    Command::new("convert")
        .about("Converts game files to editable forms")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(fpd)
        .subcommand(fmp)
        .subcommand(mtx)
}

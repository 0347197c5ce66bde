//! Command line parsing and [`Action`] construction.

use std::path::PathBuf;

use clap::{Arg, ArgAction, ArgGroup, ArgMatches, Command, builder::EnumValueParser};
use puyo_formats::{FmpSize, OffsetWidth, fmp::sheet::Orientation};

pub mod convert;
pub mod create;
pub mod decompress;

pub use convert::{ConvertFmpConfiguration, ConvertFpdConfiguration, ConvertMtxConfiguration};
pub use create::{CreateFmpConfiguration, CreateFpdConfiguration, CreateMtxConfiguration};
pub use decompress::DecompressConfiguration;

/// Parses `puyo-tools`'s arguments to construct an [`Invocation`].
pub fn get_invocation() -> Invocation {
    parse_arguments(&command_parser().get_matches())
}

/// Parses the arguments of `puyo-tools` to construct an [`Invocation`].
#[expect(
    clippy::missing_panics_doc,
    reason = "puyo-tools subcommand guarantees that these are present"
)]
pub fn parse_arguments(matches: &ArgMatches) -> Invocation {
    let verbosity = matches.get_count("verbose");

    let (subcommand_name, subcommand_matches) =
        matches.subcommand().expect("subcommand is required");
    let action = match subcommand_name {
        "convert" => convert::parse_arguments(subcommand_matches),
        "create" => create::parse_arguments(subcommand_matches),
        "decompress" => decompress::parse_arguments(subcommand_matches),
        _ => unreachable!("unexpected subcommand: {subcommand_name:?}"),
    };

    Invocation { verbosity, action }
}

/// Returns the command parser for all [`Action`]s.
pub fn command_parser() -> Command {
    let verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .help("Logs more details, repeat for even more")
        .action(ArgAction::Count)
        .global(true);

    Command::new("puyo-tools")
        .about("Converts the files of older Puyo Puyo games to and from editable forms")
        .version(env!("CARGO_PKG_VERSION"))
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose)
        .subcommand(convert::subcommand_parser())
        .subcommand(create::subcommand_parser())
        .subcommand(decompress::subcommand_parser())
}

/// A parsed command line.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Invocation {
    /// The number of times `--verbose` was passed.
    pub verbosity: u8,
    /// The [`Action`] to carry out.
    pub action: Action,
}

/// The action to carry out.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum Action {
    /// Convert an `fpd` file to CSV or UTF-16 text.
    ConvertFpd(ConvertFpdConfiguration),
    /// Convert an `fmp` file to an image.
    ConvertFmp(ConvertFmpConfiguration),
    /// Convert an `mtx` file to XML.
    ConvertMtx(ConvertMtxConfiguration),
    /// Create an `fpd` file from CSV or UTF-16 text.
    CreateFpd(CreateFpdConfiguration),
    /// Create an `fmp` file from an image.
    CreateFmp(CreateFmpConfiguration),
    /// Create an `mtx` file from XML.
    CreateMtx(CreateMtxConfiguration),
    /// Decompress an LZ11 compressed file.
    DecompressLz11(DecompressConfiguration),
}

/// The editable forms of an `fpd` character table.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum TableFormat {
    /// Comma separated values with a `code_point,width` header.
    #[default]
    Csv,
    /// UTF-16 little-endian text holding every character once.
    Utf16,
}

impl TableFormat {
    /// Returns the textual representation of the [`TableFormat`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Utf16 => "utf16",
        }
    }

    /// Returns the file extension used for the [`TableFormat`].
    pub fn extension(&self) -> &'static str {
        match self {
            Self::Csv => "csv",
            Self::Utf16 => "txt",
        }
    }
}

impl clap::ValueEnum for TableFormat {
    fn value_variants<'a>() -> &'a [Self] {
        static FORMATS: &[TableFormat] = &[TableFormat::Csv, TableFormat::Utf16];

        FORMATS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// The size of the glyphs of an `fmp` file.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum FontSize {
    /// 8x8 glyphs.
    Small,
    /// 14x14 glyphs.
    #[default]
    Large,
}

impl FontSize {
    /// Returns the textual representation of the [`FontSize`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Small => "8",
            Self::Large => "14",
        }
    }
}

impl From<FontSize> for FmpSize {
    fn from(size: FontSize) -> Self {
        match size {
            FontSize::Small => Self::Small,
            FontSize::Large => Self::Large,
        }
    }
}

impl clap::ValueEnum for FontSize {
    fn value_variants<'a>() -> &'a [Self] {
        static SIZES: &[FontSize] = &[FontSize::Small, FontSize::Large];

        SIZES
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// The shape of a glyph sheet.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum SheetOrientation {
    /// At least as many rows as columns.
    #[default]
    Portrait,
    /// At least as many columns as rows.
    Landscape,
}

impl SheetOrientation {
    /// Returns the textual representation of the [`SheetOrientation`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Portrait => "portrait",
            Self::Landscape => "landscape",
        }
    }
}

impl From<SheetOrientation> for Orientation {
    fn from(orientation: SheetOrientation) -> Self {
        match orientation {
            SheetOrientation::Portrait => Self::Portrait,
            SheetOrientation::Landscape => Self::Landscape,
        }
    }
}

impl clap::ValueEnum for SheetOrientation {
    fn value_variants<'a>() -> &'a [Self] {
        static ORIENTATIONS: &[SheetOrientation] =
            &[SheetOrientation::Portrait, SheetOrientation::Landscape];

        ORIENTATIONS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// The width of the offsets of an `mtx` file.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum OffsetBits {
    /// 32-bit offsets.
    #[default]
    Bits32,
    /// 64-bit offsets.
    Bits64,
}

impl OffsetBits {
    /// Returns the textual representation of the [`OffsetBits`].
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Bits32 => "32",
            Self::Bits64 => "64",
        }
    }
}

impl From<OffsetBits> for OffsetWidth {
    fn from(bits: OffsetBits) -> Self {
        match bits {
            OffsetBits::Bits32 => Self::Bits32,
            OffsetBits::Bits64 => Self::Bits64,
        }
    }
}

impl clap::ValueEnum for OffsetBits {
    fn value_variants<'a>() -> &'a [Self] {
        static BITS: &[OffsetBits] = &[OffsetBits::Bits32, OffsetBits::Bits64];

        BITS
    }

    fn to_possible_value(&self) -> Option<clap::builder::PossibleValue> {
        Some(clap::builder::PossibleValue::new(self.as_str()))
    }
}

/// The character table that an `mtx` file is resolved against.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub enum CharacterTable {
    /// A binary `fpd` file.
    Fpd(PathBuf),
    /// The CSV form of an `fpd` file.
    Csv(PathBuf),
    /// The UTF-16 text form of an `fpd` file.
    Unicode(PathBuf),
}

/// Returns the input argument and the output option shared by every subcommand.
fn path_args(input_help: &'static str) -> [Arg; 2] {
    let input = Arg::new("input")
        .help(input_help)
        .value_parser(clap::value_parser!(PathBuf))
        .required(true);

    let output = Arg::new("output")
        .short('o')
        .long("output")
        .help("Output file, defaults to the input file name with a new extension")
        .value_parser(clap::value_parser!(PathBuf));

    [input, output]
}

/// Parses the arguments created by [`path_args()`].
fn parse_paths(matches: &ArgMatches) -> (PathBuf, Option<PathBuf>) {
    let input = matches
        .get_one::<PathBuf>("input")
        .cloned()
        .expect("input is a required argument");
    let output = matches.get_one::<PathBuf>("output").cloned();

    (input, output)
}

/// Returns the `--size` option of the `fmp` subcommands.
fn size_arg() -> Arg {
    Arg::new("size")
        .long("size")
        .help("Size of the glyphs in pixels")
        .value_parser(EnumValueParser::<FontSize>::new())
        .default_value(FontSize::default().as_str())
}

/// Returns the `--padding` option of the `fmp` subcommands.
fn padding_arg() -> Arg {
    Arg::new("padding")
        .long("padding")
        .help("Number of pixels around each glyph on the sheet")
        .value_parser(clap::value_parser!(u8).range(0..=4))
        .default_value("1")
}

/// Parses the arguments created by [`size_arg()`] and [`padding_arg()`].
fn parse_glyph_options(matches: &ArgMatches) -> (FontSize, usize) {
    let size = matches
        .get_one::<FontSize>("size")
        .copied()
        .expect("size has a default value");
    let padding = matches
        .get_one::<u8>("padding")
        .copied()
        .expect("padding has a default value");

    (size, usize::from(padding))
}

/// Returns the `--format` option of the `fpd` subcommands.
fn table_format_arg() -> Arg {
    Arg::new("format")
        .long("format")
        .help("Editable form of the character table")
        .value_parser(EnumValueParser::<TableFormat>::new())
        .default_value(TableFormat::default().as_str())
}

/// Parses the argument created by [`table_format_arg()`].
fn parse_table_format(matches: &ArgMatches) -> TableFormat {
    matches
        .get_one::<TableFormat>("format")
        .copied()
        .expect("format has a default value")
}

/// Returns the mutually exclusive character table options of the `mtx` subcommands, and the
/// group that requires exactly one of them.
fn character_table_args() -> ([Arg; 3], ArgGroup) {
    let fpd = Arg::new("fpd")
        .long("fpd")
        .help("Binary fpd character table")
        .value_parser(clap::value_parser!(PathBuf));

    let csv = Arg::new("csv")
        .long("csv")
        .help("CSV character table")
        .value_parser(clap::value_parser!(PathBuf));

    let unicode = Arg::new("unicode")
        .long("unicode")
        .help("UTF-16 text character table")
        .value_parser(clap::value_parser!(PathBuf));

    let group = ArgGroup::new("table")
        .args(["fpd", "csv", "unicode"])
        .required(true);

    ([fpd, csv, unicode], group)
}

/// Parses the arguments created by [`character_table_args()`].
fn parse_character_table(matches: &ArgMatches) -> CharacterTable {
    let path = |id: &str| matches.get_one::<PathBuf>(id).cloned();

    if let Some(path) = path("fpd") {
        CharacterTable::Fpd(path)
    } else if let Some(path) = path("csv") {
        CharacterTable::Csv(path)
    } else {
        CharacterTable::Unicode(path("unicode").expect("one character table is required"))
    }
}

//! Command line parsing and construction of the `decompress` [`Action`]s.

use std::path::PathBuf;

use clap::{ArgMatches, Command};

use crate::cli::{Action, parse_paths, path_args};

/// Description of which compressed file to decompress.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct DecompressConfiguration {
    /// The compressed file.
    pub input: PathBuf,
    /// The file to write, if not derived from `input`.
    pub output: Option<PathBuf>,
}

/// Parses the arguments of the `decompress` subcommand.
#[expect(
    clippy::missing_panics_doc,
    reason = "decompress subcommand guarantees that these are present"
)]
pub fn parse_arguments(matches: &ArgMatches) -> Action {
    let (format_name, format_matches) = matches.subcommand().expect("format is required");
    let (input, output) = parse_paths(format_matches);

    match format_name {
        "lz11" => Action::DecompressLz11(DecompressConfiguration { input, output }),
        _ => unreachable!("unexpected format: {format_name:?}"),
    }
}

/// Returns the command parser for the `decompress` [`Action`]s.
pub fn subcommand_parser() -> Command {
    let lz11 = Command::new("lz11")
        .about("Decompresses an LZ11 compressed file")
        .args(path_args("LZ11 compressed file"));

    Command::new("decompress")
        .about("Decompresses files of the Nintendo DS and 3DS releases")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(lz11)
}

//! Implementations of the [`Action`][action]s.
//!
//! [action]: crate::cli::Action

pub mod convert;
pub mod create;
pub mod decompress;

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use puyo_formats::{Codec, FpdIndex};

use crate::cli::CharacterTable;

/// Returns `output` if given, otherwise the file name of `input` with its extension replaced by
/// `extension`, placed in the current directory.
pub fn output_path(input: &Path, output: Option<&Path>, extension: &str) -> PathBuf {
    match output {
        Some(output) => output.to_path_buf(),
        None => Path::new(input.file_name().unwrap_or_default()).with_extension(extension),
    }
}

/// Reads the whole file at `path`.
///
/// # Errors
///
/// Returns an error if the file could not be read.
pub fn read(path: &Path) -> Result<Vec<u8>> {
    fs::read(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Reads the whole file at `path` as UTF-8 text.
///
/// # Errors
///
/// Returns an error if the file could not be read or is not UTF-8.
pub fn read_to_string(path: &Path) -> Result<String> {
    fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

/// Writes `contents` to the file at `path`, replacing it if it exists.
///
/// # Errors
///
/// Returns an error if the file could not be written.
pub fn write(path: &Path, contents: impl AsRef<[u8]>) -> Result<()> {
    fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
    log::info!("wrote {}", path.display());

    Ok(())
}

/// Loads the character table described by `table`.
///
/// # Errors
///
/// Returns an error if the table could not be read or is malformed. A UTF-16 text table that
/// repeats a character is malformed, since every later index would shift.
pub fn load_table(table: &CharacterTable) -> Result<FpdIndex> {
    let (path, index) = match table {
        CharacterTable::Fpd(path) => (path, FpdIndex::decode(&read(path)?, ())),
        CharacterTable::Csv(path) => (path, FpdIndex::from_csv(&read_to_string(path)?)),
        CharacterTable::Unicode(path) => (path, FpdIndex::from_utf16_table(&read(path)?, 0)),
    };

    let index = index.with_context(|| format!("failed to load {}", path.display()))?;
    log::debug!("loaded {} characters from {}", index.len(), path.display());

    Ok(index)
}

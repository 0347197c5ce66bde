//! Decompression of the files of the Nintendo DS and 3DS releases.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use puyo_formats::lz11;

use crate::{
    action::{read, write},
    cli::DecompressConfiguration,
};

/// Decompresses an LZ11 compressed file as specified by `config`.
///
/// # Errors
///
/// Returns an error if the file could not be read or decompressed, or the output could not be
/// written.
pub fn decompress_lz11(config: &DecompressConfiguration) -> Result<()> {
    let data = lz11::decompress(&read(&config.input)?)
        .with_context(|| format!("failed to decompress {}", config.input.display()))?;
    log::debug!("decompressed {} bytes", data.len());

    let output = config
        .output
        .clone()
        .unwrap_or_else(|| decompressed_path(&config.input));
    write(&output, data)
}

/// Returns the file name of `input` without its extension, or with a `bin` extension if it has
/// none, placed in the current directory.
pub fn decompressed_path(input: &Path) -> PathBuf {
    let name = Path::new(input.file_name().unwrap_or_default());

    if name.extension().is_some() {
        name.with_extension("")
    } else {
        name.with_extension("bin")
    }
}

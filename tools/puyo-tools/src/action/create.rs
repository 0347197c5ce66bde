//! Creation of game files from their editable forms.

use anyhow::{Context, Result};
use puyo_formats::{Codec, Fmp, FpdIndex, GlyphDimensions, Script, fmp::sheet};

use crate::{
    action::{load_table, output_path, read, read_to_string, write},
    cli::{CreateFmpConfiguration, CreateFpdConfiguration, CreateMtxConfiguration, TableFormat},
    raster,
};

/// Creates an `fpd` file from CSV or UTF-16 text as specified by `config`.
///
/// # Errors
///
/// Returns an error if the input could not be read or parsed, or the `fpd` file could not be
/// written.
pub fn create_fpd(config: &CreateFpdConfiguration) -> Result<()> {
    let index = match config.format {
        TableFormat::Csv => FpdIndex::from_csv(&read_to_string(&config.input)?),
        TableFormat::Utf16 => FpdIndex::from_utf16_text(&read(&config.input)?, config.width),
    }
    .with_context(|| format!("failed to parse {}", config.input.display()))?;
    log::debug!("parsed {} characters", index.len());

    let output = output_path(&config.input, config.output.as_deref(), "fpd");
    write(&output, index.encode()?)
}

/// Creates an `fmp` file from an image of its glyphs as specified by `config`.
///
/// # Errors
///
/// Returns an error if the image could not be opened, is not a grid of glyphs, or the `fmp`
/// file could not be written.
pub fn create_fmp(config: &CreateFmpConfiguration) -> Result<()> {
    let image = image::open(&config.input)
        .with_context(|| format!("failed to open {}", config.input.display()))?;
    let matrix = raster::from_image(&image)?;

    let dimensions = GlyphDimensions::from(config.size);
    let glyphs = sheet::from_sheet(&matrix, dimensions, config.padding)
        .with_context(|| format!("failed to cut {} into glyphs", config.input.display()))?;
    log::debug!("cut {} glyphs of {dimensions}", glyphs.len());

    let fmp = Fmp::new(dimensions, glyphs)?;

    let output = output_path(&config.input, config.output.as_deref(), "fmp");
    write(&output, fmp.encode()?)
}

/// Creates an `mtx` file from XML as specified by `config`.
///
/// # Errors
///
/// Returns an error if the XML or the character table could not be read or parsed, a character
/// is missing from the character table, or the `mtx` file could not be written.
pub fn create_mtx(config: &CreateMtxConfiguration) -> Result<()> {
    let table = load_table(&config.table)?;

    let script = Script::from_xml(&read_to_string(&config.input)?)
        .with_context(|| format!("failed to parse {}", config.input.display()))?;
    log::debug!("parsed {} dialogs", script.dialogs().len());

    let mtx = script
        .compile(&table)
        .with_context(|| format!("failed to compile {}", config.input.display()))?;

    let output = output_path(&config.input, config.output.as_deref(), "mtx");
    write(&output, mtx.encode()?)
}

//! Conversion of game files to their editable forms.

use anyhow::{Context, Result};
use puyo_formats::{Codec, Fmp, FpdIndex, Mtx, Script, fmp::sheet};

use crate::{
    action::{load_table, output_path, read, write},
    cli::{ConvertFmpConfiguration, ConvertFpdConfiguration, ConvertMtxConfiguration, TableFormat},
    raster,
};

/// Converts an `fpd` file to CSV or UTF-16 text as specified by `config`.
///
/// # Errors
///
/// Returns an error if the `fpd` file could not be read or decoded, the table does not fit the
/// requested form, or the output could not be written.
pub fn convert_fpd(config: &ConvertFpdConfiguration) -> Result<()> {
    let index = FpdIndex::decode(&read(&config.input)?, ())
        .with_context(|| format!("failed to decode {}", config.input.display()))?;
    log::debug!("decoded {} characters", index.len());

    let contents = match config.format {
        TableFormat::Csv => index.to_csv().into_bytes(),
        TableFormat::Utf16 => index.to_utf16_text().with_context(|| {
            format!("{} cannot be written as UTF-16 text", config.input.display())
        })?,
    };

    let output = output_path(
        &config.input,
        config.output.as_deref(),
        config.format.extension(),
    );
    write(&output, contents)
}

/// Converts an `fmp` file to an image of its glyphs as specified by `config`.
///
/// The image format follows the extension of the output file.
///
/// # Errors
///
/// Returns an error if the `fmp` file could not be read or decoded, or the image could not be
/// written.
pub fn convert_fmp(config: &ConvertFmpConfiguration) -> Result<()> {
    let fmp = Fmp::decode(&read(&config.input)?, config.size.into())
        .with_context(|| format!("failed to decode {}", config.input.display()))?;
    log::debug!("decoded {} glyphs of {}", fmp.len(), fmp.dimensions());

    let sheet = sheet::to_sheet(fmp.glyphs(), config.layout)?;
    let image = raster::to_image(&sheet)?;

    let output = output_path(&config.input, config.output.as_deref(), "png");
    image
        .save(&output)
        .with_context(|| format!("failed to write {}", output.display()))?;
    log::info!("wrote {}", output.display());

    Ok(())
}

/// Converts an `mtx` file to XML as specified by `config`.
///
/// # Errors
///
/// Returns an error if the `mtx` file or the character table could not be read or decoded, an
/// index is missing from the character table, or the XML could not be written.
pub fn convert_mtx(config: &ConvertMtxConfiguration) -> Result<()> {
    let table = load_table(&config.table)?;

    let mtx = Mtx::decode(&read(&config.input)?, config.offset_width)
        .with_context(|| format!("failed to decode {}", config.input.display()))?;
    log::debug!("decoded {} dialogs", mtx.strings().len());

    let script = Script::resolve(&mtx, &table)
        .with_context(|| format!("failed to resolve {}", config.input.display()))?;
    let xml = script.to_xml()?;

    let output = output_path(&config.input, config.output.as_deref(), "xml");
    write(&output, xml)
}

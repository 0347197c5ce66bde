//! Conversion between glyph sheets and images.

use anyhow::{Result, anyhow};
use image::{DynamicImage, GrayImage, Luma};
use puyo_formats::fmp::sheet::BitMatrix;

/// The brightness of a lit pixel.
const LIT: u8 = 255;

/// The brightness of an unlit pixel.
const UNLIT: u8 = 0;

/// The brightness from which on a pixel counts as lit.
const THRESHOLD: u8 = 128;

/// Draws `sheet` as a grayscale image, lit pixels white on black.
///
/// # Errors
///
/// Returns an error if `sheet` is too large for an image.
pub fn to_image(sheet: &BitMatrix) -> Result<GrayImage> {
    let width = u32::try_from(sheet.width())?;
    let height = u32::try_from(sheet.height())?;

    Ok(GrayImage::from_fn(width, height, |x, y| {
        match sheet.get(x as usize, y as usize) {
            Some(true) => Luma([LIT]),
            _ => Luma([UNLIT]),
        }
    }))
}

/// Reads `image` as a glyph sheet, thresholding it to black and white.
///
/// # Errors
///
/// Returns an error if `image` is too large for the current platform.
pub fn from_image(image: &DynamicImage) -> Result<BitMatrix> {
    let image = image.to_luma8();
    let width = usize::try_from(image.width())?;
    let height = usize::try_from(image.height())?;

    let bits = image.pixels().map(|Luma([value])| *value >= THRESHOLD).collect();
    BitMatrix::from_bits(width, height, bits)
        .ok_or_else(|| anyhow!("{width}x{height} image has an unexpected number of pixels"))
}

//! The `fmp` bitmap font.
//!
//! An `fmp` file is a header-less array of glyphs. Each glyph is a black and white bitmap packed
//! at 4 bits per pixel, two pixels per byte with the low nibble holding the left pixel. Pixels are
//! stored row by row, top to bottom and left to right. The glyph at ordinal `i` draws the `fpd`
//! entry at index `i`.
//!
//! The glyph size is not stored in the file and must be supplied by the caller.

use core::fmt;

use crate::{
    codec::Codec,
    error::{Format, FormatError},
};

pub mod sheet;

/// The number of pixels packed into one byte.
const PIXELS_PER_BYTE: usize = 2;

/// The number of bits used by one pixel.
const BITS_PER_PIXEL: u32 = 4;

/// The mask selecting a single pixel from a byte.
const PIXEL_MASK: u8 = 0xF;

/// The width and height of a glyph in pixels.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq, PartialOrd, Ord)]
pub struct GlyphDimensions {
    /// The width of a glyph in pixels.
    pub width: usize,
    /// The height of a glyph in pixels.
    pub height: usize,
}

impl GlyphDimensions {
    /// Creates a new [`GlyphDimensions`].
    pub const fn new(width: usize, height: usize) -> Self {
        Self { width, height }
    }

    /// Returns the number of pixels in a glyph.
    pub const fn pixel_count(&self) -> usize {
        self.width * self.height
    }

    /// Returns the number of bytes a packed glyph occupies.
    pub const fn byte_count(&self) -> usize {
        self.pixel_count().div_ceil(PIXELS_PER_BYTE)
    }
}

impl fmt::Display for GlyphDimensions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl From<FmpSize> for GlyphDimensions {
    fn from(value: FmpSize) -> Self {
        Self::new(value.pixels(), value.pixels())
    }
}

/// The glyph sizes used by the games.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum FmpSize {
    /// 8x8 pixel glyphs.
    Small,
    /// 14x14 pixel glyphs.
    #[default]
    Large,
}

impl FmpSize {
    /// Returns the width and height of a glyph of this [`FmpSize`] in pixels.
    pub const fn pixels(&self) -> usize {
        match self {
            Self::Small => 8,
            Self::Large => 14,
        }
    }
}

/// A black and white glyph.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct GlyphBitmap {
    /// The size of the glyph.
    dimensions: GlyphDimensions,
    /// Row-major pixels, `true` when lit.
    pixels: Vec<bool>,
}

impl GlyphBitmap {
    /// Creates a new [`GlyphBitmap`] with every pixel unlit.
    pub fn new(dimensions: GlyphDimensions) -> Self {
        Self {
            dimensions,
            pixels: vec![false; dimensions.pixel_count()],
        }
    }

    /// Creates a new [`GlyphBitmap`] from row-major `pixels`, or `None` if the number of
    /// `pixels` does not match `dimensions`.
    pub fn from_pixels(dimensions: GlyphDimensions, pixels: Vec<bool>) -> Option<Self> {
        if pixels.len() != dimensions.pixel_count() {
            return None;
        }

        Some(Self { dimensions, pixels })
    }

    /// Returns the size of this [`GlyphBitmap`].
    pub const fn dimensions(&self) -> GlyphDimensions {
        self.dimensions
    }

    /// Returns whether the pixel at (`x`, `y`) is lit, or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.dimensions.width || y >= self.dimensions.height {
            return None;
        }

        Some(self.pixels[y * self.dimensions.width + x])
    }

    /// Lights or clears the pixel at (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if (`x`, `y`) is out of bounds.
    pub fn set(&mut self, x: usize, y: usize, lit: bool) {
        assert!(
            x < self.dimensions.width && y < self.dimensions.height,
            "pixel ({x}, {y}) is outside of a {} glyph",
            self.dimensions
        );

        self.pixels[y * self.dimensions.width + x] = lit;
    }

    /// Returns the row-major pixels of this [`GlyphBitmap`].
    pub fn pixels(&self) -> &[bool] {
        &self.pixels
    }

    /// Returns an [`Iterator`] over the rows of this [`GlyphBitmap`], top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &[bool]> {
        // `chunks` panics on a size of zero.
        self.pixels.chunks(self.dimensions.width.max(1))
    }

    /// Unpacks one glyph from its 4 bits per pixel form.
    ///
    /// Any non-zero nibble is treated as a lit pixel.
    fn unpack(dimensions: GlyphDimensions, bytes: &[u8]) -> Self {
        let pixels = bytes
            .iter()
            .flat_map(|byte| [byte & PIXEL_MASK, (byte >> BITS_PER_PIXEL) & PIXEL_MASK])
            .take(dimensions.pixel_count())
            .map(|nibble| nibble != 0)
            .collect();

        Self { dimensions, pixels }
    }

    /// Packs this glyph into its 4 bits per pixel form, appending it to `buffer`.
    fn pack(&self, buffer: &mut Vec<u8>) {
        buffer.extend(self.pixels.chunks(PIXELS_PER_BYTE).map(|pair| {
            let left = u8::from(pair[0]);
            let right = pair.get(1).copied().map_or(0, u8::from);

            (right << BITS_PER_PIXEL) | left
        }));
    }
}

/// An `fmp` bitmap font: glyphs of one uniform size in table order.
#[derive(Clone, Debug, Hash, PartialEq, Eq)]
pub struct Fmp {
    /// The size shared by every glyph.
    dimensions: GlyphDimensions,
    /// The glyphs in table order.
    glyphs: Vec<GlyphBitmap>,
}

impl Fmp {
    /// Creates a new [`Fmp`] whose glyphs are all of size `dimensions`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::DimensionMismatch`] if a glyph is not of size `dimensions`.
    pub fn new(dimensions: GlyphDimensions, glyphs: Vec<GlyphBitmap>) -> Result<Self, FormatError> {
        check_dimensions(dimensions, &glyphs)?;

        Ok(Self { dimensions, glyphs })
    }

    /// Returns the size shared by every glyph.
    pub const fn dimensions(&self) -> GlyphDimensions {
        self.dimensions
    }

    /// Returns the glyphs in table order.
    pub fn glyphs(&self) -> &[GlyphBitmap] {
        &self.glyphs
    }

    /// Returns the glyph at `ordinal`, or `None` if out of bounds.
    pub fn get(&self, ordinal: usize) -> Option<&GlyphBitmap> {
        self.glyphs.get(ordinal)
    }

    /// Returns the number of glyphs.
    pub fn len(&self) -> usize {
        self.glyphs.len()
    }

    /// Returns `true` if there are no glyphs.
    pub fn is_empty(&self) -> bool {
        self.glyphs.is_empty()
    }

    /// Consumes the [`Fmp`], returning its glyphs.
    pub fn into_glyphs(self) -> Vec<GlyphBitmap> {
        self.glyphs
    }
}

impl Codec for Fmp {
    type Options = GlyphDimensions;

    /// Decodes an `fmp` file of glyphs of size `dimensions`.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::MalformedRecord`] if `dimensions` is empty or the length of
    /// `bytes` is not a multiple of the packed glyph size.
    fn decode(bytes: &[u8], dimensions: GlyphDimensions) -> Result<Self, FormatError> {
        let glyph_size = dimensions.byte_count();
        if glyph_size == 0 {
            return Err(FormatError::malformed(
                Format::Fmp,
                format!("{dimensions} glyphs hold no pixels"),
            ));
        }

        if bytes.len() % glyph_size != 0 {
            return Err(FormatError::malformed(
                Format::Fmp,
                format!(
                    "length {} is not a multiple of the {glyph_size} byte {dimensions} glyph size",
                    bytes.len()
                ),
            ));
        }

        let glyphs = bytes
            .chunks_exact(glyph_size)
            .map(|glyph| GlyphBitmap::unpack(dimensions, glyph))
            .collect();

        Ok(Self { dimensions, glyphs })
    }

    /// Packs every glyph in table order.
    ///
    /// # Errors
    ///
    /// Returns [`FormatError::DimensionMismatch`] if a glyph disagrees with the size of the
    /// table.
    fn encode(&self) -> Result<Vec<u8>, FormatError> {
        check_dimensions(self.dimensions, &self.glyphs)?;

        let mut bytes = Vec::with_capacity(self.glyphs.len() * self.dimensions.byte_count());
        for glyph in &self.glyphs {
            glyph.pack(&mut bytes);
        }

        Ok(bytes)
    }
}

/// Checks that every glyph in `glyphs` is of size `expected`.
pub(crate) fn check_dimensions(
    expected: GlyphDimensions,
    glyphs: &[GlyphBitmap],
) -> Result<(), FormatError> {
    match glyphs
        .iter()
        .enumerate()
        .find(|(_, glyph)| glyph.dimensions != expected)
    {
        Some((ordinal, glyph)) => Err(FormatError::DimensionMismatch {
            ordinal,
            expected,
            found: glyph.dimensions,
        }),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use pretty_assertions::assert_eq;

    use super::*;

    /// Builds a glyph whose pixel at (x, y) is lit when `lit(x, y)` holds.
    fn glyph(dimensions: GlyphDimensions, lit: impl Fn(usize, usize) -> bool) -> GlyphBitmap {
        let mut glyph = GlyphBitmap::new(dimensions);
        for y in 0..dimensions.height {
            for x in 0..dimensions.width {
                glyph.set(x, y, lit(x, y));
            }
        }

        glyph
    }

    #[test]
    fn glyph_sizes() {
        assert_eq!(GlyphDimensions::from(FmpSize::Small).byte_count(), 32);
        assert_eq!(GlyphDimensions::from(FmpSize::Large).byte_count(), 98);
        assert_eq!(GlyphDimensions::new(3, 3).byte_count(), 5);
    }

    #[test]
    fn low_nibble_is_left_pixel() {
        let dimensions = GlyphDimensions::new(4, 1);
        let fmp = Fmp::decode(&[0x01, 0x10], dimensions).unwrap();

        assert_eq!(fmp.glyphs()[0].pixels(), [true, false, false, true]);
        assert_eq!(fmp.encode().unwrap(), [0x01, 0x10]);
    }

    #[test]
    fn non_zero_nibbles_are_lit() {
        let fmp = Fmp::decode(&[0xF2, 0x08], GlyphDimensions::new(4, 1)).unwrap();

        assert_eq!(fmp.glyphs()[0].pixels(), [true, true, true, false]);
        assert_eq!(fmp.encode().unwrap(), [0x11, 0x01]);
    }

    #[test]
    fn round_trips_small_and_large_glyphs() {
        for size in [FmpSize::Small, FmpSize::Large] {
            let dimensions = GlyphDimensions::from(size);
            let glyphs = vec![
                glyph(dimensions, |x, y| x == y),
                glyph(dimensions, |x, _| x % 3 == 0),
                GlyphBitmap::new(dimensions),
            ];
            let fmp = Fmp::new(dimensions, glyphs).unwrap();

            let bytes = fmp.encode().unwrap();
            assert_eq!(bytes.len(), 3 * dimensions.byte_count());
            assert_eq!(Fmp::decode(&bytes, dimensions).unwrap(), fmp);
        }
    }

    #[test]
    fn rows_are_filled_left_to_right_top_to_bottom() {
        let dimensions = GlyphDimensions::new(2, 2);
        let fmp = Fmp::decode(&[0x10, 0x01], dimensions).unwrap();
        let rows = fmp.glyphs()[0].rows().collect::<Vec<_>>();

        assert_eq!(rows, [[false, true], [true, false]]);
        assert_eq!(fmp.glyphs()[0].get(1, 0), Some(true));
        assert_eq!(fmp.glyphs()[0].get(2, 0), None);
    }

    #[test]
    fn rejects_partial_glyphs() {
        let error = Fmp::decode(&[0; 31], FmpSize::Small.into()).unwrap_err();
        assert!(matches!(
            error,
            FormatError::MalformedRecord {
                format: Format::Fmp,
                ..
            }
        ));

        assert!(Fmp::decode(&[0; 64], FmpSize::Small.into()).is_ok());
        assert!(Fmp::decode(&[], GlyphDimensions::new(0, 8)).is_err());
    }

    #[test]
    fn rejects_mismatched_glyphs() {
        let small = GlyphDimensions::from(FmpSize::Small);
        let large = GlyphDimensions::from(FmpSize::Large);

        let error = Fmp::new(small, vec![GlyphBitmap::new(small), GlyphBitmap::new(large)]);
        assert_eq!(
            error,
            Err(FormatError::DimensionMismatch {
                ordinal: 1,
                expected: small,
                found: large,
            })
        );
    }

    #[test]
    fn odd_pixel_counts_pad_the_last_byte() {
        let dimensions = GlyphDimensions::new(3, 1);
        let fmp = Fmp::new(dimensions, vec![glyph(dimensions, |_, _| true)]).unwrap();

        assert_eq!(fmp.encode().unwrap(), [0x11, 0x01]);
        assert_eq!(Fmp::decode(&[0x11, 0x01], dimensions).unwrap(), fmp);
    }
}

//! The sheet form of an `fmp` bitmap font.
//!
//! A sheet lays every glyph out in a grid of equally sized cells, left to right and top to
//! bottom, with `padding` unlit pixels around each glyph. The sheet itself is a [`BitMatrix`];
//! turning it into an actual image file is left to the caller.

use crate::{
    error::{Format, FormatError},
    fmp::{GlyphBitmap, GlyphDimensions, check_dimensions},
};

/// The padding placed around every glyph unless told otherwise.
pub const DEFAULT_PADDING: usize = 1;

/// A two dimensional matrix of black and white pixels.
#[derive(Clone, Debug, Default, Hash, PartialEq, Eq)]
pub struct BitMatrix {
    /// The width of the matrix in pixels.
    width: usize,
    /// The height of the matrix in pixels.
    height: usize,
    /// Row-major pixels, `true` when lit.
    bits: Vec<bool>,
}

impl BitMatrix {
    /// Creates a new [`BitMatrix`] with every pixel unlit.
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            bits: vec![false; width * height],
        }
    }

    /// Creates a new [`BitMatrix`] from row-major `bits`, or `None` if the number of `bits` does
    /// not match `width` and `height`.
    pub fn from_bits(width: usize, height: usize, bits: Vec<bool>) -> Option<Self> {
        if bits.len() != width.checked_mul(height)? {
            return None;
        }

        Some(Self {
            width,
            height,
            bits,
        })
    }

    /// Returns the width of the matrix in pixels.
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Returns the height of the matrix in pixels.
    pub const fn height(&self) -> usize {
        self.height
    }

    /// Returns the row-major pixels of the matrix.
    pub fn bits(&self) -> &[bool] {
        &self.bits
    }

    /// Returns whether the pixel at (`x`, `y`) is lit, or `None` if out of bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<bool> {
        if x >= self.width || y >= self.height {
            return None;
        }

        Some(self.bits[y * self.width + x])
    }

    /// Lights or clears the pixel at (`x`, `y`).
    ///
    /// # Panics
    ///
    /// Panics if (`x`, `y`) is out of bounds.
    pub fn set(&mut self, x: usize, y: usize, lit: bool) {
        assert!(
            x < self.width && y < self.height,
            "pixel ({x}, {y}) is outside of a {}x{} matrix",
            self.width,
            self.height
        );

        self.bits[y * self.width + x] = lit;
    }
}

/// How the grid of a sheet is shaped when the glyph count is not a square number.
#[derive(Clone, Copy, Debug, Default, Hash, PartialEq, Eq)]
pub enum Orientation {
    /// At least as many rows as columns.
    #[default]
    Portrait,
    /// At least as many columns as rows.
    Landscape,
}

/// How glyphs are laid out on a sheet.
#[derive(Clone, Copy, Debug, Hash, PartialEq, Eq)]
pub struct SheetLayout {
    /// The number of unlit pixels placed around each glyph.
    pub padding: usize,
    /// The shape of the grid.
    pub orientation: Orientation,
}

impl Default for SheetLayout {
    fn default() -> Self {
        Self {
            padding: DEFAULT_PADDING,
            orientation: Orientation::default(),
        }
    }
}

/// Returns the number of columns and rows used to lay out `count` glyphs.
///
/// The grid is the divisor pair of `count` closest to a square, so every cell holds a glyph.
pub fn grid_shape(count: usize, orientation: Orientation) -> (usize, usize) {
    let narrow = (1..=count.isqrt())
        .rev()
        .find(|divisor| count % divisor == 0)
        .unwrap_or(0);
    let wide = count.checked_div(narrow).unwrap_or(0);

    match orientation {
        Orientation::Portrait => (narrow, wide),
        Orientation::Landscape => (wide, narrow),
    }
}

/// Lays `glyphs` out on a sheet.
///
/// # Errors
///
/// Returns [`FormatError::DimensionMismatch`] if the glyphs are not all of the same size.
pub fn to_sheet(glyphs: &[GlyphBitmap], layout: SheetLayout) -> Result<BitMatrix, FormatError> {
    let Some(first) = glyphs.first() else {
        return Ok(BitMatrix::default());
    };
    let dimensions = first.dimensions();
    check_dimensions(dimensions, glyphs)?;

    let (columns, rows) = grid_shape(glyphs.len(), layout.orientation);
    let cell_width = dimensions.width + 2 * layout.padding;
    let cell_height = dimensions.height + 2 * layout.padding;

    let mut sheet = BitMatrix::new(columns * cell_width, rows * cell_height);
    for (ordinal, glyph) in glyphs.iter().enumerate() {
        let left = (ordinal % columns) * cell_width + layout.padding;
        let top = (ordinal / columns) * cell_height + layout.padding;

        for (y, row) in glyph.rows().enumerate() {
            for (x, &lit) in row.iter().enumerate() {
                sheet.set(left + x, top + y, lit);
            }
        }
    }

    Ok(sheet)
}

/// Cuts a sheet back into glyphs of size `dimensions`, ignoring the `padding` around each one.
///
/// # Errors
///
/// Returns [`FormatError::IrValidation`] if the sheet is not an exact grid of cells.
pub fn from_sheet(
    sheet: &BitMatrix,
    dimensions: GlyphDimensions,
    padding: usize,
) -> Result<Vec<GlyphBitmap>, FormatError> {
    let cell_width = dimensions.width + 2 * padding;
    let cell_height = dimensions.height + 2 * padding;

    if cell_width == 0 || cell_height == 0 {
        return Err(FormatError::invalid_ir(Format::Sheet, "cells hold no pixels"));
    }

    if sheet.width % cell_width != 0 || sheet.height % cell_height != 0 {
        return Err(FormatError::invalid_ir(
            Format::Sheet,
            format!(
                "a {}x{} sheet is not a grid of {cell_width}x{cell_height} cells \
                 ({dimensions} glyphs with {padding} pixels of padding)",
                sheet.width, sheet.height
            ),
        ));
    }

    let columns = sheet.width / cell_width;
    let rows = sheet.height / cell_height;

    let mut glyphs = Vec::with_capacity(columns * rows);
    for row in 0..rows {
        for column in 0..columns {
            let left = column * cell_width + padding;
            let top = row * cell_height + padding;

            let mut glyph = GlyphBitmap::new(dimensions);
            for y in 0..dimensions.height {
                for x in 0..dimensions.width {
                    glyph.set(x, y, sheet.bits[(top + y) * sheet.width + left + x]);
                }
            }
            glyphs.push(glyph);
        }
    }

    Ok(glyphs)
}

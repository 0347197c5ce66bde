//! The `puyo-formats` crate provides codecs for the binary file formats of the legacy Puyo Puyo
//! games, along with the editable forms that those files are converted to and created from.
//!
//! # Formats
//!
//! ## `fpd`
//!
//! A character table mapping indices to UTF-16 code units and widths. See [`fpd`] for the binary
//! layout, [`fpd::csv`] for the CSV form and [`fpd::text`] for the UTF-16 text form.
//!
//! ## `fmp`
//!
//! A bitmap font of 4-bit pixels, indexed the same way as its `fpd` character table. See
//! [`fmp`] for the binary layout and [`fmp::sheet`] for laying glyphs out on a single image.
//!
//! ## `mtx`
//!
//! A dialog script made of strings of character indices and control codes. See [`mtx`] for the
//! binary layout, [`mtx::script`] for resolving indices against an `fpd` table and [`mtx::xml`]
//! for the XML form.
//!
//! ## LZ11
//!
//! The compression the Nintendo DS and 3DS releases wrap their files in. See [`lz11`].
//!
//! # Capabilities
//!
//! Every codec works on fully materialized byte buffers through the [`Codec`] trait. The crate
//! never touches the file system and never logs, leaving both to its callers.
//!
//! This crate contains zero unsafe blocks of code.

#![forbid(unsafe_code)]

pub mod codec;
pub mod error;
pub mod fmp;
pub mod fpd;
pub mod lz11;
pub mod mtx;

pub use codec::Codec;
pub use error::{Format, FormatError, StreamError};
pub use fmp::{Fmp, FmpSize, GlyphBitmap, GlyphDimensions};
pub use fpd::{CharacterEntry, FpdIndex};
pub use mtx::{Mtx, OffsetWidth, script::Script};

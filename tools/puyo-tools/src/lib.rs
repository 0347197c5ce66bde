//! Command line front end of `puyo-formats`.
//!
//! Converts the files of older Puyo Puyo games to editable forms and creates them back, reading
//! and writing the file system and reporting progress through [`log`].

pub mod action;
pub mod cli;
pub mod raster;

use anyhow::Result;
use cli::Action;

/// Carries out `action`.
///
/// # Errors
///
/// Returns the error of the failed [`Action`].
pub fn run(action: &Action) -> Result<()> {
    match action {
        Action::ConvertFpd(config) => action::convert::convert_fpd(config),
        Action::ConvertFmp(config) => action::convert::convert_fmp(config),
        Action::ConvertMtx(config) => action::convert::convert_mtx(config),
        Action::CreateFpd(config) => action::create::create_fpd(config),
        Action::CreateFmp(config) => action::create::create_fmp(config),
        Action::CreateMtx(config) => action::create::create_mtx(config),
        Action::DecompressLz11(config) => action::decompress::decompress_lz11(config),
    }
}

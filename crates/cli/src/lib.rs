//! # glr-cli: GLR Template Filling from the Command Line
//!
//! Each sub-module holds the arguments and handler of one sub-command.

pub mod fill;
pub mod placeholders;
pub mod text;

use anyhow::{Context, Result};
use std::path::Path;

/// Reads a whole input file, naming it in the error.
pub(crate) fn read_input(path: &Path) -> Result<Vec<u8>> {
    std::fs::read(path).with_context(|| format!("Could not read '{}'", path.display()))
}

/// The file name part of `path`, for messages and report listings.
pub(crate) fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

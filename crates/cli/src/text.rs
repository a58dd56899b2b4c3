use crate::{display_name, read_input};
use anyhow::{bail, Result};
use clap::Parser;
use glr_pdf::{combine_reports, CombinedText};
use std::path::PathBuf;

#[derive(Parser, Debug)]
pub struct TextArgs {
    /// The report PDFs, combined in the order given
    #[arg(required = true, num_args = 1..)]
    pub pdfs: Vec<PathBuf>,
}

/// Reads and combines the text of `pdfs`, warning about the ones without text.
pub fn combine_files(pdfs: &[PathBuf]) -> Result<CombinedText> {
    let mut files = Vec::with_capacity(pdfs.len());
    for path in pdfs {
        files.push((display_name(path), read_input(path)?));
    }

    let combined = combine_reports(
        files
            .iter()
            .map(|(name, data)| (name.as_str(), data.as_slice())),
    );
    for name in &combined.skipped {
        eprintln!("⚠️  No text found in {name}; skipped (not OCR version).");
    }
    Ok(combined)
}

pub fn handle_text(args: &TextArgs) -> Result<()> {
    let combined = combine_files(&args.pdfs)?;
    if combined.text.is_empty() {
        bail!("None of the given PDFs contain extractable text.");
    }
    println!("{}", combined.text);
    Ok(())
}

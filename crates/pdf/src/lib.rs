//! # glr-pdf: Report Text Extraction
//!
//! This crate pulls the raw text out of text-based inspection report PDFs and
//! combines several reports into the single text block the extraction modes
//! work on. Image-only PDFs carry no text operators; they come back empty and
//! are skipped.

use pdf::content::{Op, TextDrawAdjusted};
use pdf::file::FileOptions;
use thiserror::Error;
use tracing::{info, instrument, warn};

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum PdfExtractError {
    #[error("Failed to parse PDF content: {0}")]
    PdfParse(String),
}

// --- Data Structures ---

/// The combined text of several reports.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CombinedText {
    /// Texts of every report that yielded any, in upload order, separated by a blank line.
    pub text: String,
    /// Names of the reports that were skipped because no text was found.
    pub skipped: Vec<String>,
}

/// TJ spacing (thousandths of an em) beyond which a gap is read as a word break.
const WORD_GAP_THRESHOLD: f32 = -200.0;

// --- Core Extraction Logic ---

/// Extracts text from all pages of a PDF synchronously.
///
/// Line-moving operators start a new line. Pages without text are left out and
/// the remaining pages are separated by a blank line.
pub fn extract_text(pdf_data: &[u8]) -> Result<String, PdfExtractError> {
    let file = FileOptions::cached()
        .load(pdf_data)
        .map_err(|e| PdfExtractError::PdfParse(e.to_string()))?;
    let resolver = file.resolver();
    let mut pages = Vec::new();

    for page_num in 0..file.num_pages() {
        let page = file
            .get_page(page_num)
            .map_err(|e| PdfExtractError::PdfParse(e.to_string()))?;
        let Some(content) = &page.contents else {
            continue;
        };
        let operations = content
            .operations(&resolver)
            .map_err(|e| PdfExtractError::PdfParse(e.to_string()))?;
        let text = page_text(&operations);
        if !text.trim().is_empty() {
            pages.push(text);
        }
    }
    Ok(pages.join("\n\n"))
}

fn page_text(operations: &[Op]) -> String {
    let mut lines = LineBuffer::default();
    for op in operations {
        match op {
            Op::TextDraw { text } => lines.push(&text.to_string_lossy()),
            Op::TextDrawAdjusted { array } => {
                for item in array {
                    match item {
                        TextDrawAdjusted::Text(text) => lines.push(&text.to_string_lossy()),
                        TextDrawAdjusted::Spacing(gap) if *gap < WORD_GAP_THRESHOLD => {
                            lines.space()
                        }
                        TextDrawAdjusted::Spacing(_) => {}
                    }
                }
            }
            Op::MoveTextPosition { translation } if translation.y != 0.0 => lines.break_line(),
            Op::MoveTextPosition { .. } => lines.space(),
            Op::TextNewline | Op::SetTextMatrix { .. } | Op::BeginText => lines.break_line(),
            _ => {}
        }
    }
    lines.finish()
}

/// Accumulates drawn text, collapsing redundant line breaks and spaces.
#[derive(Default)]
struct LineBuffer {
    lines: Vec<String>,
    current: String,
}

impl LineBuffer {
    fn push(&mut self, text: &str) {
        self.current.push_str(text);
    }

    fn space(&mut self) {
        if !self.current.is_empty() && !self.current.ends_with(char::is_whitespace) {
            self.current.push(' ');
        }
    }

    fn break_line(&mut self) {
        if !self.current.trim().is_empty() {
            self.lines.push(self.current.trim_end().to_string());
        }
        self.current.clear();
    }

    fn finish(mut self) -> String {
        self.break_line();
        self.lines.join("\n")
    }
}

/// Extracts and combines the text of several reports, in order.
///
/// A report that fails to parse or yields only whitespace is skipped with a
/// warning and recorded in [`CombinedText::skipped`].
#[instrument(skip_all)]
pub fn combine_reports<'a, I>(reports: I) -> CombinedText
where
    I: IntoIterator<Item = (&'a str, &'a [u8])>,
{
    let mut texts = Vec::new();
    let mut skipped = Vec::new();

    for (name, data) in reports {
        let text = match extract_text(data) {
            Ok(text) => text,
            Err(e) => {
                warn!("Could not read '{}': {}", name, e);
                String::new()
            }
        };
        if text.trim().is_empty() {
            warn!("No text found in '{}'; skipped (not an OCR version).", name);
            skipped.push(name.to_string());
        } else {
            info!("Extracted {} characters from '{}'.", text.len(), name);
            texts.push(text);
        }
    }

    CombinedText {
        text: texts.join("\n\n"),
        skipped,
    }
}

/// Returns at most the first `max_chars` characters of `text`.
pub fn preview(text: &str, max_chars: usize) -> &str {
    match text.char_indices().nth(max_chars) {
        Some((byte_index, _)) => &text[..byte_index],
        None => text,
    }
}

//! # glr-docx: Word Template Handling
//!
//! Finds `[TOKEN]` placeholders in a `.docx` template and writes a filled copy.
//! The main document body (tables included), headers and footers are all
//! searched and filled. Tokens split across formatting runs are found, and a
//! filled paragraph keeps the formatting of its first run.

mod paragraph;
mod placeholder;

use chrono::NaiveDateTime;
use regex::Regex;
use std::collections::{BTreeMap, BTreeSet};
use std::io::{Cursor, Read, Write};
use std::sync::LazyLock;
use thiserror::Error;
use tracing::{debug, instrument, warn};
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipArchive, ZipWriter};

pub use placeholder::{collect_placeholders, replace_placeholders};

/// MIME type of a Word document.
pub const DOCX_MIME: &str =
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document";

const DOCUMENT_PART: &str = "word/document.xml";

/// Largest uncompressed size accepted for a single text part (32 MiB).
pub const MAX_PART_BYTES: usize = 32 * 1024 * 1024;

static HEADER_FOOTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^word/(header|footer)\d*\.xml$").unwrap());

// --- Error Definitions ---

#[derive(Error, Debug)]
pub enum DocxError {
    #[error("Not a valid .docx package: {0}")]
    Zip(#[from] zip::result::ZipError),
    #[error("I/O error while processing template: {0}")]
    Io(#[from] std::io::Error),
    #[error("Malformed document XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("Template has no main document part (word/document.xml)")]
    MissingDocumentPart,
    #[error("Template part '{name}' is larger than {limit} bytes when uncompressed")]
    PartTooLarge { name: String, limit: usize },
}

// --- Template ---

/// A loaded `.docx` template.
#[derive(Debug, Clone)]
pub struct DocxTemplate {
    bytes: Vec<u8>,
    /// Text parts that may hold placeholders, main document first.
    parts: Vec<(String, Vec<u8>)>,
}

impl DocxTemplate {
    /// Opens a template from the raw bytes of a `.docx` file.
    ///
    /// Fails when the bytes are not a zip package, the main document part is
    /// missing, or a text part inflates past [`MAX_PART_BYTES`].
    pub fn from_bytes(bytes: impl Into<Vec<u8>>) -> Result<Self, DocxError> {
        Self::from_bytes_with_limit(bytes, MAX_PART_BYTES)
    }

    /// Like [`DocxTemplate::from_bytes`], with a custom cap on each part's uncompressed size.
    pub fn from_bytes_with_limit(
        bytes: impl Into<Vec<u8>>,
        part_limit: usize,
    ) -> Result<Self, DocxError> {
        let bytes = bytes.into();
        let mut archive = ZipArchive::new(Cursor::new(bytes.as_slice()))?;

        let mut names: Vec<String> = archive
            .file_names()
            .filter(|name| HEADER_FOOTER_RE.is_match(name))
            .map(str::to_string)
            .collect();
        names.sort();
        names.insert(0, DOCUMENT_PART.to_string());

        let mut parts = Vec::with_capacity(names.len());
        for name in names {
            let mut file = match archive.by_name(&name) {
                Ok(file) => file,
                Err(zip::result::ZipError::FileNotFound) if name == DOCUMENT_PART => {
                    return Err(DocxError::MissingDocumentPart)
                }
                Err(e) => return Err(e.into()),
            };
            // The declared size is untrusted; read at most one byte past the cap.
            let mut content = Vec::new();
            file.by_ref()
                .take(part_limit as u64 + 1)
                .read_to_end(&mut content)?;
            if content.len() > part_limit {
                return Err(DocxError::PartTooLarge {
                    name,
                    limit: part_limit,
                });
            }
            parts.push((name, content));
        }

        drop(archive);
        Ok(Self { bytes, parts })
    }

    /// Returns the unique placeholder names in the template, sorted.
    ///
    /// A header or footer that cannot be parsed is skipped with a warning; a
    /// malformed main document is an error.
    #[instrument(skip_all)]
    pub fn placeholders(&self) -> Result<Vec<String>, DocxError> {
        let mut found = BTreeSet::new();
        for (name, xml) in &self.parts {
            let result = paragraph::for_each_paragraph(xml, |text| {
                collect_placeholders(text, &mut found)
            });
            match result {
                Ok(()) => {}
                Err(e) if name != DOCUMENT_PART => warn!("Skipping '{}': {}", name, e),
                Err(e) => return Err(e),
            }
        }
        debug!("Found {} placeholders.", found.len());
        Ok(found.into_iter().collect())
    }

    /// Writes a copy of the template with every mapped placeholder replaced.
    ///
    /// Placeholders without an entry in `mapping` are left as they are. Package
    /// entries that contain no replaced text are copied over unchanged.
    #[instrument(skip_all, fields(fields = mapping.len()))]
    pub fn fill(&self, mapping: &BTreeMap<String, String>) -> Result<Vec<u8>, DocxError> {
        let mut rewritten: BTreeMap<&str, Vec<u8>> = BTreeMap::new();
        for (name, xml) in &self.parts {
            let result = paragraph::rewrite_paragraphs(xml, |text| {
                match replace_placeholders(text, mapping) {
                    std::borrow::Cow::Owned(new_text) => Some(new_text),
                    std::borrow::Cow::Borrowed(_) => None,
                }
            });
            match result {
                Ok(Some(new_xml)) => {
                    debug!("Filled placeholders in '{}'.", name);
                    rewritten.insert(name.as_str(), new_xml);
                }
                Ok(None) => {}
                Err(e) if name != DOCUMENT_PART => warn!("Leaving '{}' unfilled: {}", name, e),
                Err(e) => return Err(e),
            }
        }

        let mut archive = ZipArchive::new(Cursor::new(self.bytes.as_slice()))?;
        let mut writer = ZipWriter::new(Cursor::new(Vec::with_capacity(self.bytes.len())));
        let options = SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);

        for index in 0..archive.len() {
            let entry = archive.by_index_raw(index)?;
            match rewritten.get(entry.name()) {
                Some(content) => {
                    let name = entry.name().to_string();
                    drop(entry);
                    writer.start_file(name, options)?;
                    writer.write_all(content)?;
                }
                None => writer.raw_copy_file(entry)?,
            }
        }

        Ok(writer.finish()?.into_inner())
    }
}

/// Lists the placeholders of a `.docx` template given as raw bytes.
pub fn find_placeholders(docx: &[u8]) -> Result<Vec<String>, DocxError> {
    DocxTemplate::from_bytes(docx)?.placeholders()
}

/// Fills a `.docx` template given as raw bytes.
pub fn fill_docx(docx: &[u8], mapping: &BTreeMap<String, String>) -> Result<Vec<u8>, DocxError> {
    DocxTemplate::from_bytes(docx)?.fill(mapping)
}

/// Name for a filled report produced at `now`: `filled_glr_YYYYMMDD_HHMMSS.docx`.
pub fn output_file_name(now: NaiveDateTime) -> String {
    format!("filled_glr_{}.docx", now.format("%Y%m%d_%H%M%S"))
}

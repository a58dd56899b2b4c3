use anyhow::Result;
use async_trait::async_trait;
use glr::providers::ai::AiProvider;
use glr::{GenerationOptions, PromptError};
use std::collections::HashMap;
use std::fmt::Debug;
use std::sync::{Arc, Mutex};

// --- Mock AI Provider ---

#[derive(Clone, Debug)]
pub struct MockAiProvider {
    responses: Arc<Mutex<HashMap<String, String>>>,
    calls: Arc<Mutex<Vec<(String, String)>>>,
}

impl MockAiProvider {
    pub fn new() -> Self {
        Self {
            responses: Arc::new(Mutex::new(HashMap::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Pre-programs a response for a specific prompt.
    /// The key should be a unique substring of the system prompt.
    pub fn add_response(&self, key: &str, response: &str) {
        let mut responses = self.responses.lock().unwrap();
        responses.insert(key.to_string(), response.to_string());
    }

    /// Retrieves the recorded calls for assertion.
    pub fn get_calls(&self) -> Vec<(String, String)> {
        self.calls.lock().unwrap().clone()
    }
}

impl Default for MockAiProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl AiProvider for MockAiProvider {
    async fn generate(
        &self,
        system_prompt: &str,
        user_prompt: &str,
        _options: GenerationOptions,
    ) -> Result<String, PromptError> {
        let mut calls = self.calls.lock().unwrap();
        calls.push((system_prompt.to_string(), user_prompt.to_string()));

        let responses = self.responses.lock().unwrap();
        for (key, response) in responses.iter() {
            if system_prompt.contains(key) {
                return Ok(response.clone());
            }
        }

        Err(PromptError::AiApi(format!(
            "MockAiProvider: No response programmed for system prompt. Got: '{system_prompt}'"
        )))
    }
}

// --- Test-Specific Helpers ---
pub mod helpers {
    use anyhow::Result;
    use pdf_writer::{Content, Finish, Name, Pdf, Rect, Ref, Str};
    use std::io::{Cursor, Write};
    use zip::write::SimpleFileOptions;
    use zip::{CompressionMethod, ZipWriter};

    /// Generates a PDF with one page per entry of `pages`, each showing its lines in Helvetica.
    ///
    /// A page with no lines still gets an (empty) content stream, which is how
    /// scanned, image-only reports look to a text extractor.
    pub fn generate_test_pdf(pages: &[&[&str]]) -> Result<Vec<u8>> {
        let mut pdf = Pdf::new();

        let catalog_id = Ref::new(1);
        let page_tree_id = Ref::new(2);
        let font_id = Ref::new(3);
        let font_name = Name(b"F1");

        let page_ids: Vec<Ref> = (0..pages.len())
            .map(|i| Ref::new(4 + 2 * i as i32))
            .collect();

        pdf.catalog(catalog_id).pages(page_tree_id);
        pdf.pages(page_tree_id)
            .kids(page_ids.iter().copied())
            .count(pages.len() as i32);
        pdf.type1_font(font_id).base_font(Name(b"Helvetica"));

        for (lines, page_id) in pages.iter().zip(&page_ids) {
            let content_id = Ref::new(page_id.get() + 1);

            let mut page = pdf.page(*page_id);
            page.media_box(Rect::new(0.0, 0.0, 595.0, 842.0));
            page.parent(page_tree_id);
            page.contents(content_id);
            page.resources().fonts().pair(font_name, font_id);
            page.finish();

            let mut content = Content::new();
            if !lines.is_empty() {
                content.begin_text();
                content.set_font(font_name, 12.0);
                content.next_line(72.0, 760.0);
                for (i, line) in lines.iter().enumerate() {
                    if i > 0 {
                        content.next_line(0.0, -16.0);
                    }
                    content.show(Str(line.as_bytes()));
                }
                content.end_text();
            }
            pdf.stream(content_id, &content.finish());
        }

        Ok(pdf.finish())
    }

    fn escape_xml(text: &str) -> String {
        text.replace('&', "&amp;")
            .replace('<', "&lt;")
            .replace('>', "&gt;")
    }

    fn run(text: &str, bold: bool) -> String {
        let props = if bold { "<w:rPr><w:b/></w:rPr>" } else { "" };
        format!(
            r#"<w:r>{props}<w:t xml:space="preserve">{}</w:t></w:r>"#,
            escape_xml(text)
        )
    }

    const W_NS: &str = r#"xmlns:w="http://schemas.openxmlformats.org/wordprocessingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships""#;

    /// Assembles a minimal but well-formed `.docx` package for tests.
    #[derive(Debug, Default, Clone)]
    pub struct DocxBuilder {
        body: Vec<String>,
        header: Option<String>,
        footer: Option<String>,
    }

    impl DocxBuilder {
        pub fn new() -> Self {
            Self::default()
        }

        /// Adds a paragraph with a single run.
        pub fn paragraph(mut self, text: &str) -> Self {
            self.body.push(format!("<w:p>{}</w:p>", run(text, false)));
            self
        }

        /// Adds a paragraph whose text is split across runs, alternating bold and plain,
        /// the way Word stores text that was edited piecemeal.
        pub fn split_paragraph(mut self, parts: &[&str]) -> Self {
            let runs: String = parts
                .iter()
                .enumerate()
                .map(|(i, part)| run(part, i % 2 == 0))
                .collect();
            self.body.push(format!("<w:p><w:pPr><w:jc w:val=\"center\"/></w:pPr>{runs}</w:p>"));
            self
        }

        /// Adds a one-row table with one paragraph per cell.
        pub fn table_row(mut self, cells: &[&str]) -> Self {
            let cells: String = cells
                .iter()
                .map(|cell| format!("<w:tc><w:p>{}</w:p></w:tc>", run(cell, false)))
                .collect();
            self.body.push(format!("<w:tbl><w:tr>{cells}</w:tr></w:tbl>"));
            self
        }

        pub fn header(mut self, text: &str) -> Self {
            self.header = Some(text.to_string());
            self
        }

        pub fn footer(mut self, text: &str) -> Self {
            self.footer = Some(text.to_string());
            self
        }

        pub fn build(self) -> Result<Vec<u8>> {
            let mut parts: Vec<(String, String)> = Vec::new();
            let mut relationships = String::new();
            let mut overrides = String::new();
            let mut section_refs = String::new();

            for (kind, text) in [("header", &self.header), ("footer", &self.footer)] {
                let Some(text) = text else { continue };
                let tag = if kind == "header" { "hdr" } else { "ftr" };
                parts.push((
                    format!("word/{kind}1.xml"),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:{tag} {W_NS}><w:p>{}</w:p></w:{tag}>"#,
                        run(text, false)
                    ),
                ));
                relationships.push_str(&format!(
                    r#"<Relationship Id="rId{kind}" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/{kind}" Target="{kind}1.xml"/>"#
                ));
                overrides.push_str(&format!(
                    r#"<Override PartName="/word/{kind}1.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.{kind}+xml"/>"#
                ));
                section_refs.push_str(&format!(
                    r#"<w:{kind}Reference w:type="default" r:id="rId{kind}"/>"#
                ));
            }

            parts.push((
                "word/document.xml".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><w:document {W_NS}><w:body>{}<w:sectPr>{section_refs}</w:sectPr></w:body></w:document>"#,
                    self.body.concat()
                ),
            ));
            parts.push((
                "word/_rels/document.xml.rels".to_string(),
                format!(
                    r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships">{relationships}</Relationships>"#
                ),
            ));
            parts.push((
                "_rels/.rels".to_string(),
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Relationships xmlns="http://schemas.openxmlformats.org/package/2006/relationships"><Relationship Id="rId1" Type="http://schemas.openxmlformats.org/officeDocument/2006/relationships/officeDocument" Target="word/document.xml"/></Relationships>"#.to_string(),
            ));
            parts.insert(
                0,
                (
                    "[Content_Types].xml".to_string(),
                    format!(
                        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?><Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/><Override PartName="/word/document.xml" ContentType="application/vnd.openxmlformats-officedocument.wordprocessingml.document.main+xml"/>{overrides}</Types>"#
                    ),
                ),
            );

            let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
            let options =
                SimpleFileOptions::default().compression_method(CompressionMethod::Deflated);
            for (name, content) in parts {
                writer.start_file(name, options)?;
                writer.write_all(content.as_bytes())?;
            }
            Ok(writer.finish()?.into_inner())
        }
    }
}

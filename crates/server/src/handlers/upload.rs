//! Reading the upload form shared by the template and extraction endpoints.

use super::AppError;
use axum_extra::extract::Multipart;
use glr::ExtractionMode;
use tracing::{info, warn};

pub(crate) const MISSING_TEMPLATE: &str = "Please upload a template (.docx)";
pub(crate) const MISSING_PDFS: &str = "Please upload at least one PDF";

/// One uploaded file.
pub(crate) struct UploadedFile {
    pub name: String,
    pub data: Vec<u8>,
}

/// The parts of the upload form. Empty file parts (nothing selected) are ignored.
#[derive(Default)]
pub(crate) struct UploadForm {
    pub template: Option<UploadedFile>,
    pub pdfs: Vec<UploadedFile>,
    pub mode: Option<String>,
}

impl UploadForm {
    pub async fn read(mut multipart: Multipart) -> Result<Self, AppError> {
        let mut form = UploadForm::default();

        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
        {
            let name = field.name().unwrap_or("").to_string();
            match name.as_str() {
                "template" | "pdfs" => {
                    let file_name = field.file_name().unwrap_or("upload").to_string();
                    let data = field
                        .bytes()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?
                        .to_vec();
                    if data.is_empty() {
                        continue;
                    }
                    info!("Received '{}' ({} bytes) as {}.", file_name, data.len(), name);
                    let file = UploadedFile {
                        name: file_name,
                        data,
                    };
                    if name == "template" {
                        form.template = Some(file);
                    } else {
                        form.pdfs.push(file);
                    }
                }
                "mode" => {
                    let mode = field
                        .text()
                        .await
                        .map_err(|e| AppError::BadRequest(format!("Malformed upload: {e}")))?;
                    form.mode = Some(mode);
                }
                _ => warn!("Ignoring unknown multipart field: {}", name),
            }
        }

        Ok(form)
    }

    pub fn require_template(&self) -> Result<&UploadedFile, AppError> {
        self.template
            .as_ref()
            .ok_or_else(|| AppError::BadRequest(MISSING_TEMPLATE.to_string()))
    }

    pub fn require_pdfs(&self) -> Result<&[UploadedFile], AppError> {
        if self.pdfs.is_empty() {
            return Err(AppError::BadRequest(MISSING_PDFS.to_string()));
        }
        Ok(&self.pdfs)
    }

    /// The requested mode; high accuracy when the form does not name one.
    pub fn mode(&self) -> Result<ExtractionMode, AppError> {
        match self.mode.as_deref().map(str::trim) {
            None | Some("") => Ok(ExtractionMode::HighAccuracy),
            Some(mode) => Ok(mode.parse()?),
        }
    }
}

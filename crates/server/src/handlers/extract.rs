//! # Extraction Handlers
//!
//! Template inspection and the full extract-and-fill run. Both extraction
//! endpoints share one upload form: a `template` file, one or more `pdfs`
//! files and an optional `mode`.

use super::upload::UploadForm;
use super::{wrap_response, ApiResponse, AppError, AppState, DebugParams};
use crate::types::{ExtractResponse, PlaceholdersResponse};
use axum::{
    extract::{Query, State},
    http::header,
    response::{IntoResponse, Response},
    Json,
};
use axum_extra::extract::Multipart;
use base64::{engine::general_purpose, Engine as _};
use chrono::Local;
use glr::{run_extraction, ExtractionReport};
use glr_docx::{output_file_name, DocxTemplate, DOCX_MIME};
use glr_pdf::{combine_reports, preview};
use serde_json::json;
use tracing::{info, warn};

/// Everything produced by one run, before it is shaped into a response.
struct ExtractionRun {
    placeholders: Vec<String>,
    skipped_files: Vec<String>,
    text: String,
    report: ExtractionReport,
    file_name: String,
    document: Vec<u8>,
    pdf_count: usize,
}

/// Handler for `POST /placeholders`: lists the placeholders of an uploaded template.
pub async fn placeholders_handler(
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<PlaceholdersResponse>>, AppError> {
    let form = UploadForm::read(multipart).await?;
    let template = form.require_template()?;
    let placeholders = DocxTemplate::from_bytes(template.data.as_slice())?.placeholders()?;
    info!(
        "Found {} placeholders in '{}'.",
        placeholders.len(),
        template.name
    );

    let debug_info = json!({
        "template": template.name,
        "size": template.data.len(),
    });
    Ok(wrap_response(
        PlaceholdersResponse { placeholders },
        debug_params,
        Some(debug_info),
    ))
}

/// Handler for `POST /extract`: runs the pipeline and returns the report with the
/// filled document embedded as base64.
pub async fn extract_handler(
    State(app_state): State<AppState>,
    debug_params: Query<DebugParams>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<ExtractResponse>>, AppError> {
    let run = run_upload(&app_state, multipart).await?;

    let debug_info = json!({
        "mode": run.report.mode,
        "model": app_state.config.provider.model_name,
        "pdf_count": run.pdf_count,
        "text_chars": run.text.chars().count(),
        "voting_rounds": app_state.config.extraction.voting_rounds,
    });

    let response = ExtractResponse {
        text_preview: preview(&run.text, app_state.config.extraction.preview_chars).to_string(),
        document_base64: general_purpose::STANDARD.encode(&run.document),
        placeholders: run.placeholders,
        skipped_files: run.skipped_files,
        report: run.report,
        file_name: run.file_name,
    };
    Ok(wrap_response(response, debug_params, Some(debug_info)))
}

/// Handler for `POST /extract/docx`: runs the pipeline and returns the filled
/// document as a download.
pub async fn extract_docx_handler(
    State(app_state): State<AppState>,
    multipart: Multipart,
) -> Result<Response, AppError> {
    let run = run_upload(&app_state, multipart).await?;
    let disposition = format!("attachment; filename=\"{}\"", run.file_name);

    Ok((
        [
            (header::CONTENT_TYPE, DOCX_MIME.to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        run.document,
    )
        .into_response())
}

async fn run_upload(app_state: &AppState, multipart: Multipart) -> Result<ExtractionRun, AppError> {
    let form = UploadForm::read(multipart).await?;
    let template_file = form.require_template()?;
    let pdfs = form.require_pdfs()?;
    let mode = form.mode()?;

    let template = DocxTemplate::from_bytes(template_file.data.as_slice())?;
    let placeholders = template.placeholders()?;
    info!(
        "Template '{}' has {} placeholders; {} PDFs uploaded; mode {}.",
        template_file.name,
        placeholders.len(),
        pdfs.len(),
        mode
    );

    let combined = combine_reports(
        pdfs.iter()
            .map(|pdf| (pdf.name.as_str(), pdf.data.as_slice())),
    );
    if combined.text.is_empty() {
        warn!("None of the uploaded PDFs contained text; relying on inference and defaults.");
    }

    let report = run_extraction(
        app_state.ai_provider.as_ref(),
        mode,
        &placeholders,
        &combined.text,
        &app_state.config.extraction.settings(),
        Local::now().date_naive(),
    )
    .await?;

    let document = template.fill(&report.mapping)?;
    let file_name = output_file_name(Local::now().naive_local());
    info!("Filled template as '{}'.", file_name);

    Ok(ExtractionRun {
        placeholders,
        skipped_files: combined.skipped,
        text: combined.text,
        report,
        file_name,
        document,
        pdf_count: pdfs.len(),
    })
}

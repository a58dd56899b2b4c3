use glr::ExtractionReport;
use serde::{Deserialize, Serialize};
use serde_json::Value;

#[derive(Debug, Deserialize, Default)]
pub struct DebugParams {
    pub debug: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct ApiResponse<T> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debug: Option<Value>,
    pub result: T,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct PlaceholdersResponse {
    pub placeholders: Vec<String>,
}

/// Result of a full extraction run.
#[derive(Serialize, Deserialize, Debug)]
pub struct ExtractResponse {
    pub placeholders: Vec<String>,
    /// Uploaded reports that had no extractable text.
    pub skipped_files: Vec<String>,
    /// The start of the combined report text.
    pub text_preview: String,
    pub report: ExtractionReport,
    pub file_name: String,
    /// The filled document, base64 encoded.
    pub document_base64: String,
}

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use glr::PromptError;
use glr_docx::DocxError;
use serde_json::json;
use tracing::{error, warn};

/// A custom error type for the server application.
///
/// This enum encapsulates different kinds of errors that can occur within the server,
/// allowing them to be converted into appropriate HTTP responses.
#[derive(Debug)]
pub enum AppError {
    /// The request itself is unusable (missing upload, unknown mode, malformed form).
    BadRequest(String),
    /// The uploaded template could not be read or written.
    Template(DocxError),
    /// Errors originating from the extraction library.
    Prompt(PromptError),
    /// Generic internal server errors.
    Internal(anyhow::Error),
}

impl From<PromptError> for AppError {
    fn from(err: PromptError) -> Self {
        AppError::Prompt(err)
    }
}

impl From<DocxError> for AppError {
    fn from(err: DocxError) -> Self {
        AppError::Template(err)
    }
}

impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        AppError::Internal(err)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status_code, error_message) = match self {
            AppError::BadRequest(message) => {
                warn!("Rejected request: {}", message);
                (StatusCode::BAD_REQUEST, message)
            }
            AppError::Template(err) => {
                warn!("Template error: {:?}", err);
                (
                    StatusCode::BAD_REQUEST,
                    format!("Could not process the template: {err}"),
                )
            }
            AppError::Prompt(err) => {
                error!("PromptError: {:?}", err);
                match err {
                    PromptError::UnknownMode(_) => (StatusCode::BAD_REQUEST, err.to_string()),
                    PromptError::MissingApiKey => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        "Server is not configured correctly: no API key for the AI provider."
                            .to_string(),
                    ),
                    PromptError::AiRequest(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Request to AI provider failed: {e}"),
                    ),
                    PromptError::AiDeserialization(e) => (
                        StatusCode::BAD_GATEWAY,
                        format!("Failed to deserialize AI provider response: {e}"),
                    ),
                    PromptError::AiApi(e) => {
                        (StatusCode::BAD_GATEWAY, format!("AI provider error: {e}"))
                    }
                    PromptError::JsonParse(_) | PromptError::UnexpectedOutput(_) => (
                        StatusCode::BAD_GATEWAY,
                        format!("AI provider returned unusable output: {err}"),
                    ),
                    PromptError::Regex(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Internal regex error: {e}"),
                    ),
                    PromptError::ReqwestClientBuild(e) => (
                        StatusCode::INTERNAL_SERVER_ERROR,
                        format!("Failed to build HTTP client: {e}"),
                    ),
                }
            }
            AppError::Internal(err) => {
                error!("Internal server error: {:?}", err);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "An internal server error occurred.".to_string(),
                )
            }
        };

        let body = Json(json!({
            "error": error_message,
        }));

        (status_code, body).into_response()
    }
}

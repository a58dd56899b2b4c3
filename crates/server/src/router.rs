use super::{handlers, state::AppState};
use axum::extract::DefaultBodyLimit;
use axum::{
    routing::{get, post},
    Router,
};
use tower_http::trace::TraceLayer;

/// Creates the Axum router with all the application routes.
pub fn create_router(app_state: AppState) -> Router {
    let upload_limit = DefaultBodyLimit::max(app_state.config.max_upload_bytes);

    Router::new()
        .route("/", get(handlers::root))
        .route("/health", get(handlers::health_check))
        .route("/placeholders", post(handlers::placeholders_handler))
        .route("/extract", post(handlers::extract_handler))
        .route("/extract/docx", post(handlers::extract_docx_handler))
        .layer(upload_limit)
        .with_state(app_state)
        .layer(TraceLayer::new_for_http())
}

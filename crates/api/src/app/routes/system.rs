use std::sync::Arc;

use axum::{extract::Extension, http::StatusCode, response::IntoResponse, Json};

use crate::app::errors;
use crate::app::services::AppServices;

pub async fn health() -> StatusCode {
    StatusCode::OK
}

/// Serve the static API description, re-read from disk on every call.
pub async fn openapi(Extension(services): Extension<Arc<AppServices>>) -> axum::response::Response {
    match services.spec_document().load().await {
        Ok(doc) => (StatusCode::OK, Json(doc)).into_response(),
        Err(e) => errors::spec_error_to_response(e),
    }
}

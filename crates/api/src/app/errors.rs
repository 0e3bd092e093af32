use axum::http::StatusCode;
use axum::response::IntoResponse;
use serde_json::json;

use usersvc_infra::{SpecDocumentError, StoreError};

pub const USER_NOT_FOUND: &str = "User not found";
pub const EMAIL_NOT_UNIQUE: &str = "Email must be unique";
pub const SPEC_NOT_FOUND: &str = "OpenAPI spec not found";
pub const NOT_FOUND: &str = "Not found";
pub const METHOD_NOT_ALLOWED: &str = "Method not allowed";
pub const INTERNAL: &str = "Internal server error";

pub fn store_error_to_response(err: StoreError) -> axum::response::Response {
    match err {
        StoreError::DuplicateEmail => json_error(StatusCode::BAD_REQUEST, EMAIL_NOT_UNIQUE),
        other => {
            tracing::error!(error = %other, "storage operation failed");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}

pub fn spec_error_to_response(err: SpecDocumentError) -> axum::response::Response {
    match err {
        SpecDocumentError::Missing(_) => json_error(StatusCode::NOT_FOUND, SPEC_NOT_FOUND),
        other => {
            tracing::error!(error = %other, "failed to load spec document");
            json_error(StatusCode::INTERNAL_SERVER_ERROR, INTERNAL)
        }
    }
}

/// `{"error": message}` with the given status.
pub fn json_error(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "error": message.into() }))).into_response()
}

/// `{"message": message}` with the given status.
pub fn json_message(status: StatusCode, message: impl Into<String>) -> axum::response::Response {
    (status, axum::Json(json!({ "message": message.into() }))).into_response()
}

/// Router fallback.
pub async fn not_found() -> axum::response::Response {
    json_error(StatusCode::NOT_FOUND, NOT_FOUND)
}

/// Fallback for a known path hit with an unsupported method.
pub async fn method_not_allowed() -> axum::response::Response {
    json_error(StatusCode::METHOD_NOT_ALLOWED, METHOD_NOT_ALLOWED)
}

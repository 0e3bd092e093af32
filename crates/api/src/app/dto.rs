use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;

use usersvc_core::{DomainError, DomainResult, UserDraft, UserId};

use crate::app::errors;

// -------------------------
// Request DTOs
// -------------------------

/// Body of `POST /users` and `PUT /users/{id}`.
///
/// Fields are optional here so a missing key becomes a 400 instead of a
/// deserialization failure with an opaque message.
#[derive(Debug, Deserialize)]
pub struct UserBody {
    pub name: Option<String>,
    pub email: Option<String>,
}

impl UserBody {
    pub fn into_draft(self) -> DomainResult<UserDraft> {
        let name = self
            .name
            .ok_or_else(|| DomainError::validation("name"))?;
        let email = self
            .email
            .ok_or_else(|| DomainError::validation("email"))?;
        Ok(UserDraft::new(name, email))
    }
}

// -------------------------
// Input mapping helpers
// -------------------------

pub fn user_draft_from_body(
    body: Result<Json<UserBody>, JsonRejection>,
) -> Result<UserDraft, axum::response::Response> {
    let Json(body) = body.map_err(|rejection| {
        errors::json_error(
            StatusCode::BAD_REQUEST,
            format!("Invalid request body: {}", rejection.body_text()),
        )
    })?;

    body.into_draft().map_err(|e| match e {
        DomainError::Validation(field) => errors::json_error(
            StatusCode::BAD_REQUEST,
            format!("Missing required field: {field}"),
        ),
        other => errors::json_error(StatusCode::BAD_REQUEST, other.to_string()),
    })
}

/// Anything but a plain unsigned integer is treated as an unmatched route.
pub fn parse_user_id(raw: &str) -> Result<UserId, axum::response::Response> {
    let unmatched = || errors::json_error(StatusCode::NOT_FOUND, errors::NOT_FOUND);
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return Err(unmatched());
    }
    raw.parse::<UserId>().map_err(|_| unmatched())
}

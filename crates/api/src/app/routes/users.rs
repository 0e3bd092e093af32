use axum::{
    extract::{rejection::JsonRejection, Extension, Path},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};

use crate::app::{dto, errors};
use crate::context::RequestConnection;

pub fn router() -> Router {
    Router::new()
        .route("/users", get(list_users).post(create_user))
        .route(
            "/users/:id",
            get(get_user).put(update_user).delete(delete_user),
        )
}

pub async fn list_users(Extension(db): Extension<RequestConnection>) -> axum::response::Response {
    let mut conn = match db.connection().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    match conn.list_all().await {
        Ok(users) => (StatusCode::OK, Json(users)).into_response(),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn get_user(
    Extension(db): Extension<RequestConnection>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut conn = match db.connection().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    match conn.get_by_id(id).await {
        Ok(Some(user)) => (StatusCode::OK, Json(user)).into_response(),
        Ok(None) => errors::json_error(StatusCode::NOT_FOUND, errors::USER_NOT_FOUND),
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn create_user(
    Extension(db): Extension<RequestConnection>,
    body: Result<Json<dto::UserBody>, JsonRejection>,
) -> axum::response::Response {
    let draft = match dto::user_draft_from_body(body) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let mut conn = match db.connection().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    // A duplicate email surfaces as StoreError::DuplicateEmail -> 400.
    match conn.insert(&draft).await {
        Ok(id) => {
            tracing::info!(user_id = %id, "user created");
            (StatusCode::CREATED, Json(serde_json::json!({ "id": id }))).into_response()
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn update_user(
    Extension(db): Extension<RequestConnection>,
    Path(id): Path<String>,
    body: Result<Json<dto::UserBody>, JsonRejection>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let draft = match dto::user_draft_from_body(body) {
        Ok(d) => d,
        Err(resp) => return resp,
    };
    let mut conn = match db.connection().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    match conn.update(id, &draft).await {
        Ok(0) => errors::json_error(StatusCode::NOT_FOUND, errors::USER_NOT_FOUND),
        Ok(_) => {
            tracing::info!(user_id = %id, "user updated");
            errors::json_message(StatusCode::OK, "User updated")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

pub async fn delete_user(
    Extension(db): Extension<RequestConnection>,
    Path(id): Path<String>,
) -> axum::response::Response {
    let id = match dto::parse_user_id(&id) {
        Ok(v) => v,
        Err(resp) => return resp,
    };
    let mut conn = match db.connection().await {
        Ok(c) => c,
        Err(e) => return errors::store_error_to_response(e),
    };

    match conn.delete(id).await {
        Ok(0) => errors::json_error(StatusCode::NOT_FOUND, errors::USER_NOT_FOUND),
        Ok(_) => {
            tracing::info!(user_id = %id, "user deleted");
            errors::json_message(StatusCode::OK, "User deleted")
        }
        Err(e) => errors::store_error_to_response(e),
    }
}

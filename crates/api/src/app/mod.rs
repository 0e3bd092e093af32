//! HTTP API application wiring (Axum router + service wiring).
//!
//! - `services.rs`: storage and spec-document wiring
//! - `routes/`: HTTP routes + handlers
//! - `dto.rs`: request DTOs and input mapping helpers
//! - `errors.rs`: consistent error responses

use std::sync::Arc;

use axum::{routing::get, Extension, Router};

use crate::middleware;

pub mod dto;
pub mod errors;
pub mod routes;
pub mod services;

pub use services::AppServices;

/// Build the full HTTP router (public entrypoint used by `main.rs` and tests).
pub fn build_app(services: AppServices) -> Router {
    let scope_state = middleware::ScopeState {
        store: services.store().clone(),
    };
    let services = Arc::new(services);

    Router::new()
        .route("/health", get(routes::system::health))
        .route("/openapi.json", get(routes::system::openapi))
        .merge(routes::users::router())
        .method_not_allowed_fallback(errors::method_not_allowed)
        .fallback(errors::not_found)
        .layer(Extension(services))
        .layer(axum::middleware::from_fn_with_state(
            scope_state,
            middleware::request_scope,
        ))
}

#[cfg(test)]
mod tests {
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use tower::ServiceExt;
    use usersvc_infra::{InMemoryUserStore, SpecDocument};

    use super::*;

    fn app() -> (Arc<InMemoryUserStore>, Router) {
        let store = InMemoryUserStore::arc();
        let services = AppServices::new(store.clone(), SpecDocument::new("does-not-exist.json"));
        (store, build_app(services))
    }

    async fn body_json(res: axum::response::Response) -> serde_json::Value {
        let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn unknown_paths_get_a_json_404() {
        let (store, app) = app();

        let res = app
            .oneshot(Request::get("/nope").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await, serde_json::json!({ "error": "Not found" }));
        assert_eq!(store.connections_opened(), 0);
    }

    #[tokio::test]
    async fn non_integer_ids_do_not_match_user_routes() {
        let (store, app) = app();

        let res = app
            .oneshot(Request::get("/users/abc").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert_eq!(body_json(res).await, serde_json::json!({ "error": "Not found" }));
        assert_eq!(store.connections_opened(), 0);
    }

    #[tokio::test]
    async fn signed_ids_do_not_match_user_routes() {
        let (store, app) = app();

        for path in ["/users/+1", "/users/-1"] {
            let res = app
                .clone()
                .oneshot(Request::get(path).body(Body::empty()).unwrap())
                .await
                .unwrap();

            assert_eq!(res.status(), StatusCode::NOT_FOUND, "{path}");
            assert_eq!(body_json(res).await, serde_json::json!({ "error": "Not found" }));
        }
        assert_eq!(store.connections_opened(), 0);
    }

    #[tokio::test]
    async fn unsupported_methods_get_a_json_405() {
        let (store, app) = app();

        let res = app
            .oneshot(
                Request::patch("/users/1")
                    .header("content-type", "application/json")
                    .body(Body::from(r#"{"name":"Ann","email":"ann@x.com"}"#))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::METHOD_NOT_ALLOWED);
        assert_eq!(
            body_json(res).await,
            serde_json::json!({ "error": "Method not allowed" })
        );
        assert_eq!(store.connections_opened(), 0);
    }

    #[tokio::test]
    async fn responses_carry_a_request_id() {
        let (_store, app) = app();

        let res = app
            .oneshot(Request::get("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(res.status(), StatusCode::OK);
        assert!(res.headers().contains_key("x-request-id"));
    }
}

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::Response,
};
use tracing::Instrument;
use uuid::Uuid;

use usersvc_infra::{ConnectionScope, UserStore};

use crate::context::RequestConnection;

#[derive(Clone)]
pub struct ScopeState {
    pub store: Arc<dyn UserStore>,
}

/// Per-request scope: connection lifecycle plus a tracing span.
///
/// The storage connection (if the handler opened one) is released after the
/// handler returns, whatever the response status.
pub async fn request_scope(
    State(state): State<ScopeState>,
    mut req: Request,
    next: Next,
) -> Response {
    let request_id = Uuid::now_v7();
    let span = tracing::info_span!(
        "request",
        %request_id,
        method = %req.method(),
        path = %req.uri().path(),
    );

    async move {
        let started = Instant::now();
        let scope = Arc::new(ConnectionScope::new(state.store.clone()));
        req.extensions_mut()
            .insert(RequestConnection::new(scope.clone()));

        let mut response = next.run(req).await;

        if let Err(e) = scope.release().await {
            tracing::warn!(error = %e, "failed to release storage connection");
        }

        if let Ok(value) = HeaderValue::from_str(&request_id.to_string()) {
            response.headers_mut().insert("x-request-id", value);
        }

        tracing::info!(
            status = response.status().as_u16(),
            latency_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );
        response
    }
    .instrument(span)
    .await
}

use std::sync::Arc;

use usersvc_infra::{ConnectionScope, ScopedConnection, StoreError};

/// Storage connection for a request.
///
/// Inserted by `middleware::request_scope`; handlers pull the connection from
/// it only when they actually touch storage.
#[derive(Debug, Clone)]
pub struct RequestConnection {
    scope: Arc<ConnectionScope>,
}

impl RequestConnection {
    pub fn new(scope: Arc<ConnectionScope>) -> Self {
        Self { scope }
    }

    pub async fn connection(&self) -> Result<ScopedConnection, StoreError> {
        self.scope.connection().await
    }
}

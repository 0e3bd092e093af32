use std::sync::Arc;

use usersvc_infra::{ServiceConfig, SpecDocument, SqliteUserStore, StoreError, UserStore};

/// Everything the handlers need, shared across requests.
#[derive(Clone)]
pub struct AppServices {
    store: Arc<dyn UserStore>,
    spec: SpecDocument,
}

impl AppServices {
    pub fn new(store: Arc<dyn UserStore>, spec: SpecDocument) -> Self {
        Self { store, spec }
    }

    pub fn store(&self) -> &Arc<dyn UserStore> {
        &self.store
    }

    pub fn spec_document(&self) -> &SpecDocument {
        &self.spec
    }
}

/// Production wiring: SQLite store (schema ensured once, at startup) + spec file.
pub async fn build_services(config: &ServiceConfig) -> Result<AppServices, StoreError> {
    let store = SqliteUserStore::open(&config.database_path, config.max_connections);
    let created = store.ensure_schema_exists().await?;
    tracing::info!(
        path = %config.database_path.display(),
        schema_created = created,
        "user store ready"
    );

    Ok(AppServices::new(
        Arc::new(store),
        SpecDocument::new(&config.spec_path),
    ))
}

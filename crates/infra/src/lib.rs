//! Infrastructure layer: storage, per-request connections, config, static files.

pub mod config;
pub mod connection;
pub mod spec_document;
pub mod user_store;

pub use config::{ConfigError, ServiceConfig};
pub use connection::{ConnectionScope, ScopedConnection};
pub use spec_document::{SpecDocument, SpecDocumentError};
pub use user_store::{InMemoryUserStore, SqliteUserStore, StoreError, UserConnection, UserStore};

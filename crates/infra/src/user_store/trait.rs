use std::sync::Arc;

use thiserror::Error;

use usersvc_core::{User, UserDraft, UserId};

/// Storage operation error.
///
/// `DuplicateEmail` is an expected outcome of a write (the uniqueness constraint
/// on `email` fired). Everything else is an infrastructure failure.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum StoreError {
    #[error("email must be unique")]
    DuplicateEmail,

    #[error("connection already closed")]
    Closed,

    #[error("connection failed: {0}")]
    Connection(String),

    #[error("query failed: {0}")]
    Query(String),

    #[error("schema initialization failed: {0}")]
    Schema(String),
}

/// Factory for storage connections over the single `users` table.
///
/// The HTTP layer only ever sees this trait, so any backend can be injected.
#[async_trait::async_trait]
pub trait UserStore: Send + Sync {
    /// Open one connection. Callers own it until they `close()` or drop it.
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, StoreError>;

    /// Create the `users` table if the store has never been initialized.
    ///
    /// Idempotent. Returns `true` only when this call created the schema.
    async fn ensure_schema_exists(&self) -> Result<bool, StoreError>;

    /// Close every idle connection and refuse new ones. No-op by default.
    async fn shutdown(&self) {}
}

#[async_trait::async_trait]
impl<S> UserStore for Arc<S>
where
    S: UserStore + ?Sized,
{
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, StoreError> {
        (**self).acquire().await
    }

    async fn ensure_schema_exists(&self) -> Result<bool, StoreError> {
        (**self).ensure_schema_exists().await
    }

    async fn shutdown(&self) {
        (**self).shutdown().await
    }
}

/// One open storage connection.
///
/// Every operation is a single atomic statement against the store.
#[async_trait::async_trait]
pub trait UserConnection: Send {
    /// Every current record, in the store's natural iteration order.
    async fn list_all(&mut self) -> Result<Vec<User>, StoreError>;

    /// `None` when no record has this id.
    async fn get_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError>;

    /// Persist a new record under a fresh, never-used id.
    ///
    /// Fails with `StoreError::DuplicateEmail` when the email is taken; nothing
    /// is written in that case.
    async fn insert(&mut self, draft: &UserDraft) -> Result<UserId, StoreError>;

    /// Replace `name` and `email` of the record. Returns the affected row count.
    async fn update(&mut self, id: UserId, draft: &UserDraft) -> Result<u64, StoreError>;

    /// Remove the record. Returns the affected row count.
    async fn delete(&mut self, id: UserId) -> Result<u64, StoreError>;

    /// Release the underlying connection. Later operations fail with `Closed`.
    async fn close(&mut self) -> Result<(), StoreError>;
}

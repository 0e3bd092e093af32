//! SQLite-backed user store.
//!
//! ## Error Mapping
//!
//! | SQLx Error | StoreError | Scenario |
//! |------------|------------|----------|
//! | Database (unique violation) | `DuplicateEmail` | Email already taken (insert or update) |
//! | Database (other) | `Query` | Any other constraint or SQL failure |
//! | PoolTimedOut / PoolClosed / Io | `Connection` | Could not reach the database file |
//! | Other | `Query` | Decode failures, driver errors |
//!
//! ## Schema
//!
//! The schema is created only when the database file does not exist yet. The
//! pool connects lazily, so the file check in `ensure_schema_exists` always runs
//! before anything has touched the disk.

use std::path::{Path, PathBuf};

use sqlx::pool::PoolConnection;
use sqlx::sqlite::{SqliteConnectOptions, SqliteConnection, SqlitePool, SqlitePoolOptions, SqliteRow};
use sqlx::{Row, Sqlite};
use tracing::instrument;

use usersvc_core::{User, UserDraft, UserId};

use super::r#trait::{StoreError, UserConnection, UserStore};

const CREATE_USERS_TABLE: &str = r#"
    CREATE TABLE IF NOT EXISTS users (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        email TEXT NOT NULL UNIQUE
    )
"#;

/// SQLite-backed user store.
///
/// Holds a connection pool; each `acquire()` checks one connection out of it
/// and `close()` returns it.
#[derive(Debug, Clone)]
pub struct SqliteUserStore {
    pool: SqlitePool,
    path: PathBuf,
}

impl SqliteUserStore {
    /// Build a store for the database file at `path`.
    ///
    /// No connection is opened here. Must be called inside a tokio runtime.
    pub fn open(path: impl Into<PathBuf>, max_connections: u32) -> Self {
        let path = path.into();
        let options = SqliteConnectOptions::new()
            .filename(&path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(max_connections)
            .connect_lazy_with(options);

        Self { pool, path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl UserStore for SqliteUserStore {
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, StoreError> {
        let conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("acquire", e))?;

        Ok(Box::new(SqliteUserConnection { conn: Some(conn) }))
    }

    #[instrument(skip(self), err)]
    async fn ensure_schema_exists(&self) -> Result<bool, StoreError> {
        let exists = tokio::fs::try_exists(&self.path)
            .await
            .map_err(|e| StoreError::Schema(format!("cannot stat database file: {e}")))?;
        if exists {
            tracing::debug!(path = %self.path.display(), "database file present, schema creation skipped");
            return Ok(false);
        }

        let mut conn = self
            .pool
            .acquire()
            .await
            .map_err(|e| map_sqlx_error("ensure_schema_exists", e))?;

        sqlx::query(CREATE_USERS_TABLE)
            .execute(&mut *conn)
            .await
            .map_err(|e| StoreError::Schema(e.to_string()))?;

        tracing::info!(path = %self.path.display(), "created users table");
        Ok(true)
    }

    async fn shutdown(&self) {
        self.pool.close().await;
        tracing::debug!(path = %self.path.display(), "connection pool closed");
    }
}

/// One pooled SQLite connection.
pub struct SqliteUserConnection {
    conn: Option<PoolConnection<Sqlite>>,
}

impl SqliteUserConnection {
    fn handle(&mut self) -> Result<&mut SqliteConnection, StoreError> {
        self.conn.as_deref_mut().ok_or(StoreError::Closed)
    }
}

#[async_trait::async_trait]
impl UserConnection for SqliteUserConnection {
    async fn list_all(&mut self) -> Result<Vec<User>, StoreError> {
        let rows = sqlx::query("SELECT id, name, email FROM users")
            .fetch_all(self.handle()?)
            .await
            .map_err(|e| map_sqlx_error("list_all", e))?;

        rows.iter().map(user_from_row).collect()
    }

    async fn get_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        let row = sqlx::query("SELECT id, name, email FROM users WHERE id = ?")
            .bind(id.as_i64())
            .fetch_optional(self.handle()?)
            .await
            .map_err(|e| map_sqlx_error("get_by_id", e))?;

        row.as_ref().map(user_from_row).transpose()
    }

    #[instrument(skip(self, draft), err)]
    async fn insert(&mut self, draft: &UserDraft) -> Result<UserId, StoreError> {
        let result = sqlx::query("INSERT INTO users (name, email) VALUES (?, ?)")
            .bind(draft.name.as_str())
            .bind(draft.email.as_str())
            .execute(self.handle()?)
            .await
            .map_err(|e| map_sqlx_error("insert", e))?;

        Ok(UserId::new(result.last_insert_rowid()))
    }

    #[instrument(skip(self, draft), err)]
    async fn update(&mut self, id: UserId, draft: &UserDraft) -> Result<u64, StoreError> {
        let result = sqlx::query("UPDATE users SET name = ?, email = ? WHERE id = ?")
            .bind(draft.name.as_str())
            .bind(draft.email.as_str())
            .bind(id.as_i64())
            .execute(self.handle()?)
            .await
            .map_err(|e| map_sqlx_error("update", e))?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self), err)]
    async fn delete(&mut self, id: UserId) -> Result<u64, StoreError> {
        let result = sqlx::query("DELETE FROM users WHERE id = ?")
            .bind(id.as_i64())
            .execute(self.handle()?)
            .await
            .map_err(|e| map_sqlx_error("delete", e))?;

        Ok(result.rows_affected())
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        // Dropping a pooled connection hands it back to the pool.
        self.conn.take();
        Ok(())
    }
}

fn user_from_row(row: &SqliteRow) -> Result<User, StoreError> {
    let decode = |e: sqlx::Error| StoreError::Query(format!("failed to decode user row: {e}"));

    Ok(User {
        id: UserId::new(row.try_get("id").map_err(decode)?),
        name: row.try_get("name").map_err(decode)?,
        email: row.try_get("email").map_err(decode)?,
    })
}

/// Map SQLx errors to StoreError.
fn map_sqlx_error(operation: &str, err: sqlx::Error) -> StoreError {
    match err {
        sqlx::Error::Database(db_err) if db_err.is_unique_violation() => StoreError::DuplicateEmail,
        sqlx::Error::Database(db_err) => {
            StoreError::Query(format!("database error in {}: {}", operation, db_err.message()))
        }
        sqlx::Error::PoolTimedOut | sqlx::Error::PoolClosed | sqlx::Error::Io(_) => {
            StoreError::Connection(format!("{operation}: {err}"))
        }
        _ => StoreError::Query(format!("sqlx error in {operation}: {err}")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_store() -> (tempfile::TempDir, SqliteUserStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = SqliteUserStore::open(dir.path().join("users.db"), 2);
        (dir, store)
    }

    #[tokio::test]
    async fn schema_is_created_only_for_a_missing_file() {
        let (_dir, store) = temp_store();
        assert!(!store.path().exists());

        assert!(store.ensure_schema_exists().await.unwrap());
        assert!(store.path().exists());

        // Second start against the same file: no-op.
        assert!(!store.ensure_schema_exists().await.unwrap());
        let reopened = SqliteUserStore::open(store.path(), 2);
        assert!(!reopened.ensure_schema_exists().await.unwrap());
    }

    #[tokio::test]
    async fn existing_rows_survive_schema_check() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();

        let mut conn = store.acquire().await.unwrap();
        let id = conn.insert(&UserDraft::new("Ann", "ann@x.com")).await.unwrap();
        conn.close().await.unwrap();
        store.shutdown().await;

        let reopened = SqliteUserStore::open(store.path(), 2);
        assert!(!reopened.ensure_schema_exists().await.unwrap());
        let mut conn = reopened.acquire().await.unwrap();
        let user = conn.get_by_id(id).await.unwrap().unwrap();
        assert_eq!(user.email, "ann@x.com");
    }

    #[tokio::test]
    async fn crud_round_trip() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();
        let mut conn = store.acquire().await.unwrap();

        let ann = conn.insert(&UserDraft::new("Ann", "ann@x.com")).await.unwrap();
        let bob = conn.insert(&UserDraft::new("Bob", "bob@x.com")).await.unwrap();
        assert!(bob > ann);

        let all = conn.list_all().await.unwrap();
        assert_eq!(all.len(), 2);

        let affected = conn
            .update(ann, &UserDraft::new("Annie", "annie@x.com"))
            .await
            .unwrap();
        assert_eq!(affected, 1);
        let user = conn.get_by_id(ann).await.unwrap().unwrap();
        assert_eq!(user, User::from_draft(ann, UserDraft::new("Annie", "annie@x.com")));

        assert_eq!(conn.delete(ann).await.unwrap(), 1);
        assert_eq!(conn.delete(ann).await.unwrap(), 0);
        assert!(conn.get_by_id(ann).await.unwrap().is_none());
        assert_eq!(
            conn.update(UserId::new(999), &UserDraft::new("x", "y")).await.unwrap(),
            0
        );
    }

    #[tokio::test]
    async fn duplicate_email_is_a_typed_error_and_writes_nothing() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();
        let mut conn = store.acquire().await.unwrap();

        let ann = conn.insert(&UserDraft::new("Ann", "ann@x.com")).await.unwrap();
        let err = conn
            .insert(&UserDraft::new("Bob", "ann@x.com"))
            .await
            .unwrap_err();
        assert_eq!(err, StoreError::DuplicateEmail);

        let all = conn.list_all().await.unwrap();
        assert_eq!(all, vec![User::from_draft(ann, UserDraft::new("Ann", "ann@x.com"))]);
    }

    #[tokio::test]
    async fn deleted_ids_are_never_reassigned() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();
        let mut conn = store.acquire().await.unwrap();

        let first = conn.insert(&UserDraft::new("Ann", "ann@x.com")).await.unwrap();
        conn.delete(first).await.unwrap();
        let second = conn.insert(&UserDraft::new("Ann", "ann@x.com")).await.unwrap();

        assert!(second > first);
    }

    #[tokio::test]
    async fn closed_connection_rejects_operations() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();
        let mut conn = store.acquire().await.unwrap();

        conn.close().await.unwrap();
        assert_eq!(conn.list_all().await.unwrap_err(), StoreError::Closed);
    }

    #[tokio::test]
    async fn shutdown_through_the_trait_closes_the_pool() {
        let (_dir, store) = temp_store();
        store.ensure_schema_exists().await.unwrap();
        let store: std::sync::Arc<dyn UserStore> = std::sync::Arc::new(store);

        drop(store.acquire().await.unwrap());
        store.shutdown().await;

        assert!(matches!(
            store.acquire().await.err(),
            Some(StoreError::Connection(_))
        ));
    }
}

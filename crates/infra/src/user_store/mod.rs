//! User record storage boundary.
//!
//! `UserStore` hands out connections; `UserConnection` runs the five record
//! operations. Backends: SQLite (production) and in-memory (tests/dev).

pub mod in_memory;
pub mod sqlite;
pub mod r#trait;

pub use in_memory::InMemoryUserStore;
pub use r#trait::{StoreError, UserConnection, UserStore};
pub use sqlite::SqliteUserStore;

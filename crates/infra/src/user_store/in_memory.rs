use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, RwLock};

use usersvc_core::{User, UserDraft, UserId};

use super::r#trait::{StoreError, UserConnection, UserStore};

#[derive(Debug, Default)]
struct Table {
    rows: BTreeMap<UserId, User>,
    /// Highest id ever handed out. Never rewound, so deleted ids stay retired.
    last_id: i64,
    initialized: bool,
}

impl Table {
    fn email_taken(&self, email: &str, except: Option<UserId>) -> bool {
        self.rows
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

/// In-memory user store.
///
/// Intended for tests/dev. Counts connections so callers can assert that every
/// acquired connection was released.
#[derive(Debug, Default)]
pub struct InMemoryUserStore {
    table: Arc<RwLock<Table>>,
    open: Arc<AtomicUsize>,
    opened: AtomicUsize,
}

impl InMemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn arc() -> Arc<Self> {
        Arc::new(Self::new())
    }

    /// Connections currently acquired and not yet closed or dropped.
    pub fn open_connections(&self) -> usize {
        self.open.load(Ordering::SeqCst)
    }

    /// Connections acquired over the store's lifetime.
    pub fn connections_opened(&self) -> usize {
        self.opened.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl UserStore for InMemoryUserStore {
    async fn acquire(&self) -> Result<Box<dyn UserConnection>, StoreError> {
        self.open.fetch_add(1, Ordering::SeqCst);
        self.opened.fetch_add(1, Ordering::SeqCst);

        Ok(Box::new(InMemoryUserConnection {
            table: self.table.clone(),
            open: self.open.clone(),
            closed: false,
        }))
    }

    async fn ensure_schema_exists(&self) -> Result<bool, StoreError> {
        let mut table = self
            .table
            .write()
            .map_err(|_| StoreError::Schema("lock poisoned".to_string()))?;

        if table.initialized {
            return Ok(false);
        }
        table.initialized = true;
        Ok(true)
    }
}

struct InMemoryUserConnection {
    table: Arc<RwLock<Table>>,
    open: Arc<AtomicUsize>,
    closed: bool,
}

impl InMemoryUserConnection {
    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, Table>, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        self.table
            .read()
            .map_err(|_| StoreError::Query("lock poisoned".to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, Table>, StoreError> {
        if self.closed {
            return Err(StoreError::Closed);
        }
        self.table
            .write()
            .map_err(|_| StoreError::Query("lock poisoned".to_string()))
    }

    fn mark_closed(&mut self) {
        if !self.closed {
            self.closed = true;
            self.open.fetch_sub(1, Ordering::SeqCst);
        }
    }
}

impl Drop for InMemoryUserConnection {
    fn drop(&mut self) {
        self.mark_closed();
    }
}

#[async_trait::async_trait]
impl UserConnection for InMemoryUserConnection {
    async fn list_all(&mut self) -> Result<Vec<User>, StoreError> {
        Ok(self.read()?.rows.values().cloned().collect())
    }

    async fn get_by_id(&mut self, id: UserId) -> Result<Option<User>, StoreError> {
        Ok(self.read()?.rows.get(&id).cloned())
    }

    async fn insert(&mut self, draft: &UserDraft) -> Result<UserId, StoreError> {
        let mut table = self.write()?;
        if table.email_taken(&draft.email, None) {
            return Err(StoreError::DuplicateEmail);
        }

        table.last_id += 1;
        let id = UserId::new(table.last_id);
        table.rows.insert(id, User::from_draft(id, draft.clone()));
        Ok(id)
    }

    async fn update(&mut self, id: UserId, draft: &UserDraft) -> Result<u64, StoreError> {
        let mut table = self.write()?;
        if !table.rows.contains_key(&id) {
            return Ok(0);
        }
        if table.email_taken(&draft.email, Some(id)) {
            return Err(StoreError::DuplicateEmail);
        }

        table.rows.insert(id, User::from_draft(id, draft.clone()));
        Ok(1)
    }

    async fn delete(&mut self, id: UserId) -> Result<u64, StoreError> {
        let mut table = self.write()?;
        Ok(u64::from(table.rows.remove(&id).is_some()))
    }

    async fn close(&mut self) -> Result<(), StoreError> {
        self.mark_closed();
        Ok(())
    }
}

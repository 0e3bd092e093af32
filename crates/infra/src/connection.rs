//! Request-scoped storage connection.
//!
//! A `ConnectionScope` lives for exactly one request. The first call to
//! `connection()` acquires from the store; later calls reuse it. `release()`
//! closes it. If the scope is dropped without `release()` (handler panic,
//! cancelled future), dropping the cached connection releases it all the same.

use std::sync::Arc;

use tokio::sync::{Mutex, OwnedMappedMutexGuard, OwnedMutexGuard};

use crate::user_store::{StoreError, UserConnection, UserStore};

/// Exclusive access to the scope's cached connection.
pub type ScopedConnection =
    OwnedMappedMutexGuard<Option<Box<dyn UserConnection>>, Box<dyn UserConnection>>;

/// At most one lazily-acquired storage connection.
pub struct ConnectionScope {
    store: Arc<dyn UserStore>,
    slot: Arc<Mutex<Option<Box<dyn UserConnection>>>>,
}

impl ConnectionScope {
    pub fn new(store: Arc<dyn UserStore>) -> Self {
        Self {
            store,
            slot: Arc::new(Mutex::new(None)),
        }
    }

    /// The scope's connection, acquired on first use.
    pub async fn connection(&self) -> Result<ScopedConnection, StoreError> {
        let mut slot = self.slot.clone().lock_owned().await;
        if slot.is_none() {
            *slot = Some(self.store.acquire().await?);
            tracing::debug!("storage connection acquired");
        }

        OwnedMutexGuard::try_map(slot, |slot| slot.as_mut()).map_err(|_| StoreError::Closed)
    }

    /// Close and detach the cached connection, if any.
    ///
    /// Returns whether a connection was released. Safe to call more than once.
    pub async fn release(&self) -> Result<bool, StoreError> {
        let taken = self.slot.lock().await.take();
        match taken {
            Some(mut conn) => {
                conn.close().await?;
                tracing::debug!("storage connection released");
                Ok(true)
            }
            None => Ok(false),
        }
    }

    pub async fn is_open(&self) -> bool {
        self.slot.lock().await.is_some()
    }
}

impl core::fmt::Debug for ConnectionScope {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("ConnectionScope").finish_non_exhaustive()
    }
}

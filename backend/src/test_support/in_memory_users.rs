//! `UserRepository` backed by a map, with storage-like id and timestamp
//! assignment.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, TimeDelta, Utc};
use mockable::{Clock, DefaultClock};

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, Page, User, UserChanges, UserId};

#[derive(Default)]
struct Store {
    next_id: i64,
    rows: BTreeMap<i64, User>,
}

/// In-memory user storage.
///
/// Identifiers start at 1 and increase monotonically; `updated_at` strictly
/// increases on every update, mirroring the database trigger.
pub struct InMemoryUserRepository {
    clock: Arc<dyn Clock + Send + Sync>,
    store: Mutex<Store>,
}

impl Default for InMemoryUserRepository {
    fn default() -> Self {
        Self::with_clock(Arc::new(DefaultClock))
    }
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_clock(clock: Arc<dyn Clock + Send + Sync>) -> Self {
        Self {
            clock,
            store: Mutex::new(Store::default()),
        }
    }

    /// Number of stored users.
    pub fn len(&self) -> usize {
        self.lock().map(|store| store.rows.len()).unwrap_or_default()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn lock(&self) -> Result<MutexGuard<'_, Store>, UserPersistenceError> {
        self.store
            .lock()
            .map_err(|_| UserPersistenceError::query("in-memory store poisoned"))
    }

    fn next_timestamp(&self, previous: DateTime<Utc>) -> DateTime<Utc> {
        let now = self.clock.utc();
        if now > previous {
            now
        } else {
            previous + TimeDelta::microseconds(1)
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let now = self.clock.utc();
        let mut store = self.lock()?;
        store.next_id += 1;
        let created = User {
            id: UserId::new(store.next_id),
            name: user.name.clone(),
            surname: user.surname.clone(),
            password: user.password.clone(),
            created_at: now,
            updated_at: now,
        };
        store.rows.insert(created.id.get(), created.clone());
        Ok(created)
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        Ok(self.lock()?.rows.get(&id.get()).cloned())
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserPersistenceError> {
        let store = self.lock()?;
        Ok(store
            .rows
            .values()
            .skip(page.skip as usize)
            .take(page.limit as usize)
            .cloned()
            .collect())
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        let mut store = self.lock()?;
        let Some(user) = store.rows.get_mut(&id.get()) else {
            return Ok(None);
        };
        if !changes.is_empty() {
            changes.apply_to(user);
            user.updated_at = self.next_timestamp(user.updated_at);
        }
        Ok(Some(user.clone()))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        Ok(self.lock()?.rows.remove(&id.get()).is_some())
    }
}

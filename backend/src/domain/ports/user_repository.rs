//! Driven port for user persistence adapters and their errors.
use async_trait::async_trait;

use crate::domain::{NewUser, Page, User, UserChanges, UserId};

use super::define_port_error;

define_port_error! {
    /// Persistence errors raised by user repository adapters.
    pub enum UserPersistenceError {
        /// Repository connection could not be established.
        Connection => "user repository connection failed: {message}",
        /// Query or mutation failed during execution.
        Query => "user repository query failed: {message}",
    }
}

/// Storage for user records.
///
/// Adapters own identifier assignment and both timestamps. Mutating
/// operations are atomic: a failed update or delete leaves the stored row
/// untouched.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserRepository: Send + Sync {
    /// Insert a new user and return the stored record.
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError>;

    /// Fetch a user by identifier.
    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError>;

    /// List users ordered by ascending identifier.
    async fn list(&self, page: Page) -> Result<Vec<User>, UserPersistenceError>;

    /// Apply a partial update, returning `None` when the user does not exist.
    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError>;

    /// Delete a user, returning whether a row was removed.
    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError>;
}

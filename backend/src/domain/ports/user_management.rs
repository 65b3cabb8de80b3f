//! Driving port for user CRUD use-cases.
//!
//! HTTP handlers depend on this trait rather than the concrete service so
//! they stay testable with fixtures and mocks.

use async_trait::async_trait;

use crate::domain::{Error, NewUser, Page, User, UserChanges, UserId};

/// Domain use-case port for managing users.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait UserManagement: Send + Sync {
    /// Create a user.
    async fn create_user(&self, user: NewUser) -> Result<User, Error>;

    /// Fetch one user or fail with `not_found`.
    async fn get_user(&self, id: UserId) -> Result<User, Error>;

    /// List a window of users ordered by identifier.
    async fn list_users(&self, page: Page) -> Result<Vec<User>, Error>;

    /// Apply a partial update.
    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, Error>;

    /// Delete a user.
    async fn delete_user(&self, id: UserId) -> Result<(), Error>;
}

/// Fixture port for handler tests that only need an empty catalogue.
#[derive(Debug, Default, Clone, Copy)]
pub struct FixtureUserManagement;

#[async_trait]
impl UserManagement for FixtureUserManagement {
    async fn create_user(&self, _user: NewUser) -> Result<User, Error> {
        Err(Error::service_unavailable("user storage is not configured"))
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        Err(Error::not_found(format!("User with ID {id} not found")))
    }

    async fn list_users(&self, _page: Page) -> Result<Vec<User>, Error> {
        Ok(Vec::new())
    }

    async fn update_user(&self, id: UserId, _changes: UserChanges) -> Result<User, Error> {
        Err(Error::not_found(format!("User with ID {id} not found")))
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        Err(Error::not_found(format!("User with ID {id} not found")))
    }
}

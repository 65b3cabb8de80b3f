//! User management domain service.
//!
//! Implements the [`UserManagement`] driving port on top of a
//! [`UserRepository`]. Every operation is a single repository call, so each
//! one commits or fails as a unit.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::domain::ports::{UserManagement, UserPersistenceError, UserRepository};
use crate::domain::{Error, NewUser, Page, User, UserChanges, UserId};

fn map_repository_error(error: UserPersistenceError) -> Error {
    let detail = error.message();
    match error {
        UserPersistenceError::Connection { .. } => {
            Error::service_unavailable(format!("user repository unavailable: {detail}"))
        }
        UserPersistenceError::Query { .. } => {
            Error::internal(format!("user repository error: {detail}"))
        }
    }
}

fn user_not_found(id: UserId) -> Error {
    warn!(user_id = id.get(), "user not found");
    Error::not_found(format!("User with ID {id} not found"))
}

/// Domain service backing the users HTTP resource.
#[derive(Clone)]
pub struct UserService<R> {
    repo: Arc<R>,
}

impl<R> UserService<R> {
    /// Create a new service over the given repository.
    pub fn new(repo: Arc<R>) -> Self {
        Self { repo }
    }
}

#[async_trait]
impl<R> UserManagement for UserService<R>
where
    R: UserRepository,
{
    async fn create_user(&self, user: NewUser) -> Result<User, Error> {
        info!(name = %user.name, surname = %user.surname, "creating user");
        let created = self
            .repo
            .insert(&user)
            .await
            .map_err(map_repository_error)?;
        info!(user_id = created.id.get(), "user created");
        Ok(created)
    }

    async fn get_user(&self, id: UserId) -> Result<User, Error> {
        debug!(user_id = id.get(), "getting user");
        self.repo
            .find_by_id(id)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))
    }

    async fn list_users(&self, page: Page) -> Result<Vec<User>, Error> {
        debug!(skip = page.skip, limit = page.limit, "listing users");
        self.repo.list(page).await.map_err(map_repository_error)
    }

    async fn update_user(&self, id: UserId, changes: UserChanges) -> Result<User, Error> {
        info!(
            user_id = id.get(),
            name = changes.name.is_some(),
            surname = changes.surname.is_some(),
            password = changes.password.is_some(),
            "updating user"
        );
        let updated = self
            .repo
            .update(id, &changes)
            .await
            .map_err(map_repository_error)?
            .ok_or_else(|| user_not_found(id))?;
        info!(user_id = id.get(), "user updated");
        Ok(updated)
    }

    async fn delete_user(&self, id: UserId) -> Result<(), Error> {
        info!(user_id = id.get(), "deleting user");
        let removed = self.repo.delete(id).await.map_err(map_repository_error)?;
        if !removed {
            return Err(user_not_found(id));
        }
        info!(user_id = id.get(), "user deleted");
        Ok(())
    }
}

#[cfg(test)]
#[path = "user_service_tests.rs"]
mod tests;

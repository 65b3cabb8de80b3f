//! PostgreSQL-backed `UserRepository` implementation using Diesel ORM.
//!
//! Inserts and updates use `RETURNING` so callers see the server-assigned
//! identifier and timestamps. Update and delete run inside an explicit
//! transaction.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel_async::scoped_futures::ScopedFutureExt;
use diesel_async::{AsyncConnection, RunQueryDsl};
use tracing::debug;

use crate::domain::ports::{UserPersistenceError, UserRepository};
use crate::domain::{NewUser, Page, User, UserChanges, UserId};

use super::models::{NewUserRow, UserRow, UserUpdate};
use super::pool::{DbPool, PoolError};
use super::schema::users;

/// Diesel-backed implementation of the [`UserRepository`] port.
#[derive(Clone)]
pub struct DieselUserRepository {
    pool: DbPool,
}

impl DieselUserRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

fn map_pool_error(error: PoolError) -> UserPersistenceError {
    UserPersistenceError::connection(error.message())
}

fn map_diesel_error(error: diesel::result::Error) -> UserPersistenceError {
    use diesel::result::{DatabaseErrorKind, Error as DieselError};

    match &error {
        DieselError::DatabaseError(kind, info) => {
            debug!(?kind, message = info.message(), "diesel operation failed");
        }
        other => debug!(error = %other, "diesel operation failed"),
    }

    match error {
        DieselError::DatabaseError(
            DatabaseErrorKind::ClosedConnection | DatabaseErrorKind::UnableToSendCommand,
            _,
        ) => UserPersistenceError::connection("database connection error"),
        DieselError::QueryBuilderError(_) => UserPersistenceError::query("database query error"),
        DieselError::NotFound => UserPersistenceError::query("record not found"),
        _ => UserPersistenceError::query("database error"),
    }
}

#[async_trait]
impl UserRepository for DieselUserRepository {
    async fn insert(&self, user: &NewUser) -> Result<User, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = diesel::insert_into(users::table)
            .values(NewUserRow::from(user))
            .returning(UserRow::as_returning())
            .get_result(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(row.into())
    }

    async fn find_by_id(&self, id: UserId) -> Result<Option<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let row = users::table
            .find(id.get())
            .select(UserRow::as_select())
            .first(&mut conn)
            .await
            .optional()
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn list(&self, page: Page) -> Result<Vec<User>, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let rows = users::table
            .order(users::id.asc())
            .offset(i64::from(page.skip))
            .limit(i64::from(page.limit))
            .select(UserRow::as_select())
            .load(&mut conn)
            .await
            .map_err(map_diesel_error)?;
        Ok(rows.into_iter().map(User::from).collect())
    }

    async fn update(
        &self,
        id: UserId,
        changes: &UserChanges,
    ) -> Result<Option<User>, UserPersistenceError> {
        // Diesel rejects an empty SET clause; nothing to write anyway.
        if changes.is_empty() {
            return self.find_by_id(id).await;
        }

        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let changeset = UserUpdate::from(changes);
        let row = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::update(users::table.find(id.get()))
                        .set(&changeset)
                        .returning(UserRow::as_returning())
                        .get_result(conn)
                        .await
                        .optional()
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(row.map(User::from))
    }

    async fn delete(&self, id: UserId) -> Result<bool, UserPersistenceError> {
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;
        let removed = conn
            .transaction::<_, diesel::result::Error, _>(|conn| {
                async move {
                    diesel::delete(users::table.find(id.get()))
                        .execute(conn)
                        .await
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;
        Ok(removed > 0)
    }
}

#[cfg(test)]
mod tests {
    //! Error mapping coverage; query behaviour is exercised against an
    //! embedded PostgreSQL cluster in `tests/diesel_user_repository.rs`.
    use super::*;
    use diesel::result::{DatabaseErrorKind, Error as DieselError};
    use rstest::rstest;

    #[rstest]
    fn pool_errors_map_to_connection() {
        let err = map_pool_error(PoolError::checkout("timed out"));
        assert_eq!(err, UserPersistenceError::connection("timed out"));
    }

    #[rstest]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::ClosedConnection, Box::new(String::from("closed"))),
        true
    )]
    #[case(
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, Box::new(String::from("dup"))),
        false
    )]
    #[case(DieselError::NotFound, false)]
    #[case(DieselError::RollbackTransaction, false)]
    fn diesel_errors_map_by_kind(#[case] error: DieselError, #[case] is_connection: bool) {
        let mapped = map_diesel_error(error);
        assert_eq!(
            matches!(mapped, UserPersistenceError::Connection { .. }),
            is_connection
        );
    }

    #[rstest]
    fn empty_changes_build_no_columns() {
        let changes = UserChanges::default();
        let update = UserUpdate::from(&changes);
        assert!(update.name.is_none() && update.surname.is_none() && update.password.is_none());
    }
}

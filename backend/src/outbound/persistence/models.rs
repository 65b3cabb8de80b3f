//! Internal Diesel row structs for database operations.
//!
//! These types never leave the persistence layer.

use chrono::{DateTime, Utc};
use diesel::prelude::*;

use crate::domain::{NewUser, Password, User, UserChanges, UserId};

use super::schema::users;

/// Row struct for reading from the users table.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = users)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub(crate) struct UserRow {
    pub id: i64,
    pub name: String,
    pub surname: String,
    pub password: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<UserRow> for User {
    fn from(row: UserRow) -> Self {
        Self {
            id: UserId::new(row.id),
            name: row.name,
            surname: row.surname,
            password: Password::new(row.password),
            created_at: row.created_at,
            updated_at: row.updated_at,
        }
    }
}

/// Insertable struct for creating new user records.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = users)]
pub(crate) struct NewUserRow<'a> {
    pub name: &'a str,
    pub surname: &'a str,
    pub password: &'a str,
}

impl<'a> From<&'a NewUser> for NewUserRow<'a> {
    fn from(user: &'a NewUser) -> Self {
        Self {
            name: &user.name,
            surname: &user.surname,
            password: user.password.expose(),
        }
    }
}

/// Changeset for partial updates; `None` columns are left untouched.
#[derive(Debug, Clone, AsChangeset)]
#[diesel(table_name = users)]
pub(crate) struct UserUpdate<'a> {
    pub name: Option<&'a str>,
    pub surname: Option<&'a str>,
    pub password: Option<&'a str>,
}

impl<'a> From<&'a UserChanges> for UserUpdate<'a> {
    fn from(changes: &'a UserChanges) -> Self {
        Self {
            name: changes.name.as_deref(),
            surname: changes.surname.as_deref(),
            password: changes.password.as_ref().map(Password::expose),
        }
    }
}

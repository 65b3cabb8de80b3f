//! Shared helper utilities for user service integration tests.
//!
//! Integration tests compile as separate crates under `backend/tests/`; this
//! module is their common home for embedded PostgreSQL provisioning and the
//! cluster skip policy.

pub mod cluster_skip;
pub mod embedded_postgres;

pub use cluster_skip::handle_cluster_setup_failure;
pub use embedded_postgres::{drop_users_table, provision_database};

/// Render a `postgres` error with the SQLSTATE and server message.
///
/// `postgres::Error`'s `Display` often collapses to a bare `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    match error.as_db_error() {
        Some(db_error) => format!(
            "postgres error {:?}: {}",
            db_error.code(),
            db_error.message()
        ),
        None => error.to_string(),
    }
}

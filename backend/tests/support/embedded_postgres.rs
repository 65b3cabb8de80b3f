//! Embedded PostgreSQL provisioning for integration tests.
//!
//! Each test gets a fresh temporary database on the process-wide shared
//! cluster, migrated with the same embedded migrations the binary runs.

use pg_embedded_setup_unpriv::TemporaryDatabase;
use pg_embedded_setup_unpriv::test_support::shared_cluster_handle;
use postgres::{Client, NoTls};
use user_service::outbound::persistence::run_migrations;

use super::format_postgres_error;

/// Create and migrate a temporary database.
pub fn provision_database() -> Result<TemporaryDatabase, String> {
    let cluster = shared_cluster_handle().map_err(|err| format!("shared cluster: {err:?}"))?;
    let database = cluster
        .temporary_database(format!("test_{}", uuid::Uuid::new_v4().simple()))
        .map_err(|err| format!("create database: {err:?}"))?;
    run_migrations(&database.url()).map_err(|err| err.to_string())?;
    Ok(database)
}

/// Drop the `users` table to force query failures.
pub fn drop_users_table(url: &str) -> Result<(), String> {
    let mut client = Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))?;
    client
        .batch_execute("DROP TABLE IF EXISTS users;")
        .map_err(|err| format_postgres_error(&err))
}

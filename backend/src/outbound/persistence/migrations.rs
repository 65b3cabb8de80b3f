//! Embedded Diesel migrations applied at start-up.

use diesel::{Connection, PgConnection};
use diesel_migrations::{EmbeddedMigrations, MigrationHarness, embed_migrations};
use tracing::info;

use crate::domain::TraceId;

/// Migrations compiled into the binary from `backend/migrations`.
pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("migrations");

/// Errors raised while applying migrations.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum MigrationError {
    #[error("could not connect to run migrations: {message}")]
    Connect { message: String },
    #[error("migration failed: {message}")]
    Apply { message: String },
}

/// Apply every pending migration, returning the versions that ran.
///
/// Blocking; call from [`run_migrations_blocking`] inside async code.
pub fn run_migrations(database_url: &str) -> Result<Vec<String>, MigrationError> {
    let mut conn = PgConnection::establish(database_url).map_err(|err| MigrationError::Connect {
        message: err.to_string(),
    })?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|err| MigrationError::Apply {
            message: err.to_string(),
        })?;
    let versions: Vec<String> = applied.iter().map(ToString::to_string).collect();
    info!(applied = versions.len(), "database migrations applied");
    Ok(versions)
}

/// Run [`run_migrations`] on the blocking thread pool.
pub async fn run_migrations_blocking(database_url: String) -> Result<Vec<String>, MigrationError> {
    let trace_id = TraceId::current();
    tokio::task::spawn_blocking(move || match trace_id {
        Some(id) => tracing::info_span!("migrations", trace_id = %id)
            .in_scope(|| run_migrations(&database_url)),
        None => run_migrations(&database_url),
    })
    .await
    .map_err(|err| MigrationError::Apply {
        message: format!("migration task failed: {err}"),
    })?
}

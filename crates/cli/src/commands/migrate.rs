//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! plooma migrate
//! ```
//!
//! # Environment Variables
//!
//! - `PLOOMA_DATABASE_URL` - `PostgreSQL` connection string (or `DATABASE_URL`)
//!
//! Migrations live in `crates/web/migrations/` and are embedded in the
//! binary at build time.

use plooma_web::db::MIGRATOR;
use thiserror::Error;

use super::{CommandError, connect};

/// Errors that can occur while migrating.
#[derive(Debug, Error)]
pub enum MigrationError {
    #[error(transparent)]
    Connect(#[from] CommandError),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),
}

/// Run all pending migrations.
///
/// # Errors
///
/// Returns an error if the database is unreachable or a migration fails.
pub async fn run() -> Result<(), MigrationError> {
    let pool = connect().await?;

    tracing::info!(available = MIGRATOR.iter().count(), "Running migrations...");
    MIGRATOR.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}

//! Shared test utilities.
//!
//! Helpers for setting up in-memory `SQLite` databases with the utility
//! tables and the `updated_at` trigger in place.

use crate::{bootstrap, config::BootstrapConfig, db, errors::Result};
use sea_orm::DatabaseConnection;

/// Creates an in-memory `SQLite` database with both utility tables and the trigger.
/// This is the standard setup for unit tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    db::create_tables(&db).await?;
    db::create_sqlite_trigger(&db).await?;
    Ok(db)
}

/// Creates an in-memory database and runs the default bootstrap on it.
pub async fn setup_bootstrapped_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    bootstrap::run(&db, &BootstrapConfig::default()).await?;
    Ok(db)
}

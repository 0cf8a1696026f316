//! Database initialization
//!
//! Opens (creating if needed) the SQLite database and brings the schema up to
//! the current version.

use crate::Result;
use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions};
use sqlx::SqlitePool;
use std::path::Path;
use std::time::Duration;
use tracing::info;

/// Busy timeout applied to every connection
const BUSY_TIMEOUT: Duration = Duration::from_millis(5000);

/// Open the database without touching the schema
pub async fn connect_database(db_path: &Path) -> Result<SqlitePool> {
    let newly_created = !db_path.exists();

    if let Some(parent) = db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }

    // Per-connection settings; WAL lets readers proceed while a request writes
    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal)
        .busy_timeout(BUSY_TIMEOUT)
        .foreign_keys(true);

    let pool = SqlitePoolOptions::new()
        .max_connections(10)
        .connect_with(options)
        .await?;

    if newly_created {
        info!("Initialized new database: {}", db_path.display());
    } else {
        info!("Opened existing database: {}", db_path.display());
    }

    Ok(pool)
}

/// Open the database and apply pending migrations
pub async fn init_database(db_path: &Path) -> Result<SqlitePool> {
    let pool = connect_database(db_path).await?;
    crate::db::migrations::run_migrations(&pool).await?;
    Ok(pool)
}

/// In-memory database with the current schema
///
/// Limited to a single never-recycled connection: every SQLite `:memory:`
/// connection is a separate database.
pub async fn init_memory_database() -> Result<SqlitePool> {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .idle_timeout(None)
        .max_lifetime(None)
        .connect("sqlite::memory:")
        .await?;

    crate::db::migrations::run_migrations(&pool).await?;
    Ok(pool)
}

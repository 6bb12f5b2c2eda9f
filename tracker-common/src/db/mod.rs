//! Read-only database access
//!
//! Assembly never writes; every pool handed to the fetch layer is opened
//! with SQLite `mode=ro`.

use crate::{Error, Result};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use std::path::Path;
use tracing::info;

/// Default pool size: root fetch plus one connection per sub-resource fetch
pub const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// Connect to an existing database in read-only mode
pub async fn connect_readonly(db_path: &Path, max_connections: u32) -> Result<SqlitePool> {
    if !db_path.exists() {
        return Err(Error::NotFound(format!(
            "Database not found: {}",
            db_path.display()
        )));
    }

    // mode=ro: Read-only mode
    // immutable=1: SQLite won't write even for internal operations
    let db_url = format!("sqlite://{}?mode=ro&immutable=1", db_path.display());

    let pool = SqlitePoolOptions::new()
        .max_connections(max_connections.max(1))
        .connect(&db_url)
        .await?;

    info!("Connected to {} (read-only)", db_path.display());

    Ok(pool)
}

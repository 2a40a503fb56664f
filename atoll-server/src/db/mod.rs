//! Database access for atoll-server

pub mod assets;
pub mod islands;
pub mod trails;

use anyhow::Result;
use sqlx::SqlitePool;
use std::path::Path;

/// Initialize database connection pool
///
/// Connects to the SQLite file named in the configuration, creating it
/// (and its parent directory) on first run.
pub async fn init_database_pool(db_path: &Path) -> Result<SqlitePool> {
    // Ensure parent directory exists
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    // Use proper SQLite URI with mode=rwc (read, write, create)
    let db_url = format!("sqlite://{}?mode=rwc", db_path.display());
    tracing::debug!("Connecting to database: {}", db_url);

    let pool = SqlitePool::connect(&db_url).await?;

    init_tables(&pool).await?;

    Ok(pool)
}

/// Create the atoll tables if they don't exist
///
/// Public so integration tests can initialize an in-memory database.
pub async fn init_tables(pool: &SqlitePool) -> Result<()> {
    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS islands (
            island_id TEXT PRIMARY KEY,
            name TEXT NOT NULL UNIQUE,
            description TEXT NOT NULL DEFAULT '',
            owner TEXT NOT NULL,
            center_x REAL NOT NULL DEFAULT 0,
            center_y REAL NOT NULL DEFAULT 0,
            camera_x REAL NOT NULL DEFAULT 0,
            camera_y REAL NOT NULL DEFAULT 0,
            camera_z REAL NOT NULL DEFAULT 0,
            cover_path TEXT NOT NULL DEFAULT '',
            archipelago TEXT NOT NULL DEFAULT '',
            country TEXT NOT NULL DEFAULT '',
            move_speed REAL NOT NULL DEFAULT 0.7,
            rotate_speed REAL NOT NULL DEFAULT 0.5,
            scale_speed REAL NOT NULL DEFAULT 1.0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_islands_owner ON islands(owner)")
        .execute(pool)
        .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS stored_files (
            file_id TEXT PRIMARY KEY,
            name TEXT NOT NULL,
            category TEXT NOT NULL,
            path TEXT NOT NULL,
            island_id TEXT NOT NULL,
            height REAL NOT NULL DEFAULT 0,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_stored_files_island ON stored_files(island_id, category)",
    )
    .execute(pool)
    .await?;

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS trails (
            trail_id TEXT PRIMARY KEY,
            island_name TEXT NOT NULL,
            name TEXT NOT NULL,
            path TEXT NOT NULL,
            category TEXT NOT NULL,
            created_at TEXT NOT NULL
        )
        "#,
    )
    .execute(pool)
    .await?;

    sqlx::query(
        "CREATE INDEX IF NOT EXISTS idx_trails_island ON trails(island_name, category)",
    )
    .execute(pool)
    .await?;

    tracing::info!("Database tables initialized (islands, stored_files, trails)");

    Ok(())
}

pub(crate) fn parse_timestamp(
    value: &str,
    column: &str,
) -> atoll_common::Result<chrono::DateTime<chrono::Utc>> {
    chrono::DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&chrono::Utc))
        .map_err(|e| atoll_common::Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

pub(crate) fn parse_uuid(value: &str, column: &str) -> atoll_common::Result<uuid::Uuid> {
    uuid::Uuid::parse_str(value)
        .map_err(|e| atoll_common::Error::Internal(format!("Failed to parse {}: {}", column, e)))
}

//! Stored file database operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use atoll_common::Result;

use crate::models::StoredFile;
use crate::pagination::PageParams;

use super::{parse_timestamp, parse_uuid};

/// Per-island, per-category record counts for the system log
#[derive(Debug)]
pub struct CategoryCount {
    pub island_id: Uuid,
    pub category: String,
    pub total: i64,
}

fn stored_file_from_row(row: &SqliteRow) -> Result<StoredFile> {
    let file_id: String = row.get("file_id");
    let island_id: String = row.get("island_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(StoredFile {
        file_id: parse_uuid(&file_id, "file_id")?,
        name: row.get("name"),
        category: row.get("category"),
        path: row.get("path"),
        island_id: parse_uuid(&island_id, "island_id")?,
        height: row.get("height"),
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

/// Insert a new stored file record
pub async fn create_stored_file(pool: &SqlitePool, file: &StoredFile) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO stored_files (
            file_id, name, category, path, island_id, height, created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(file.file_id.to_string())
    .bind(&file.name)
    .bind(&file.category)
    .bind(&file.path)
    .bind(file.island_id.to_string())
    .bind(file.height)
    .bind(file.created_at.to_rfc3339())
    .bind(file.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one stored file by id
pub async fn load_stored_file(pool: &SqlitePool, file_id: Uuid) -> Result<Option<StoredFile>> {
    let row = sqlx::query(
        r#"
        SELECT file_id, name, category, path, island_id, height, created_at, updated_at
        FROM stored_files
        WHERE file_id = ?
        "#,
    )
    .bind(file_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(stored_file_from_row).transpose()
}

/// One page of an island's files plus the total count, newest first
pub async fn list_stored_files(
    pool: &SqlitePool,
    island_id: Uuid,
    params: PageParams,
) -> Result<(Vec<StoredFile>, i64)> {
    let island_id = island_id.to_string();

    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM stored_files WHERE island_id = ?")
        .bind(&island_id)
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(
        r#"
        SELECT file_id, name, category, path, island_id, height, created_at, updated_at
        FROM stored_files
        WHERE island_id = ?
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
    )
    .bind(&island_id)
    .bind(params.page_size)
    .bind(params.offset())
    .fetch_all(pool)
    .await?;

    let files = rows
        .iter()
        .map(stored_file_from_row)
        .collect::<Result<Vec<_>>>()?;
    Ok((files, total))
}

/// Every file of an island, oldest first, for scene aggregation
pub async fn list_all_stored_files(pool: &SqlitePool, island_id: Uuid) -> Result<Vec<StoredFile>> {
    let rows = sqlx::query(
        r#"
        SELECT file_id, name, category, path, island_id, height, created_at, updated_at
        FROM stored_files
        WHERE island_id = ?
        ORDER BY created_at ASC
        "#,
    )
    .bind(island_id.to_string())
    .fetch_all(pool)
    .await?;

    rows.iter().map(stored_file_from_row).collect()
}

/// Set the render height of one stored file
pub async fn update_height(pool: &SqlitePool, file_id: Uuid, height: f64) -> Result<()> {
    sqlx::query("UPDATE stored_files SET height = ?, updated_at = ? WHERE file_id = ?")
        .bind(height)
        .bind(chrono::Utc::now().to_rfc3339())
        .bind(file_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Delete a stored file record
pub async fn delete_stored_file(pool: &SqlitePool, file_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM stored_files WHERE file_id = ?")
        .bind(file_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Record counts grouped by island and category, for the system log
pub async fn global_counts(pool: &SqlitePool) -> Result<Vec<CategoryCount>> {
    let rows = sqlx::query(
        r#"
        SELECT island_id, category, COUNT(*) AS total
        FROM stored_files
        GROUP BY island_id, category
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            let island_id: String = row.get("island_id");
            Ok(CategoryCount {
                island_id: parse_uuid(&island_id, "island_id")?,
                category: row.get("category"),
                total: row.get("total"),
            })
        })
        .collect()
}

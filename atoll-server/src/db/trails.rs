//! Trail database operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use atoll_common::Result;

use crate::models::Trail;
use crate::pagination::PageParams;

use super::{parse_timestamp, parse_uuid};

/// Per-island, per-category trail counts for the system log.
///
/// Trails hang off the island name rather than its id.
#[derive(Debug)]
pub struct TrailCount {
    pub island_name: String,
    pub category: String,
    pub total: i64,
}

fn trail_from_row(row: &SqliteRow) -> Result<Trail> {
    let trail_id: String = row.get("trail_id");
    let created_at: String = row.get("created_at");

    Ok(Trail {
        trail_id: parse_uuid(&trail_id, "trail_id")?,
        island_name: row.get("island_name"),
        name: row.get("name"),
        path: row.get("path"),
        category: row.get("category"),
        created_at: parse_timestamp(&created_at, "created_at")?,
    })
}

/// Insert a new trail record
pub async fn create_trail(pool: &SqlitePool, trail: &Trail) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO trails (trail_id, island_name, name, path, category, created_at)
        VALUES (?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(trail.trail_id.to_string())
    .bind(&trail.island_name)
    .bind(&trail.name)
    .bind(&trail.path)
    .bind(&trail.category)
    .bind(trail.created_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one trail by id
pub async fn load_trail(pool: &SqlitePool, trail_id: Uuid) -> Result<Option<Trail>> {
    let row = sqlx::query(
        r#"
        SELECT trail_id, island_name, name, path, category, created_at
        FROM trails
        WHERE trail_id = ?
        "#,
    )
    .bind(trail_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(trail_from_row).transpose()
}

/// One page of an island's trails in a category, newest first.
///
/// An optional substring filter narrows by trail name.
pub async fn list_trails(
    pool: &SqlitePool,
    island_name: &str,
    category: &str,
    trail_name: Option<&str>,
    params: PageParams,
) -> Result<(Vec<Trail>, i64)> {
    let mut where_sql = String::from("WHERE island_name = ? AND category = ?");
    if trail_name.is_some() {
        where_sql.push_str(" AND name LIKE ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM trails {}", where_sql);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql)
        .bind(island_name)
        .bind(category);
    if let Some(name) = trail_name {
        count_query = count_query.bind(format!("%{}%", name));
    }
    let total = count_query.fetch_one(pool).await?;

    let select_sql = format!(
        r#"
        SELECT trail_id, island_name, name, path, category, created_at
        FROM trails
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut query = sqlx::query(&select_sql).bind(island_name).bind(category);
    if let Some(name) = trail_name {
        query = query.bind(format!("%{}%", name));
    }
    let rows = query
        .bind(params.page_size)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let trails = rows.iter().map(trail_from_row).collect::<Result<Vec<_>>>()?;
    Ok((trails, total))
}

/// Delete a trail record
pub async fn delete_trail(pool: &SqlitePool, trail_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM trails WHERE trail_id = ?")
        .bind(trail_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

/// Trail counts grouped by island name and category, for the system log
pub async fn global_counts(pool: &SqlitePool) -> Result<Vec<TrailCount>> {
    let rows = sqlx::query(
        r#"
        SELECT island_name, category, COUNT(*) AS total
        FROM trails
        GROUP BY island_name, category
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter()
        .map(|row| {
            Ok(TrailCount {
                island_name: row.get("island_name"),
                category: row.get("category"),
                total: row.get("total"),
            })
        })
        .collect()
}

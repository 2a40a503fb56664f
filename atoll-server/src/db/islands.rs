//! Island database operations

use sqlx::{sqlite::SqliteRow, Row, SqlitePool};
use uuid::Uuid;

use atoll_common::Result;

use crate::models::Island;
use crate::pagination::PageParams;

use super::{parse_timestamp, parse_uuid};

/// Optional filters for the island list, always scoped to one owner.
#[derive(Debug, Default)]
pub struct IslandFilter {
    pub owner: String,
    /// Substring match on the island name
    pub name: Option<String>,
    pub archipelago: Option<String>,
    pub country: Option<String>,
}

fn island_from_row(row: &SqliteRow) -> Result<Island> {
    let island_id: String = row.get("island_id");
    let created_at: String = row.get("created_at");
    let updated_at: String = row.get("updated_at");

    Ok(Island {
        island_id: parse_uuid(&island_id, "island_id")?,
        name: row.get("name"),
        description: row.get("description"),
        owner: row.get("owner"),
        center_x: row.get("center_x"),
        center_y: row.get("center_y"),
        camera_x: row.get("camera_x"),
        camera_y: row.get("camera_y"),
        camera_z: row.get("camera_z"),
        cover_path: row.get("cover_path"),
        archipelago: row.get("archipelago"),
        country: row.get("country"),
        move_speed: row.get("move_speed"),
        rotate_speed: row.get("rotate_speed"),
        scale_speed: row.get("scale_speed"),
        created_at: parse_timestamp(&created_at, "created_at")?,
        updated_at: parse_timestamp(&updated_at, "updated_at")?,
    })
}

/// Insert a new island record
pub async fn create_island(pool: &SqlitePool, island: &Island) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO islands (
            island_id, name, description, owner,
            center_x, center_y, camera_x, camera_y, camera_z,
            cover_path, archipelago, country,
            move_speed, rotate_speed, scale_speed,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        "#,
    )
    .bind(island.island_id.to_string())
    .bind(&island.name)
    .bind(&island.description)
    .bind(&island.owner)
    .bind(island.center_x)
    .bind(island.center_y)
    .bind(island.camera_x)
    .bind(island.camera_y)
    .bind(island.camera_z)
    .bind(&island.cover_path)
    .bind(&island.archipelago)
    .bind(&island.country)
    .bind(island.move_speed)
    .bind(island.rotate_speed)
    .bind(island.scale_speed)
    .bind(island.created_at.to_rfc3339())
    .bind(island.updated_at.to_rfc3339())
    .execute(pool)
    .await?;

    Ok(())
}

/// Load one island by id
pub async fn load_island(pool: &SqlitePool, island_id: Uuid) -> Result<Option<Island>> {
    let row = sqlx::query(
        r#"
        SELECT island_id, name, description, owner,
               center_x, center_y, camera_x, camera_y, camera_z,
               cover_path, archipelago, country,
               move_speed, rotate_speed, scale_speed,
               created_at, updated_at
        FROM islands
        WHERE island_id = ?
        "#,
    )
    .bind(island_id.to_string())
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(island_from_row).transpose()
}

/// Load one island by its unique name
pub async fn find_island_by_name(pool: &SqlitePool, name: &str) -> Result<Option<Island>> {
    let row = sqlx::query(
        r#"
        SELECT island_id, name, description, owner,
               center_x, center_y, camera_x, camera_y, camera_z,
               cover_path, archipelago, country,
               move_speed, rotate_speed, scale_speed,
               created_at, updated_at
        FROM islands
        WHERE name = ?
        "#,
    )
    .bind(name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(island_from_row).transpose()
}

/// One page of an owner's islands plus the total matching count.
///
/// The name filter is a substring match; archipelago and country are
/// exact. Newest first.
pub async fn list_islands(
    pool: &SqlitePool,
    filter: &IslandFilter,
    params: PageParams,
) -> Result<(Vec<Island>, i64)> {
    let mut where_sql = String::from("WHERE owner = ?");
    if filter.name.is_some() {
        where_sql.push_str(" AND name LIKE ?");
    }
    if filter.archipelago.is_some() {
        where_sql.push_str(" AND archipelago = ?");
    }
    if filter.country.is_some() {
        where_sql.push_str(" AND country = ?");
    }

    let count_sql = format!("SELECT COUNT(*) FROM islands {}", where_sql);
    let mut count_query = sqlx::query_scalar::<_, i64>(&count_sql).bind(&filter.owner);
    if let Some(name) = &filter.name {
        count_query = count_query.bind(format!("%{}%", name));
    }
    if let Some(archipelago) = &filter.archipelago {
        count_query = count_query.bind(archipelago);
    }
    if let Some(country) = &filter.country {
        count_query = count_query.bind(country);
    }
    let total = count_query.fetch_one(pool).await?;

    let select_sql = format!(
        r#"
        SELECT island_id, name, description, owner,
               center_x, center_y, camera_x, camera_y, camera_z,
               cover_path, archipelago, country,
               move_speed, rotate_speed, scale_speed,
               created_at, updated_at
        FROM islands
        {}
        ORDER BY created_at DESC
        LIMIT ? OFFSET ?
        "#,
        where_sql
    );
    let mut query = sqlx::query(&select_sql).bind(&filter.owner);
    if let Some(name) = &filter.name {
        query = query.bind(format!("%{}%", name));
    }
    if let Some(archipelago) = &filter.archipelago {
        query = query.bind(archipelago);
    }
    if let Some(country) = &filter.country {
        query = query.bind(country);
    }
    let rows = query
        .bind(params.page_size)
        .bind(params.offset())
        .fetch_all(pool)
        .await?;

    let islands = rows.iter().map(island_from_row).collect::<Result<Vec<_>>>()?;
    Ok((islands, total))
}

/// Every island, for the system log summary
pub async fn list_all_islands(pool: &SqlitePool) -> Result<Vec<Island>> {
    let rows = sqlx::query(
        r#"
        SELECT island_id, name, description, owner,
               center_x, center_y, camera_x, camera_y, camera_z,
               cover_path, archipelago, country,
               move_speed, rotate_speed, scale_speed,
               created_at, updated_at
        FROM islands
        ORDER BY created_at DESC
        "#,
    )
    .fetch_all(pool)
    .await?;

    rows.iter().map(island_from_row).collect()
}

/// Overwrite every mutable column of an island
pub async fn update_island(pool: &SqlitePool, island: &Island) -> Result<()> {
    sqlx::query(
        r#"
        UPDATE islands SET
            name = ?, description = ?, owner = ?,
            center_x = ?, center_y = ?, camera_x = ?, camera_y = ?, camera_z = ?,
            cover_path = ?, archipelago = ?, country = ?,
            move_speed = ?, rotate_speed = ?, scale_speed = ?,
            updated_at = ?
        WHERE island_id = ?
        "#,
    )
    .bind(&island.name)
    .bind(&island.description)
    .bind(&island.owner)
    .bind(island.center_x)
    .bind(island.center_y)
    .bind(island.camera_x)
    .bind(island.camera_y)
    .bind(island.camera_z)
    .bind(&island.cover_path)
    .bind(&island.archipelago)
    .bind(&island.country)
    .bind(island.move_speed)
    .bind(island.rotate_speed)
    .bind(island.scale_speed)
    .bind(island.updated_at.to_rfc3339())
    .bind(island.island_id.to_string())
    .execute(pool)
    .await?;

    Ok(())
}

/// Delete an island record
pub async fn delete_island(pool: &SqlitePool, island_id: Uuid) -> Result<()> {
    sqlx::query("DELETE FROM islands WHERE island_id = ?")
        .bind(island_id.to_string())
        .execute(pool)
        .await?;

    Ok(())
}

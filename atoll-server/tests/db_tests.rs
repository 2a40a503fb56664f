//! Repository tests against an in-memory database
//!
//! Exercises the island, stored-file and trail repositories directly:
//! round-trips, filtered listing, pagination, counts and deletion.

use chrono::{Duration, Utc};
use sqlx::sqlite::SqlitePoolOptions;
use sqlx::SqlitePool;
use uuid::Uuid;

use atoll_server::db;
use atoll_server::db::islands::IslandFilter;
use atoll_server::models::{Island, StoredFile, Trail};
use atoll_server::pagination::PageParams;

async fn setup_pool() -> SqlitePool {
    let pool = SqlitePoolOptions::new()
        .max_connections(1)
        .connect(":memory:")
        .await
        .expect("Should create in-memory database");
    db::init_tables(&pool).await.expect("Should create tables");
    pool
}

fn make_island(name: &str, owner: &str) -> Island {
    let now = Utc::now();
    Island {
        island_id: Uuid::new_v4(),
        name: name.to_string(),
        description: "a test island".to_string(),
        owner: owner.to_string(),
        center_x: 121.5,
        center_y: 31.2,
        camera_x: 121.6,
        camera_y: 31.3,
        camera_z: 800.0,
        cover_path: format!("uploads/{}/{}/cover.jpg", owner, name),
        archipelago: "Azores".to_string(),
        country: "Portugal".to_string(),
        move_speed: 0.7,
        rotate_speed: 0.5,
        scale_speed: 1.0,
        created_at: now,
        updated_at: now,
    }
}

fn make_file(island_id: Uuid, category: &str, name: &str) -> StoredFile {
    let now = Utc::now();
    StoredFile {
        file_id: Uuid::new_v4(),
        name: name.to_string(),
        category: category.to_string(),
        path: format!("uploads/mao/Atlantis/{}/{}", category, name),
        island_id,
        height: 0.0,
        created_at: now,
        updated_at: now,
    }
}

fn make_trail(island_name: &str, category: &str, name: &str) -> Trail {
    Trail {
        trail_id: Uuid::new_v4(),
        island_name: island_name.to_string(),
        name: name.to_string(),
        path: format!("uploads/trails/{}/{}/{}", island_name, category, name),
        category: category.to_string(),
        created_at: Utc::now(),
    }
}

fn page(page: i64, page_size: i64) -> PageParams {
    PageParams::from_options(Some(page), Some(page_size))
}

// =============================================================================
// Islands
// =============================================================================

#[tokio::test]
async fn test_island_round_trip() {
    let pool = setup_pool().await;
    let island = make_island("Atlantis", "mao");

    db::islands::create_island(&pool, &island).await.unwrap();
    let loaded = db::islands::load_island(&pool, island.island_id)
        .await
        .unwrap()
        .expect("island should exist");

    assert_eq!(loaded.island_id, island.island_id);
    assert_eq!(loaded.name, "Atlantis");
    assert_eq!(loaded.owner, "mao");
    assert_eq!(loaded.center_x, 121.5);
    assert_eq!(loaded.camera_z, 800.0);
    assert_eq!(loaded.move_speed, 0.7);
    assert_eq!(loaded.created_at, island.created_at);
    assert_eq!(loaded.updated_at, island.updated_at);
}

#[tokio::test]
async fn test_find_island_by_name() {
    let pool = setup_pool().await;
    let island = make_island("Atlantis", "mao");
    db::islands::create_island(&pool, &island).await.unwrap();

    let found = db::islands::find_island_by_name(&pool, "Atlantis")
        .await
        .unwrap();
    assert_eq!(found.map(|i| i.island_id), Some(island.island_id));

    let missing = db::islands::find_island_by_name(&pool, "Nowhere")
        .await
        .unwrap();
    assert!(missing.is_none());
}

#[tokio::test]
async fn test_list_islands_filters() {
    let pool = setup_pool().await;

    let mut azores = make_island("Atlantis", "mao");
    azores.archipelago = "Azores".to_string();
    let mut cyclades = make_island("Borealis", "mao");
    cyclades.archipelago = "Cyclades".to_string();
    cyclades.country = "Greece".to_string();
    let foreign = make_island("Foreign", "other");

    for island in [&azores, &cyclades, &foreign] {
        db::islands::create_island(&pool, island).await.unwrap();
    }

    let filter = IslandFilter {
        owner: "mao".to_string(),
        name: None,
        archipelago: None,
        country: None,
    };
    let (islands, total) = db::islands::list_islands(&pool, &filter, page(1, 10))
        .await
        .unwrap();
    assert_eq!(total, 2);
    assert_eq!(islands.len(), 2);

    let filter = IslandFilter {
        owner: "mao".to_string(),
        name: Some("orea".to_string()),
        archipelago: None,
        country: None,
    };
    let (islands, total) = db::islands::list_islands(&pool, &filter, page(1, 10))
        .await
        .unwrap();
    assert_eq!(total, 1);
    assert_eq!(islands[0].name, "Borealis");

    let filter = IslandFilter {
        owner: "mao".to_string(),
        name: None,
        archipelago: Some("Cyclades".to_string()),
        country: Some("Greece".to_string()),
    };
    let (_, total) = db::islands::list_islands(&pool, &filter, page(1, 10))
        .await
        .unwrap();
    assert_eq!(total, 1);

    // Exact match only for archipelago
    let filter = IslandFilter {
        owner: "mao".to_string(),
        name: None,
        archipelago: Some("Cycl".to_string()),
        country: None,
    };
    let (_, total) = db::islands::list_islands(&pool, &filter, page(1, 10))
        .await
        .unwrap();
    assert_eq!(total, 0);
}

#[tokio::test]
async fn test_update_island() {
    let pool = setup_pool().await;
    let mut island = make_island("Atlantis", "mao");
    db::islands::create_island(&pool, &island).await.unwrap();

    island.description = "revised".to_string();
    island.camera_z = 1200.0;
    island.move_speed = 0.9;
    island.updated_at = Utc::now();
    db::islands::update_island(&pool, &island).await.unwrap();

    let loaded = db::islands::load_island(&pool, island.island_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.description, "revised");
    assert_eq!(loaded.camera_z, 1200.0);
    assert_eq!(loaded.move_speed, 0.9);
    assert_eq!(loaded.updated_at, island.updated_at);
}

#[tokio::test]
async fn test_delete_island() {
    let pool = setup_pool().await;
    let island = make_island("Atlantis", "mao");
    db::islands::create_island(&pool, &island).await.unwrap();

    db::islands::delete_island(&pool, island.island_id)
        .await
        .unwrap();

    let loaded = db::islands::load_island(&pool, island.island_id)
        .await
        .unwrap();
    assert!(loaded.is_none());
}

// =============================================================================
// Stored Files
// =============================================================================

#[tokio::test]
async fn test_stored_file_round_trip_and_height() {
    let pool = setup_pool().await;
    let island_id = Uuid::new_v4();
    let file = make_file(island_id, "tif", "terrain");

    db::assets::create_stored_file(&pool, &file).await.unwrap();

    let loaded = db::assets::load_stored_file(&pool, file.file_id)
        .await
        .unwrap()
        .expect("file should exist");
    assert_eq!(loaded.name, "terrain");
    assert_eq!(loaded.category, "tif");
    assert_eq!(loaded.island_id, island_id);
    assert_eq!(loaded.height, 0.0);

    db::assets::update_height(&pool, file.file_id, 42.5)
        .await
        .unwrap();
    let loaded = db::assets::load_stored_file(&pool, file.file_id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.height, 42.5);
    assert!(loaded.updated_at >= loaded.created_at);
}

#[tokio::test]
async fn test_list_stored_files_pagination() {
    let pool = setup_pool().await;
    let island_id = Uuid::new_v4();

    for name in ["a", "b", "c"] {
        let file = make_file(island_id, "models", name);
        db::assets::create_stored_file(&pool, &file).await.unwrap();
    }

    let (files, total) = db::assets::list_stored_files(&pool, island_id, page(1, 2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(files.len(), 2);

    let (files, total) = db::assets::list_stored_files(&pool, island_id, page(2, 2))
        .await
        .unwrap();
    assert_eq!(total, 3);
    assert_eq!(files.len(), 1);
}

#[tokio::test]
async fn test_list_all_stored_files_oldest_first() {
    let pool = setup_pool().await;
    let island_id = Uuid::new_v4();

    let mut old = make_file(island_id, "tif", "old");
    old.created_at = Utc::now() - Duration::seconds(60);
    let new = make_file(island_id, "tif", "new");

    db::assets::create_stored_file(&pool, &new).await.unwrap();
    db::assets::create_stored_file(&pool, &old).await.unwrap();

    let files = db::assets::list_all_stored_files(&pool, island_id)
        .await
        .unwrap();
    assert_eq!(files.len(), 2);
    assert_eq!(files[0].name, "old");
    assert_eq!(files[1].name, "new");
}

#[tokio::test]
async fn test_asset_global_counts() {
    let pool = setup_pool().await;
    let first = Uuid::new_v4();
    let second = Uuid::new_v4();

    for (island_id, category, name) in [
        (first, "tif", "t1"),
        (first, "tif", "t2"),
        (first, "models", "m1"),
        (second, "shp", "s1"),
    ] {
        let file = make_file(island_id, category, name);
        db::assets::create_stored_file(&pool, &file).await.unwrap();
    }

    let counts = db::assets::global_counts(&pool).await.unwrap();
    let lookup = |island: Uuid, category: &str| {
        counts
            .iter()
            .find(|c| c.island_id == island && c.category == category)
            .map(|c| c.total)
    };
    assert_eq!(lookup(first, "tif"), Some(2));
    assert_eq!(lookup(first, "models"), Some(1));
    assert_eq!(lookup(second, "shp"), Some(1));
    assert_eq!(lookup(second, "tif"), None);
}

// =============================================================================
// Trails
// =============================================================================

#[tokio::test]
async fn test_trail_round_trip_and_listing() {
    let pool = setup_pool().await;

    for name in ["north.json", "south.json"] {
        let trail = make_trail("Atlantis", "history_trail", name);
        db::trails::create_trail(&pool, &trail).await.unwrap();
    }
    let other = make_trail("Atlantis", "annotation", "notes.json");
    db::trails::create_trail(&pool, &other).await.unwrap();

    let (trails, total) =
        db::trails::list_trails(&pool, "Atlantis", "history_trail", None, page(1, 10))
            .await
            .unwrap();
    assert_eq!(total, 2);
    assert_eq!(trails.len(), 2);

    // Name substring filter narrows further
    let (trails, total) =
        db::trails::list_trails(&pool, "Atlantis", "history_trail", Some("nor"), page(1, 10))
            .await
            .unwrap();
    assert_eq!(total, 1);
    assert_eq!(trails[0].name, "north.json");

    let loaded = db::trails::load_trail(&pool, other.trail_id)
        .await
        .unwrap()
        .expect("trail should exist");
    assert_eq!(loaded.category, "annotation");
    assert_eq!(loaded.island_name, "Atlantis");
}

#[tokio::test]
async fn test_trail_delete_and_counts() {
    let pool = setup_pool().await;

    let keep = make_trail("Atlantis", "history_trail", "keep.json");
    let drop = make_trail("Atlantis", "history_trail", "drop.json");
    let elsewhere = make_trail("Borealis", "annotation", "other.json");
    for trail in [&keep, &drop, &elsewhere] {
        db::trails::create_trail(&pool, trail).await.unwrap();
    }

    db::trails::delete_trail(&pool, drop.trail_id).await.unwrap();
    assert!(db::trails::load_trail(&pool, drop.trail_id)
        .await
        .unwrap()
        .is_none());

    let counts = db::trails::global_counts(&pool).await.unwrap();
    let lookup = |island: &str, category: &str| {
        counts
            .iter()
            .find(|c| c.island_name == island && c.category == category)
            .map(|c| c.total)
    };
    assert_eq!(lookup("Atlantis", "history_trail"), Some(1));
    assert_eq!(lookup("Borealis", "annotation"), Some(1));
}

//! Data models for atoll-server

use std::fmt;

use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// Upload categories understood by the ingest pipeline.
///
/// The wire tag (`data_type` form field, `category` column) is the
/// lowercase name. Anything else is rejected before any I/O happens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Shp,
    Tif,
    Models,
    Txt,
    Jpg,
    Weather,
    Mapping,
}

impl Category {
    /// Parse the wire tag used by upload requests and stored records.
    pub fn parse(tag: &str) -> Option<Category> {
        match tag {
            "shp" => Some(Category::Shp),
            "tif" => Some(Category::Tif),
            "models" => Some(Category::Models),
            "txt" => Some(Category::Txt),
            "jpg" => Some(Category::Jpg),
            "weather" => Some(Category::Weather),
            "mapping" => Some(Category::Mapping),
            _ => None,
        }
    }

    /// Tag used in request fields, stored records and directory names.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Shp => "shp",
            Category::Tif => "tif",
            Category::Models => "models",
            Category::Txt => "txt",
            Category::Jpg => "jpg",
            Category::Weather => "weather",
            Category::Mapping => "mapping",
        }
    }

    /// Whether uploads of this category arrive as zip containers that must
    /// be extracted before the payload can be stored.
    pub fn is_archive(&self) -> bool {
        matches!(self, Category::Shp | Category::Tif)
    }

    /// Extension of the payload file searched for after extraction.
    /// `None` for categories stored as-is.
    pub fn payload_extension(&self) -> Option<&'static str> {
        match self {
            Category::Shp => Some("shp"),
            Category::Tif => Some("tif"),
            _ => None,
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An island workspace owned by one user.
///
/// `center_x`/`center_y` anchor the scene origin and `camera_x`/`camera_y`/
/// `camera_z` the initial camera; the viewer reads latitude from Y and
/// longitude from X when these are exported.
#[derive(Debug, Clone, Serialize)]
pub struct Island {
    pub island_id: Uuid,
    pub name: String,
    pub description: String,
    pub owner: String,
    pub center_x: f64,
    pub center_y: f64,
    pub camera_x: f64,
    pub camera_y: f64,
    pub camera_z: f64,
    /// Stored path of the cover image, relative to the process working
    /// directory. List responses rewrite it into a URL.
    pub cover_path: String,
    pub archipelago: String,
    pub country: String,
    pub move_speed: f64,
    pub rotate_speed: f64,
    pub scale_speed: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Default interaction speeds applied when an island is created without
/// explicit values.
pub const DEFAULT_MOVE_SPEED: f64 = 0.7;
pub const DEFAULT_ROTATE_SPEED: f64 = 0.5;
pub const DEFAULT_SCALE_SPEED: f64 = 1.0;

/// Metadata record for one ingested asset.
///
/// `category` keeps the raw tag the record was stored with; records whose
/// tag is no longer a recognized [`Category`] are tolerated (skipped by the
/// export, deleted like plain files).
#[derive(Debug, Clone, Serialize)]
pub struct StoredFile {
    pub file_id: Uuid,
    /// Original filename without its last extension.
    pub name: String,
    pub category: String,
    /// Canonical stored path, verbatim as produced by the ingest pipeline.
    pub path: String,
    pub island_id: Uuid,
    /// Render height; meaningful for shp and tif layers only. The only
    /// mutable field.
    pub height: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Metadata record for a trail or annotation file, kept by island name.
#[derive(Debug, Clone, Serialize)]
pub struct Trail {
    pub trail_id: Uuid,
    pub island_name: String,
    /// Original filename, extension included.
    pub name: String,
    pub path: String,
    /// Free-form grouping tag, e.g. `history_trail` or `annotation`.
    pub category: String,
    pub created_at: DateTime<Utc>,
}

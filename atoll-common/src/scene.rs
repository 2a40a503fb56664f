//! Wire types for the viewer scene export.
//!
//! The JSON produced here is consumed by a deployed viewer client; the key
//! names (camelCase, fixed collection names) are a compatibility contract
//! and must not be renamed.

use serde::{Deserialize, Serialize};

/// Geographic anchor used for the scene origin.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLon {
    pub lat: f64,
    pub lon: f64,
}

/// Camera anchor: geographic position plus height above it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLonHeight {
    pub lat: f64,
    pub lon: f64,
    pub height: f64,
}

/// Vector layer entry. `path` is the on-disk payload path, readable by the
/// viewer host directly.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorEntry {
    pub name: String,
    pub path: String,
    pub height: f64,
}

/// Raster layer entry. Unlike vectors, `path` is an HTTP URL served by
/// this process.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RasterEntry {
    pub name: String,
    pub path: String,
    pub height: f64,
}

/// Entry for the plain collections (models, pictures, text).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileEntry {
    pub name: String,
    pub path: String,
}

/// Complete scene description for one island.
///
/// Every collection is always present; an island with no matching files
/// serializes them as `[]`, never as `null`. The origin and camera anchors
/// follow the viewer's axis convention: latitude comes from the Y
/// coordinate, longitude from the X coordinate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SceneExport {
    pub project_name: String,
    pub cesium_origin: LatLon,
    pub play_position: LatLonHeight,
    pub vectors: Vec<VectorEntry>,
    pub rasters: Vec<RasterEntry>,
    pub models: Vec<FileEntry>,
    pub pictures: Vec<FileEntry>,
    pub text: Vec<FileEntry>,
}

impl SceneExport {
    /// Scene with the given anchors and all collections empty.
    pub fn empty(project_name: String, cesium_origin: LatLon, play_position: LatLonHeight) -> Self {
        Self {
            project_name,
            cesium_origin,
            play_position,
            vectors: Vec::new(),
            rasters: Vec::new(),
            models: Vec::new(),
            pictures: Vec::new(),
            text: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_viewer_contract_keys() {
        let scene = SceneExport::empty(
            "Atlantis".to_string(),
            LatLon { lat: 20.0, lon: 10.0 },
            LatLonHeight {
                lat: 21.0,
                lon: 11.0,
                height: 500.0,
            },
        );

        let value = serde_json::to_value(&scene).unwrap();
        assert_eq!(value["projectName"], "Atlantis");
        assert_eq!(value["cesiumOrigin"]["lat"], 20.0);
        assert_eq!(value["cesiumOrigin"]["lon"], 10.0);
        assert_eq!(value["playPosition"]["height"], 500.0);

        // Empty collections must serialize as arrays, not be omitted
        for key in ["vectors", "rasters", "models", "pictures", "text"] {
            assert!(value[key].is_array(), "{} should be an array", key);
            assert_eq!(value[key].as_array().unwrap().len(), 0);
        }
    }

    #[test]
    fn round_trips_entries() {
        let mut scene = SceneExport::empty(
            "Borealis".to_string(),
            LatLon { lat: 0.0, lon: 0.0 },
            LatLonHeight {
                lat: 0.0,
                lon: 0.0,
                height: 0.0,
            },
        );
        scene.vectors.push(VectorEntry {
            name: "coastline".to_string(),
            path: "uploads/mao/Borealis/shp/coastline/coastline.shp".to_string(),
            height: 12.5,
        });
        scene.rasters.push(RasterEntry {
            name: "terrain".to_string(),
            path: "http://localhost:9090/uploads/mao/Borealis/tif/terrain/terrain.tif".to_string(),
            height: 0.0,
        });

        let json = serde_json::to_string(&scene).unwrap();
        let back: SceneExport = serde_json::from_str(&json).unwrap();
        assert_eq!(back, scene);
    }
}

//! Scene aggregation: compile an island's flat file records into the
//! typed scene document consumed by the 3D viewer.

use atoll_common::scene::{FileEntry, LatLon, LatLonHeight, RasterEntry, SceneExport, VectorEntry};

use crate::models::{Category, Island, StoredFile};

/// Public download URL for a stored relative path, served by the static
/// file route.
pub fn public_url(host: &str, path: &str) -> String {
    format!("http://{host}/{path}")
}

/// Build the scene document for one island.
///
/// Coordinates cross over on the way out: the viewer wants `lat`/`lon`,
/// the island stores `x`/`y`, and latitude is the Y axis. Raster paths
/// are rewritten to public URLs because the viewer streams them over
/// HTTP; every other entry keeps the stored path. Weather and mapping
/// records are bookkeeping only and never enter the scene, as are
/// records with tags this version does not know.
pub fn aggregate(island: &Island, files: &[StoredFile], host: &str) -> SceneExport {
    let mut scene = SceneExport::empty(
        island.name.clone(),
        LatLon {
            lat: island.center_y,
            lon: island.center_x,
        },
        LatLonHeight {
            lat: island.camera_y,
            lon: island.camera_x,
            height: island.camera_z,
        },
    );

    for file in files {
        match Category::parse(&file.category) {
            Some(Category::Shp) => scene.vectors.push(VectorEntry {
                name: file.name.clone(),
                path: file.path.clone(),
                height: file.height,
            }),
            Some(Category::Tif) => scene.rasters.push(RasterEntry {
                name: file.name.clone(),
                path: public_url(host, &file.path),
                height: file.height,
            }),
            Some(Category::Models) => scene.models.push(FileEntry {
                name: file.name.clone(),
                path: file.path.clone(),
            }),
            Some(Category::Jpg) => scene.pictures.push(FileEntry {
                name: file.name.clone(),
                path: file.path.clone(),
            }),
            Some(Category::Txt) => scene.text.push(FileEntry {
                name: file.name.clone(),
                path: file.path.clone(),
            }),
            Some(Category::Weather) | Some(Category::Mapping) | None => {}
        }
    }

    scene
}

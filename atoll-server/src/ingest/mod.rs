//! Type-dispatching upload processor.
//!
//! Every upload is either stored as-is (models, txt, jpg, weather, mapping)
//! or treated as a zip container holding the real payload (shp, tif):
//! write the container, extract it into a sibling directory named after the
//! container stem, drop the container, then find the payload file by
//! extension. Whichever path results (located payload or as-is file) is
//! what gets persisted.
//!
//! Failures are not rolled back. Every error variant reports the artifacts
//! that were written before it, so callers and operators know exactly what
//! remains on disk.

pub mod archive;
pub mod layout;
pub mod locate;

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::{debug, warn};

use crate::models::Category;
use archive::ArchiveError;
use locate::LocateError;

/// One upload, as handed over by the boundary layer.
#[derive(Debug)]
pub struct UploadRequest {
    pub owner: String,
    pub island: String,
    pub category: Category,
    /// Original filename as sent by the client.
    pub filename: String,
    pub bytes: Vec<u8>,
}

/// Errors raised by the upload pipeline.
#[derive(Debug, Error)]
pub enum UploadError {
    /// The request named a category the pipeline does not know. Raised at
    /// the boundary, before any filesystem work.
    #[error("unsupported category {0:?}")]
    UnsupportedCategory(String),

    /// The target directory could not be created.
    #[error("failed to create {dir}: {source}")]
    DirectoryCreate {
        dir: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The uploaded bytes could not be written.
    #[error("failed to save {path}: {source}")]
    Save {
        path: PathBuf,
        #[source]
        source: io::Error,
        leftovers: Vec<PathBuf>,
    },

    /// The container could not be extracted.
    #[error("failed to extract {archive}: {source}")]
    Extract {
        archive: PathBuf,
        #[source]
        source: ArchiveError,
        leftovers: Vec<PathBuf>,
    },

    /// The extraction directory could not be searched for the payload.
    #[error("failed to search {dir} for the payload: {source}")]
    Search {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
        leftovers: Vec<PathBuf>,
    },

    /// The archive extracted cleanly but holds no payload file.
    #[error("no .{extension} payload found under {dir}")]
    PayloadNotFound {
        extension: String,
        dir: PathBuf,
        leftovers: Vec<PathBuf>,
    },
}

impl UploadError {
    /// Paths written before the failure that remain on disk.
    pub fn leftovers(&self) -> &[PathBuf] {
        match self {
            UploadError::UnsupportedCategory(_) | UploadError::DirectoryCreate { .. } => &[],
            UploadError::Save { leftovers, .. }
            | UploadError::Extract { leftovers, .. }
            | UploadError::Search { leftovers, .. }
            | UploadError::PayloadNotFound { leftovers, .. } => leftovers,
        }
    }
}

/// Store one upload under `root` and return the canonical stored path.
///
/// Plain categories: the uploaded bytes written into the category
/// directory under the original filename.
///
/// Archive categories: the container is written the same way, extracted
/// into `<container minus extension>/`, removed, and the first file
/// matching the category's payload extension becomes the stored path.
pub fn process(request: &UploadRequest, root: &Path) -> Result<PathBuf, UploadError> {
    let dir = layout::asset_dir(root, &request.owner, &request.island, request.category);
    layout::ensure_dir(&dir).map_err(|source| UploadError::DirectoryCreate {
        dir: dir.clone(),
        source,
    })?;

    let saved = dir.join(&request.filename);
    fs::write(&saved, &request.bytes).map_err(|source| UploadError::Save {
        path: saved.clone(),
        source,
        leftovers: Vec::new(),
    })?;
    debug!(path = %saved.display(), bytes = request.bytes.len(), "upload written");

    let Some(extension) = request.category.payload_extension() else {
        return Ok(saved);
    };

    let extraction_dir = saved.with_extension("");
    if let Err(source) = archive::extract(&saved, &extraction_dir) {
        return Err(UploadError::Extract {
            archive: saved.clone(),
            source,
            leftovers: existing(vec![saved, extraction_dir]),
        });
    }

    // The container is only a transport wrapper. Failing to drop it leaves
    // a stray file, not a broken upload.
    if let Err(e) = fs::remove_file(&saved) {
        warn!(path = %saved.display(), "failed to remove extracted container: {}", e);
    }

    match locate::locate(&extraction_dir, extension) {
        Ok(payload) => {
            debug!(payload = %payload.display(), "payload located");
            Ok(payload)
        }
        Err(LocateError::NotFound { extension, dir }) => Err(UploadError::PayloadNotFound {
            extension,
            dir,
            leftovers: existing(vec![saved, extraction_dir]),
        }),
        Err(LocateError::Walk { dir, source }) => Err(UploadError::Search {
            dir,
            source,
            leftovers: existing(vec![saved, extraction_dir]),
        }),
    }
}

/// Remove the on-disk artifact behind a stored file record.
///
/// Archive-derived records own their whole extraction directory (the parent
/// of the stored payload path); plain records own just the stored file.
/// Records with an unrecognized legacy tag are treated as plain. A path
/// that is already gone counts as removed.
pub fn remove_stored_artifact(category: Option<Category>, stored_path: &Path) -> io::Result<()> {
    let is_archive = category.map(|c| c.is_archive()).unwrap_or(false);
    let result = if is_archive {
        match stored_path.parent() {
            Some(parent) => fs::remove_dir_all(parent),
            None => Ok(()),
        }
    } else {
        fs::remove_file(stored_path)
    };
    match result {
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        other => other,
    }
}

fn existing(candidates: Vec<PathBuf>) -> Vec<PathBuf> {
    candidates.into_iter().filter(|path| path.exists()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::write::SimpleFileOptions;

    fn zip_bytes(entries: &[(&str, &[u8])]) -> Vec<u8> {
        let mut writer = zip::ZipWriter::new(std::io::Cursor::new(Vec::new()));
        let options = SimpleFileOptions::default();
        for (name, bytes) in entries {
            writer.start_file(*name, options).unwrap();
            writer.write_all(bytes).unwrap();
        }
        writer.finish().unwrap().into_inner()
    }

    fn request(category: Category, filename: &str, bytes: Vec<u8>) -> UploadRequest {
        UploadRequest {
            owner: "mao".to_string(),
            island: "Atlantis".to_string(),
            category,
            filename: filename.to_string(),
            bytes,
        }
    }

    #[test]
    fn plain_category_stores_as_is() {
        let tmp = tempfile::tempdir().unwrap();
        let req = request(Category::Jpg, "photo.jpg", b"jpeg bytes".to_vec());

        let stored = process(&req, tmp.path()).unwrap();

        assert_eq!(stored, tmp.path().join("mao/Atlantis/jpg/photo.jpg"));
        assert_eq!(fs::read(&stored).unwrap(), b"jpeg bytes");
    }

    #[test]
    fn archive_category_extracts_and_locates_payload() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[
            ("island.tif", b"raster".as_slice()),
            ("readme.txt", b"notes".as_slice()),
        ]);
        let req = request(Category::Tif, "island.zip", bytes);

        let stored = process(&req, tmp.path()).unwrap();

        assert_eq!(stored, tmp.path().join("mao/Atlantis/tif/island/island.tif"));
        assert_eq!(fs::read(&stored).unwrap(), b"raster");
        // The container is gone, the sibling entry is extracted
        assert!(!tmp.path().join("mao/Atlantis/tif/island.zip").exists());
        assert!(tmp.path().join("mao/Atlantis/tif/island/readme.txt").exists());
    }

    #[test]
    fn nested_payload_is_found() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("shapes/coast.shp", b"shape".as_slice())]);
        let req = request(Category::Shp, "coast.zip", bytes);

        let stored = process(&req, tmp.path()).unwrap();
        assert_eq!(
            stored,
            tmp.path().join("mao/Atlantis/shp/coast/shapes/coast.shp")
        );
    }

    #[test]
    fn missing_payload_reports_leftover_extraction_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let bytes = zip_bytes(&[("readme.txt", b"no payload here".as_slice())]);
        let req = request(Category::Tif, "empty.zip", bytes);

        let err = process(&req, tmp.path()).unwrap_err();
        let extraction_dir = tmp.path().join("mao/Atlantis/tif/empty");

        match &err {
            UploadError::PayloadNotFound { extension, dir, .. } => {
                assert_eq!(extension, "tif");
                assert_eq!(dir, &extraction_dir);
            }
            other => panic!("unexpected error: {other}"),
        }
        // The container was already removed, the extraction dir remains
        assert!(!tmp.path().join("mao/Atlantis/tif/empty.zip").exists());
        assert_eq!(err.leftovers(), &[extraction_dir]);
    }

    #[test]
    fn garbage_archive_reports_saved_container() {
        let tmp = tempfile::tempdir().unwrap();
        let req = request(Category::Shp, "broken.zip", b"not a zip".to_vec());

        let err = process(&req, tmp.path()).unwrap_err();
        let saved = tmp.path().join("mao/Atlantis/shp/broken.zip");

        assert!(matches!(err, UploadError::Extract { .. }));
        assert!(saved.exists());
        assert!(err.leftovers().contains(&saved));
    }

    #[test]
    fn remove_artifact_for_archive_category_drops_extraction_dir() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("tif/island");
        fs::create_dir_all(&dir).unwrap();
        let payload = dir.join("island.tif");
        fs::write(&payload, b"x").unwrap();
        fs::write(dir.join("readme.txt"), b"y").unwrap();

        remove_stored_artifact(Some(Category::Tif), &payload).unwrap();
        assert!(!dir.exists());
        assert!(tmp.path().join("tif").exists());
    }

    #[test]
    fn remove_artifact_for_plain_category_drops_only_the_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("jpg");
        fs::create_dir_all(&dir).unwrap();
        let photo = dir.join("photo.jpg");
        fs::write(&photo, b"x").unwrap();
        fs::write(dir.join("other.jpg"), b"y").unwrap();

        remove_stored_artifact(Some(Category::Jpg), &photo).unwrap();
        assert!(!photo.exists());
        assert!(dir.join("other.jpg").exists());
    }

    #[test]
    fn remove_artifact_tolerates_missing_paths() {
        let tmp = tempfile::tempdir().unwrap();
        let gone = tmp.path().join("never/was.jpg");
        remove_stored_artifact(Some(Category::Jpg), &gone).unwrap();
        remove_stored_artifact(None, &gone).unwrap();
    }
}

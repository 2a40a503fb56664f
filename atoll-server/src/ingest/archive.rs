//! Zip extraction for archive-category uploads.
//!
//! Flat, synchronous extraction of a whole container into a destination
//! directory. Entry paths are preserved relative to the destination, and
//! entries that would resolve outside it (absolute paths, `..` traversal)
//! abort the extraction.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

/// Errors raised while extracting an uploaded archive.
#[derive(Debug, Error)]
pub enum ArchiveError {
    /// The container file could not be opened.
    #[error("failed to open archive {path}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// The container is not readable as a zip.
    #[error("failed to read archive {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// An entry names a path outside the destination directory.
    #[error("archive entry {name:?} escapes the destination directory")]
    UnsafeEntry { name: String },

    /// Filesystem failure while writing extracted content.
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Extract `archive` into `dest`, creating `dest` and nested entry
/// directories as needed.
///
/// Extraction is not transactional: entries written before a failure stay
/// on disk. The caller owns cleanup decisions.
pub fn extract(archive: &Path, dest: &Path) -> Result<(), ArchiveError> {
    let file = fs::File::open(archive).map_err(|source| ArchiveError::Open {
        path: archive.to_path_buf(),
        source,
    })?;
    let mut zip = zip::ZipArchive::new(file).map_err(|source| ArchiveError::Read {
        path: archive.to_path_buf(),
        source,
    })?;

    fs::create_dir_all(dest).map_err(|source| ArchiveError::Write {
        path: dest.to_path_buf(),
        source,
    })?;

    let entry_count = zip.len();
    for index in 0..entry_count {
        let mut entry = zip.by_index(index).map_err(|source| ArchiveError::Read {
            path: archive.to_path_buf(),
            source,
        })?;

        // enclosed_name() yields None for absolute paths and `..` components
        let relative = match entry.enclosed_name() {
            Some(relative) => relative,
            None => {
                return Err(ArchiveError::UnsafeEntry {
                    name: entry.name().to_string(),
                })
            }
        };
        let target = dest.join(relative);

        if entry.is_dir() {
            fs::create_dir_all(&target).map_err(|source| ArchiveError::Write {
                path: target.clone(),
                source,
            })?;
            continue;
        }

        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent).map_err(|source| ArchiveError::Write {
                path: parent.to_path_buf(),
                source,
            })?;
        }

        let mut out = fs::File::create(&target).map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
        io::copy(&mut entry, &mut out).map_err(|source| ArchiveError::Write {
            path: target.clone(),
            source,
        })?;
    }

    debug!(archive = %archive.display(), entries = entry_count, "archive extracted");
    Ok(())
}

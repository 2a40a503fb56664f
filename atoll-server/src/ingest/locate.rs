//! Payload discovery inside an extracted archive.

use std::path::{Path, PathBuf};

use thiserror::Error;
use walkdir::WalkDir;

/// Errors raised while searching for the payload file.
#[derive(Debug, Error)]
pub enum LocateError {
    /// The directory tree could not be traversed.
    #[error("failed to search {dir}: {source}")]
    Walk {
        dir: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// No file with the wanted extension exists under the directory.
    #[error("no .{extension} file under {dir}")]
    NotFound { extension: String, dir: PathBuf },
}

/// Find the first file under `dir` whose name ends in `.<extension>`,
/// matched case-insensitively.
///
/// The walk is depth-first with entries sorted by file name, so the result
/// is independent of filesystem enumeration order, and it stops at the
/// first hit: with both `a/data.shp` and `b/data.shp` present, `a/data.shp`
/// wins.
pub fn locate(dir: &Path, extension: &str) -> Result<PathBuf, LocateError> {
    let suffix = format!(".{}", extension.to_ascii_lowercase());

    for entry in WalkDir::new(dir).sort_by_file_name() {
        let entry = entry.map_err(|source| LocateError::Walk {
            dir: dir.to_path_buf(),
            source,
        })?;
        if !entry.file_type().is_file() {
            continue;
        }
        let name = entry.file_name().to_string_lossy();
        if name.to_ascii_lowercase().ends_with(&suffix) {
            return Ok(entry.into_path());
        }
    }

    Err(LocateError::NotFound {
        extension: extension.to_string(),
        dir: dir.to_path_buf(),
    })
}

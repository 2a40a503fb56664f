//! Canonical on-disk layout for stored uploads.
//!
//! Pure path construction keyed by owner, island and category. Nothing in
//! here touches the filesystem except [`ensure_dir`]. The produced paths
//! are embedded verbatim in database records, so changing the layout is a
//! breaking change for existing data.

use std::io;
use std::path::{Path, PathBuf};

use crate::models::Category;

/// Directory holding every asset of one category for one island:
/// `<root>/<owner>/<island>/<category>`.
pub fn asset_dir(root: &Path, owner: &str, island: &str, category: Category) -> PathBuf {
    root.join(owner).join(island).join(category.as_str())
}

/// Directory holding an island's own files (the cover image):
/// `<root>/<owner>/<island>`.
pub fn island_dir(root: &Path, owner: &str, island: &str) -> PathBuf {
    root.join(owner).join(island)
}

/// Directory for trail files: `<root>/trails/<island>/<category>`.
///
/// Trails are keyed by island name rather than owner, mirroring how their
/// records reference islands.
pub fn trail_dir(root: &Path, island: &str, category: &str) -> PathBuf {
    root.join("trails").join(island).join(category)
}

/// Create `dir` and any missing parents. Idempotent.
pub fn ensure_dir(dir: &Path) -> io::Result<()> {
    std::fs::create_dir_all(dir)
}

/// Filename with its last extension removed: `coast.zip` becomes `coast`,
/// `a.b.c` becomes `a.b`, and a name without a dot is returned unchanged.
pub fn strip_extension(filename: &str) -> &str {
    match filename.rsplit_once('.') {
        Some((stem, _)) => stem,
        None => filename,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn asset_dir_layout() {
        let dir = asset_dir(Path::new("uploads"), "mao", "Atlantis", Category::Tif);
        assert_eq!(dir, PathBuf::from("uploads/mao/Atlantis/tif"));
    }

    #[test]
    fn island_dir_layout() {
        let dir = island_dir(Path::new("uploads"), "mao", "Atlantis");
        assert_eq!(dir, PathBuf::from("uploads/mao/Atlantis"));
    }

    #[test]
    fn trail_dir_layout() {
        let dir = trail_dir(Path::new("uploads"), "Atlantis", "history_trail");
        assert_eq!(dir, PathBuf::from("uploads/trails/Atlantis/history_trail"));
    }

    #[test]
    fn strip_extension_variants() {
        assert_eq!(strip_extension("coast.zip"), "coast");
        assert_eq!(strip_extension("a.b.c"), "a.b");
        assert_eq!(strip_extension("noext"), "noext");
        assert_eq!(strip_extension(".hidden"), "");
        assert_eq!(strip_extension("trailing."), "trailing");
    }

    #[test]
    fn ensure_dir_is_idempotent() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("a/b/c");
        ensure_dir(&dir).unwrap();
        ensure_dir(&dir).unwrap();
        assert!(dir.is_dir());
    }
}

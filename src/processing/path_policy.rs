//! Naming convention for compressed texture variants.
//!
//! A compressed variant lives next to its source with [`COMPRESSION_SUFFIX`]
//! inserted before the extension: `wall.png` becomes `wall_COMPRESSED.png`.
//! Earlier imports rely on this exact name to find cached results.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

pub const COMPRESSION_SUFFIX: &str = "_COMPRESSED";

/// Derive the compressed sibling path for `path`.
///
/// The marker is not deduplicated: deriving an already-derived path inserts
/// it a second time.
#[must_use]
pub fn to_compressed_path(path: &Path) -> PathBuf {
    let Some(file_name) = path.file_name() else {
        let mut raw = path.as_os_str().to_owned();
        raw.push(COMPRESSION_SUFFIX);
        return PathBuf::from(raw);
    };

    let mut name = OsString::with_capacity(file_name.len() + COMPRESSION_SUFFIX.len());
    match (path.file_stem(), path.extension()) {
        (Some(stem), Some(ext)) => {
            name.push(stem);
            name.push(COMPRESSION_SUFFIX);
            name.push(".");
            name.push(ext);
        }
        _ => {
            name.push(file_name);
            name.push(COMPRESSION_SUFFIX);
        }
    }
    path.with_file_name(name)
}

/// Whether the marker occurs anywhere in `path`, directories included.
#[must_use]
pub fn is_compressed(path: &Path) -> bool {
    path.to_string_lossy().contains(COMPRESSION_SUFFIX)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn inserts_marker_before_extension() {
        assert_eq!(
            to_compressed_path(Path::new("/models/tex/wall.png")),
            PathBuf::from("/models/tex/wall_COMPRESSED.png")
        );
        assert_eq!(
            to_compressed_path(Path::new("albedo.JPG")),
            PathBuf::from("albedo_COMPRESSED.JPG")
        );
    }

    #[test]
    fn only_last_extension_is_split() {
        assert_eq!(
            to_compressed_path(Path::new("dir.v2/sky.hdr.exr")),
            PathBuf::from("dir.v2/sky.hdr_COMPRESSED.exr")
        );
    }

    #[test]
    fn missing_extension_appends_marker() {
        assert_eq!(
            to_compressed_path(Path::new("dir.v2/noext")),
            PathBuf::from("dir.v2/noext_COMPRESSED")
        );
    }

    #[test]
    fn deriving_twice_inserts_marker_twice() {
        let once = to_compressed_path(Path::new("wall.png"));
        let twice = to_compressed_path(&once);
        assert_eq!(twice, PathBuf::from("wall_COMPRESSED_COMPRESSED.png"));
        assert!(is_compressed(&once));
        assert!(is_compressed(&twice));
    }

    #[test]
    fn marker_anywhere_counts_as_compressed() {
        assert!(is_compressed(Path::new("/cache_COMPRESSED/wall.png")));
        assert!(!is_compressed(Path::new("/models/wall.png")));
        assert!(!is_compressed(Path::new("/models/wall_compressed.png")));
    }
}

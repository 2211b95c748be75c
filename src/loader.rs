//! Byte acquisition for source images.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::error::Error;

/// Source of raw image bytes. Missing files map to [`Error::FileNotFound`].
pub trait ImageLoader: Send + Sync {
    fn load(&self, path: &Path) -> Result<Vec<u8>, Error>;
}

/// Reads images from the local filesystem, relative to `root`.
///
/// Absolute paths passed to [`ImageLoader::load`] ignore the root.
#[derive(Debug, Clone, Default)]
pub struct FileLoader {
    root: PathBuf,
}

impl FileLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

impl ImageLoader for FileLoader {
    fn load(&self, path: &Path) -> Result<Vec<u8>, Error> {
        let full = self.root.join(path);
        match fs::read(&full) {
            Ok(bytes) => {
                debug!(bytes = bytes.len(), path = %full.display(), "loaded image bytes");
                Ok(bytes)
            }
            Err(err) if err.kind() == io::ErrorKind::NotFound => Err(Error::FileNotFound(full)),
            Err(source) => Err(Error::Io { path: full, source }),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn reads_relative_to_root() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a.png"), b"bytes").unwrap();
        let loader = FileLoader::new(dir.path());
        assert_eq!(loader.load(Path::new("a.png")).unwrap(), b"bytes");
    }

    #[test]
    fn absolute_paths_bypass_root() {
        let dir = tempdir().unwrap();
        let abs = dir.path().join("b.png");
        fs::write(&abs, b"b").unwrap();
        let loader = FileLoader::new("/nonexistent-root");
        assert_eq!(loader.load(&abs).unwrap(), b"b");
    }

    #[test]
    fn missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let loader = FileLoader::new(dir.path());
        match loader.load(Path::new("gone.png")) {
            Err(Error::FileNotFound(p)) => assert_eq!(p, dir.path().join("gone.png")),
            other => panic!("expected FileNotFound, got {other:?}"),
        }
    }
}

//! On-disk cache probe for compressed variants.
//!
//! There is no index: a compressed file's existence is the cache hit, and
//! every request probes the filesystem again.

use std::fs;
use std::path::Path;

/// Whether a compressed variant already exists at `derived`.
#[must_use]
pub fn exists(derived: &Path) -> bool {
    fs::metadata(derived).is_ok_and(|meta| meta.is_file())
}

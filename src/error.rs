use std::path::PathBuf;

use thiserror::Error;

/// Library error type for texture compression requests.
#[derive(Debug, Error)]
pub enum Error {
    /// The requested source image does not exist.
    #[error("image not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// Source bytes are not a decodable image.
    #[error("failed to decode {}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// No encoder exists for the file's extension.
    #[error("unsupported output format {extension:?} for {}", path.display())]
    UnsupportedFormat { path: PathBuf, extension: String },

    /// The encoder rejected the resampled buffer.
    #[error("failed to encode {}", path.display())]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    /// Reading the source or writing the compressed variant failed.
    #[error("i/o error on {}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// `init` has not been called for this service.
    #[error("compression service used before init")]
    NotInitialized,

    /// The tick pipeline was dropped before the request completed.
    #[error("compression pipeline stopped")]
    ServiceStopped,
}

//! The privileged drain step: one queued texture per [`CompressionPipeline::tick`].
//!
//! Only this type touches pixels. It owns the decoded buffer for the length of
//! a single tick and always removes the head it processed, failure or not, so
//! one bad texture cannot wedge the queue.

use std::fs;
use std::path::{Path, PathBuf};

use image::ImageFormat;
use tracing::{debug, error, info, warn};

use crate::config::CompressionSettings;
use crate::error::Error;
use crate::events::{CompressionOutcome, RequestId};
use crate::loader::ImageLoader;
use crate::processing::{cache, codec, path_policy};
use crate::tasks::queue::RequestQueue;

/// What a single tick did with the head request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TickReport {
    /// A compressed variant already existed; nothing was resampled or written.
    CacheHit { id: RequestId, result: PathBuf },
    /// The source is small enough to use as-is; nothing was written.
    BelowThreshold {
        id: RequestId,
        result: PathBuf,
        width: u32,
        height: u32,
    },
    /// The source was resampled and written to `result`.
    Compressed {
        id: RequestId,
        result: PathBuf,
        width: u32,
        height: u32,
    },
    /// The request failed; the error went to its requester.
    Failed { id: RequestId, source_path: PathBuf },
}

impl TickReport {
    pub const fn id(&self) -> RequestId {
        match self {
            Self::CacheHit { id, .. }
            | Self::BelowThreshold { id, .. }
            | Self::Compressed { id, .. }
            | Self::Failed { id, .. } => *id,
        }
    }
}

enum Processed {
    CacheHit(PathBuf),
    BelowThreshold { path: PathBuf, width: u32, height: u32 },
    Compressed { path: PathBuf, width: u32, height: u32 },
}

impl Processed {
    fn report(&self, id: RequestId) -> TickReport {
        match self {
            Self::CacheHit(path) => TickReport::CacheHit {
                id,
                result: path.clone(),
            },
            Self::BelowThreshold {
                path,
                width,
                height,
            } => TickReport::BelowThreshold {
                id,
                result: path.clone(),
                width: *width,
                height: *height,
            },
            Self::Compressed {
                path,
                width,
                height,
            } => TickReport::Compressed {
                id,
                result: path.clone(),
                width: *width,
                height: *height,
            },
        }
    }

    fn into_path(self) -> PathBuf {
        match self {
            Self::CacheHit(path)
            | Self::BelowThreshold { path, .. }
            | Self::Compressed { path, .. } => path,
        }
    }
}

pub struct CompressionPipeline {
    queue: RequestQueue,
    loader: Box<dyn ImageLoader>,
    settings: CompressionSettings,
}

impl CompressionPipeline {
    pub fn new(
        queue: RequestQueue,
        loader: Box<dyn ImageLoader>,
        settings: CompressionSettings,
    ) -> Self {
        Self {
            queue,
            loader,
            settings,
        }
    }

    /// Process the head request, if any, then dequeue it and reply.
    ///
    /// Returns `None` when the queue is empty.
    pub fn tick(&mut self) -> Option<TickReport> {
        let (id, source) = self.queue.peek_head()?;
        debug!(request = %id, path = %source.display(), "processing queue head");

        let processed = self.process(&source);
        let (report, outcome): (TickReport, CompressionOutcome) = match processed {
            Ok(done) => (done.report(id), Ok(done.into_path())),
            Err(err) => {
                error!(request = %id, path = %source.display(), error = %err, "compression failed");
                (
                    TickReport::Failed {
                        id,
                        source_path: source,
                    },
                    Err(err),
                )
            }
        };

        match self.queue.dequeue_head() {
            Some(request) => {
                debug_assert_eq!(request.id, id, "only the peeked head may be removed");
                request.complete(outcome);
            }
            None => warn!(request = %id, "queue emptied during tick"),
        }
        Some(report)
    }

    fn process(&self, source: &Path) -> Result<Processed, Error> {
        let bytes = self.loader.load(source)?;
        let hint = ImageFormat::from_path(source).ok();
        let image = codec::decode(&bytes, hint).map_err(|e| Error::Decode {
            path: source.to_path_buf(),
            source: e,
        })?;
        drop(bytes);

        // a cached variant only stands in for a source that still decodes
        let target = path_policy::to_compressed_path(source);
        if cache::exists(&target) {
            debug!(path = %target.display(), "compressed variant cached");
            return Ok(Processed::CacheHit(target));
        }

        let (width, height) = image.dimensions();
        let size = self.settings.target_size;
        if !codec::should_resample(width, height, size) {
            debug!(width, height, path = %source.display(), "within size budget; using source");
            return Ok(Processed::BelowThreshold {
                path: source.to_path_buf(),
                width,
                height,
            });
        }

        let format = codec::OutputFormat::from_path(source).inspect_err(|err| {
            warn!(error = %err, "texture resolution compression is not supported");
        })?;
        let resized = codec::resample_nearest(&image, size, size);
        drop(image);
        let encoded =
            codec::encode(&resized, format, self.settings.jpeg_quality).map_err(|e| {
                Error::Encode {
                    path: target.clone(),
                    source: e,
                }
            })?;
        fs::write(&target, &encoded).map_err(|e| Error::Io {
            path: target.clone(),
            source: e,
        })?;

        info!(
            width,
            height,
            size,
            %format,
            bytes = encoded.len(),
            path = %target.display(),
            "compressed texture"
        );
        Ok(Processed::Compressed {
            path: target,
            width,
            height,
        })
    }
}

impl Drop for CompressionPipeline {
    fn drop(&mut self) {
        let stranded = self.queue.close();
        if !stranded.is_empty() {
            warn!(count = stranded.len(), "pipeline stopped with pending requests");
        }
        for request in stranded {
            request.complete(Err(Error::ServiceStopped));
        }
    }
}

impl std::fmt::Debug for CompressionPipeline {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompressionPipeline")
            .field("pending", &self.queue.len())
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

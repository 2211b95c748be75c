//! Requester-facing facade over the queue and the tick pipeline.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use tokio::time::{MissedTickBehavior, interval};
use tracing::{debug, info, trace};

use crate::config::Configuration;
use crate::error::Error;
use crate::events::{CompressionRequest, RequestId};
use crate::loader::{FileLoader, ImageLoader};
use crate::progress::{ImportProgress, ProgressObserver, ProgressReporter};
use crate::tasks::pipeline::CompressionPipeline;
use crate::tasks::queue::RequestQueue;

/// What an importer needs from a texture compressor.
pub trait TextureCompressor {
    /// Resolve `image_file_name` and return the path to import instead.
    fn try_compress(
        &self,
        image_file_name: &Path,
    ) -> impl Future<Output = Result<PathBuf, Error>> + Send;
}

#[derive(Debug)]
struct Session {
    model_directory: PathBuf,
    reporter: Arc<ProgressReporter>,
}

#[derive(Debug)]
struct Inner {
    queue: RequestQueue,
    session: RwLock<Option<Session>>,
    next_id: AtomicU64,
    poll_interval: Duration,
}

/// Cheap to clone; clones submit into the same queue.
#[derive(Debug, Clone)]
pub struct CompressionService {
    inner: Arc<Inner>,
}

impl CompressionService {
    /// Build a service reading sources from disk, plus the pipeline the host
    /// must tick.
    pub fn new(cfg: &Configuration) -> (Self, CompressionPipeline) {
        Self::with_loader(cfg, Box::new(FileLoader::default()))
    }

    pub fn with_loader(
        cfg: &Configuration,
        loader: Box<dyn ImageLoader>,
    ) -> (Self, CompressionPipeline) {
        let queue = RequestQueue::new();
        let pipeline = CompressionPipeline::new(queue.clone(), loader, cfg.settings());
        let service = Self {
            inner: Arc::new(Inner {
                queue,
                session: RwLock::new(None),
                next_id: AtomicU64::new(1),
                poll_interval: cfg.poll_interval,
            }),
        };
        (service, pipeline)
    }

    /// Start a session for the model at `model_path`.
    ///
    /// Textures resolve against the model's directory. Progress counters start
    /// again from zero.
    pub fn init(&self, model_path: impl AsRef<Path>, observer: Arc<dyn ProgressObserver>) {
        let model_directory = model_path
            .as_ref()
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from("."));
        info!(dir = %model_directory.display(), "texture compression session started");
        let session = Session {
            model_directory,
            reporter: Arc::new(ProgressReporter::new(observer)),
        };
        *self
            .inner
            .session
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(session);
    }

    /// Queue `file_name` for compression and wait for the tick pipeline.
    ///
    /// Resolves to the compressed variant's path, or to the source path when
    /// the image is already small enough.
    ///
    /// # Errors
    /// [`Error::FileNotFound`] is returned before anything is queued. Decode,
    /// format and I/O failures come back from the pipeline once the request
    /// has been removed from the queue.
    pub async fn request_compression(&self, file_name: impl AsRef<Path>) -> Result<PathBuf, Error> {
        let (image_path, reporter) = self.resolve(file_name.as_ref())?;

        let id = RequestId(self.inner.next_id.fetch_add(1, Ordering::Relaxed));
        let (request, mut reply) = CompressionRequest::new(id, image_path);
        self.inner.queue.enqueue(request)?;
        reporter.record_requested();

        let mut heartbeat = interval(self.inner.poll_interval);
        heartbeat.set_missed_tick_behavior(MissedTickBehavior::Skip);
        heartbeat.tick().await;
        let outcome = loop {
            tokio::select! {
                res = &mut reply => break res.map_err(|_| Error::ServiceStopped)?,
                _ = heartbeat.tick() => {
                    trace!(request = %id, pending = self.inner.queue.len(), "waiting for compression");
                }
            }
        };

        let path = outcome?;
        reporter.record_completed();
        debug!(request = %id, result = %path.display(), "compression request done");
        Ok(path)
    }

    /// Counters of the current session, if one was started.
    pub fn progress(&self) -> Option<ImportProgress> {
        self.inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map(|s| s.reporter.snapshot())
    }

    /// Requests queued and not yet removed by the pipeline.
    pub fn pending(&self) -> usize {
        self.inner.queue.len()
    }

    fn resolve(&self, file_name: &Path) -> Result<(PathBuf, Arc<ProgressReporter>), Error> {
        let session = self
            .inner
            .session
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        let session = session.as_ref().ok_or(Error::NotInitialized)?;
        let image_path = session.model_directory.join(file_name);
        if !image_path.is_file() {
            return Err(Error::FileNotFound(image_path));
        }
        Ok((image_path, Arc::clone(&session.reporter)))
    }
}

impl TextureCompressor for CompressionService {
    fn try_compress(
        &self,
        image_file_name: &Path,
    ) -> impl Future<Output = Result<PathBuf, Error>> + Send {
        self.request_compression(image_file_name)
    }
}

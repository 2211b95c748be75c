use std::fmt;
use std::path::PathBuf;

use tokio::sync::oneshot;
use tracing::debug;

use crate::error::Error;

/// Outcome delivered back to the requester of one compression.
pub type CompressionOutcome = Result<PathBuf, Error>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub u64);

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// One queued unit of work; the reply goes to the requester that submitted it.
#[derive(Debug)]
pub struct CompressionRequest {
    pub id: RequestId,
    pub source_path: PathBuf,
    reply: oneshot::Sender<CompressionOutcome>,
}

impl CompressionRequest {
    pub fn new(id: RequestId, source_path: PathBuf) -> (Self, oneshot::Receiver<CompressionOutcome>) {
        let (reply, rx) = oneshot::channel();
        (
            Self {
                id,
                source_path,
                reply,
            },
            rx,
        )
    }

    /// Hand the outcome to the waiting requester, if it is still listening.
    pub fn complete(self, outcome: CompressionOutcome) {
        if self.reply.send(outcome).is_err() {
            debug!(request = %self.id, "requester went away before completion");
        }
    }
}

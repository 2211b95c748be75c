//! FIFO of pending compression requests shared between requesters and the
//! tick pipeline.
//!
//! Requesters only append. The pipeline peeks the head, processes it, then
//! removes that same head; nothing but the head is ever consumed.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tracing::debug;

use crate::error::Error;
use crate::events::{CompressionRequest, RequestId};

#[derive(Debug, Default)]
struct QueueState {
    pending: VecDeque<CompressionRequest>,
    closed: bool,
}

#[derive(Debug, Clone, Default)]
pub struct RequestQueue {
    state: Arc<Mutex<QueueState>>,
}

impl RequestQueue {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, QueueState> {
        // the critical sections cannot leave the deque half-updated
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a request. Safe from any thread.
    ///
    /// # Errors
    /// Returns [`Error::ServiceStopped`] once the queue has been closed; the
    /// request is dropped, which resolves its reply as cancelled.
    pub fn enqueue(&self, request: CompressionRequest) -> Result<(), Error> {
        let mut state = self.lock();
        if state.closed {
            return Err(Error::ServiceStopped);
        }
        debug!(request = %request.id, path = %request.source_path.display(), "enqueue");
        state.pending.push_back(request);
        Ok(())
    }

    /// The head request's id and source path, without removing it.
    pub fn peek_head(&self) -> Option<(RequestId, PathBuf)> {
        self.lock()
            .pending
            .front()
            .map(|r| (r.id, r.source_path.clone()))
    }

    /// Remove the head. Callers must have peeked and processed this entry.
    pub fn dequeue_head(&self) -> Option<CompressionRequest> {
        self.lock().pending.pop_front()
    }

    pub fn len(&self) -> usize {
        self.lock().pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().pending.is_empty()
    }

    /// Refuse further requests and hand back everything still pending.
    pub fn close(&self) -> Vec<CompressionRequest> {
        let mut state = self.lock();
        state.closed = true;
        state.pending.drain(..).collect()
    }
}

//! Import progress counters and the observer they are pushed to.

use std::sync::{Arc, Mutex, PoisonError};

use tracing::info;

/// Snapshot pushed to observers whenever a counter changes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ImportProgress {
    pub texture_total: u64,
    pub texture_loaded: u64,
}

pub trait ProgressObserver: Send + Sync {
    fn report(&self, progress: ImportProgress);
}

impl<F> ProgressObserver for F
where
    F: Fn(ImportProgress) + Send + Sync,
{
    fn report(&self, progress: ImportProgress) {
        self(progress)
    }
}

/// Observer that logs each update through `tracing`.
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingObserver;

impl ProgressObserver for TracingObserver {
    fn report(&self, progress: ImportProgress) {
        info!(
            total = progress.texture_total,
            loaded = progress.texture_loaded,
            "texture compression progress"
        );
    }
}

/// Counters for one import session.
///
/// `ordering` serializes update-then-report so observers see snapshots in the
/// order they were produced. The counters themselves are unlocked before the
/// observer runs, so an observer may read progress back.
pub struct ProgressReporter {
    counters: Mutex<ImportProgress>,
    ordering: Mutex<()>,
    observer: Arc<dyn ProgressObserver>,
}

impl ProgressReporter {
    pub fn new(observer: Arc<dyn ProgressObserver>) -> Self {
        Self {
            counters: Mutex::new(ImportProgress::default()),
            ordering: Mutex::new(()),
            observer,
        }
    }

    pub fn record_requested(&self) {
        self.update(|p| p.texture_total += 1);
    }

    pub fn record_completed(&self) {
        self.update(|p| p.texture_loaded += 1);
    }

    pub fn snapshot(&self) -> ImportProgress {
        *self.counters.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn update(&self, apply: impl FnOnce(&mut ImportProgress)) {
        let _ordering = self.ordering.lock().unwrap_or_else(PoisonError::into_inner);
        let snapshot = {
            let mut counters = self.counters.lock().unwrap_or_else(PoisonError::into_inner);
            apply(&mut counters);
            *counters
        };
        self.observer.report(snapshot);
    }
}

impl std::fmt::Debug for ProgressReporter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgressReporter")
            .field("counters", &self.snapshot())
            .finish_non_exhaustive()
    }
}

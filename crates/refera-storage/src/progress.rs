//! Upload progress reporting.
//!
//! Progress is a one-directional notification: backends push integer percent
//! values in [0, 100] into a [`ProgressSink`] as bytes move. No bidirectional
//! negotiation exists; callers that do not care pass [`NoopProgress`].

use std::sync::atomic::{AtomicU8, Ordering};

/// Observer for upload progress, as integer percent in [0, 100].
pub trait ProgressSink: Send + Sync {
    fn report(&self, percent: u8);
}

/// Sink that ignores all progress reports.
pub struct NoopProgress;

impl ProgressSink for NoopProgress {
    fn report(&self, _percent: u8) {}
}

/// Sink backed by an atomic, readable while an upload is in flight.
#[derive(Debug, Default)]
pub struct SharedProgress(AtomicU8);

impl SharedProgress {
    pub fn new() -> Self {
        Self::default()
    }

    /// Last reported percent.
    pub fn percent(&self) -> u8 {
        self.0.load(Ordering::Relaxed)
    }
}

impl ProgressSink for SharedProgress {
    fn report(&self, percent: u8) {
        self.0.store(percent.min(100), Ordering::Relaxed);
    }
}

/// Percent of `done` over `total`, rounded to the nearest integer.
///
/// An empty transfer is complete by definition, so `total == 0` yields 100.
pub fn percent_of(done: usize, total: usize) -> u8 {
    if total == 0 {
        return 100;
    }
    let done = done.min(total) as u64;
    let total = total as u64;
    ((done * 100 + total / 2) / total) as u8
}

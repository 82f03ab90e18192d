//! Shared crawl state
//!
//! One context object holds every process-wide counter and flag; it is
//! passed by `Arc` to each worker and to the controller's monitor. Access is
//! a single atomic operation per field, so no task ever observes a torn
//! update and the pool never serializes on a mutex.

use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;

/// Process-wide crawl counters and control flags.
#[derive(Debug, Default)]
pub struct CrawlState {
    pages_stored: AtomicUsize,
    in_flight: AtomicUsize,
    stop_requested: AtomicBool,
    shutdown_started: AtomicBool,
}

impl CrawlState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of pages handed to the storage sink so far.
    pub fn pages_stored(&self) -> usize {
        self.pages_stored.load(Ordering::Acquire)
    }

    /// Increments the stored-page counter and returns the new value.
    pub fn record_stored(&self) -> usize {
        self.pages_stored.fetch_add(1, Ordering::AcqRel) + 1
    }

    /// Number of URLs currently being processed by a worker.
    pub fn in_flight(&self) -> usize {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Marks a URL as in-flight; the returned guard decrements on every
    /// exit path, including panic unwind.
    pub fn enter_flight(self: &Arc<Self>) -> InFlightGuard {
        self.in_flight.fetch_add(1, Ordering::AcqRel);
        InFlightGuard {
            state: Arc::clone(self),
        }
    }

    /// Requests a cooperative global stop.
    pub fn request_stop(&self) {
        self.stop_requested.store(true, Ordering::Release);
    }

    pub fn stop_requested(&self) -> bool {
        self.stop_requested.load(Ordering::Acquire)
    }

    /// Claims the right to run the shutdown sequence.
    ///
    /// Returns `true` exactly once across all concurrent callers; the
    /// teardown runs only for the winner.
    pub fn begin_shutdown(&self) -> bool {
        !self.shutdown_started.swap(true, Ordering::AcqRel)
    }
}

/// RAII marker for a worker's in-flight URL.
#[derive(Debug)]
pub struct InFlightGuard {
    state: Arc<CrawlState>,
}

impl Drop for InFlightGuard {
    fn drop(&mut self) {
        self.state.in_flight.fetch_sub(1, Ordering::AcqRel);
    }
}

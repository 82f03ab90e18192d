//! Crawl frontier: the shared queue of URLs awaiting a fetch attempt.
//!
//! The frontier is an unbounded FIFO shared by all workers. Workers both
//! consume from it and produce into it (via link discovery); the controller
//! seeds it. Duplicates are prevented upstream by [`VisitedSet`], not by the
//! queue itself.

mod visited;

pub use visited::VisitedSet;

use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

/// Unbounded FIFO queue of normalized URL strings.
///
/// `push` never blocks. `pop_timeout` waits a bounded time for a URL so that
/// consumers can re-check their stop signal between attempts.
#[derive(Debug, Default)]
pub struct Frontier {
    queue: Mutex<VecDeque<String>>,
    notify: Notify,
}

impl Frontier {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a URL to the back of the queue and wakes one waiting consumer.
    pub fn push(&self, url: String) {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .push_back(url);
        self.notify.notify_one();
    }

    /// Removes the URL at the front of the queue, waiting up to `wait`.
    ///
    /// Returns `None` if the queue stayed empty for the whole wait. A `None`
    /// is not a termination signal; callers loop and re-check their stop
    /// flag.
    pub async fn pop_timeout(&self, wait: Duration) -> Option<String> {
        let deadline = Instant::now() + wait;
        loop {
            // Create the wakeup future before checking the queue; a push
            // between the check and the await leaves a stored permit that
            // completes the first poll immediately.
            let notified = self.notify.notified();
            if let Some(url) = self.try_pop() {
                return Some(url);
            }
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                return self.try_pop();
            }
            if tokio::time::timeout(remaining, notified).await.is_err() {
                return self.try_pop();
            }
        }
    }

    fn try_pop(&self) -> Option<String> {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .pop_front()
    }

    /// Returns the number of queued URLs.
    pub fn len(&self) -> usize {
        self.queue
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .len()
    }

    /// Returns whether the queue is empty.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

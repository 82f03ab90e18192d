//! Per-host rate limiting
//!
//! A monotonic admission scheme: each host has a "next allowed instant"
//! slot. A caller reserves its slot with one atomic read-modify-write and
//! then sleeps (blocking only its own task) until the instant it captured.
//! Under concurrency the slots serialize without a lock, so two requests to
//! the same host are never scheduled closer together than the delay.

use dashmap::DashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;
use tokio::time::Instant;

use crate::url::extract_host;

/// Per-host minimum-interval scheduler.
pub struct RateLimiter {
    next_allowed_ms: DashMap<String, AtomicU64>,
    default_delay: Duration,
    epoch: Instant,
}

impl RateLimiter {
    pub fn new(default_delay: Duration) -> Self {
        Self {
            next_allowed_ms: DashMap::new(),
            default_delay,
            epoch: Instant::now(),
        }
    }

    /// Waits until this caller's reserved slot for the URL's host.
    ///
    /// The slot update is `next = max(next, now) + delay`; the caller sleeps
    /// until the previous value, i.e. the start of its own slot. URLs with
    /// no recognizable host bypass limiting.
    pub async fn acquire(&self, url: &str, delay: Duration) {
        let Some(host) = extract_host(url) else {
            return;
        };
        let now = self.now_ms();
        let delay_ms = delay.as_millis() as u64;
        let previous = {
            let slot = self.next_allowed_ms.entry(host).or_default();
            slot.fetch_update(Ordering::AcqRel, Ordering::Acquire, |next| {
                Some(next.max(now).saturating_add(delay_ms))
            })
            .unwrap_or_else(|value| value)
        };
        let wait = previous.saturating_sub(now);
        if wait > 0 {
            tokio::time::sleep(Duration::from_millis(wait)).await;
        }
    }

    /// `acquire` with the configured default politeness delay.
    pub async fn acquire_default(&self, url: &str) {
        self.acquire(url, self.default_delay).await;
    }

    fn now_ms(&self) -> u64 {
        self.epoch.elapsed().as_millis() as u64
    }
}

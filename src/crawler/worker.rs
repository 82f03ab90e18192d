//! Crawl worker
//!
//! One worker is one loop: pull a URL from the frontier, clear it with the
//! robots service, wait out the host's rate-limit slot, fetch, store, and
//! feed discovered links back through the dedup guard. Workers never talk
//! to each other; everything shared goes through the frontier, the visited
//! set, the storage queue, and the atomic crawl state.

use crate::crawler::fetcher::Fetcher;
use crate::crawler::limiter::RateLimiter;
use crate::crawler::parser::parse_links;
use crate::frontier::{Frontier, VisitedSet};
use crate::robots::RobotsService;
use crate::state::CrawlState;
use crate::storage::StorageHandle;
use crate::url::{normalize, ScopePolicy};
use crate::CrawlError;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// A single member of the crawl pool.
pub struct Worker {
    pub(crate) id: usize,
    pub(crate) frontier: Arc<Frontier>,
    pub(crate) visited: Arc<VisitedSet>,
    pub(crate) scope: Arc<ScopePolicy>,
    pub(crate) limiter: Arc<RateLimiter>,
    pub(crate) robots: Arc<RobotsService>,
    pub(crate) fetcher: Arc<Fetcher>,
    pub(crate) storage: StorageHandle,
    pub(crate) state: Arc<CrawlState>,
    pub(crate) max_pages: usize,
    pub(crate) fetch_attempts: u32,
    pub(crate) frontier_poll: Duration,
}

impl Worker {
    /// Runs the crawl loop until a stop is requested or the task is
    /// cancelled.
    ///
    /// An `Err` escaping this function is a worker crash; the controller
    /// logs it and spawns a replacement. Per-URL trouble (robots denial,
    /// fetch failure, non-HTML content) only abandons that URL.
    pub async fn run(self) -> Result<(), CrawlError> {
        while !self.state.stop_requested() {
            if self.state.pages_stored() >= self.max_pages {
                self.state.request_stop();
                break;
            }

            let Some(url) = self.frontier.pop_timeout(self.frontier_poll).await else {
                // Bounded wait expired; loop to re-check the stop flag.
                continue;
            };

            // A stop may have arrived while we were blocked on the queue;
            // don't commit to a fetch we no longer want.
            if self.state.stop_requested() {
                break;
            }

            let _in_flight = self.state.enter_flight();
            self.process_url(&url).await?;

            if self.state.pages_stored() >= self.max_pages {
                self.state.request_stop();
                break;
            }
        }
        tracing::debug!("worker {} exiting", self.id);
        Ok(())
    }

    /// Handles a single claimed URL end to end.
    async fn process_url(&self, url: &str) -> Result<(), CrawlError> {
        let check = self.robots.check(url).await;
        if !check.allowed {
            tracing::info!("worker {} skipping {} (disallowed by robots.txt)", self.id, url);
            return Ok(());
        }

        match check.crawl_delay {
            Some(delay) => self.limiter.acquire(url, delay).await,
            None => self.limiter.acquire_default(url).await,
        }

        if self.state.stop_requested() {
            return Ok(());
        }

        tracing::info!("worker {} fetching {}", self.id, url);
        let Some(result) = self.fetcher.fetch_with_retries(url, self.fetch_attempts).await else {
            tracing::warn!("worker {} giving up on {}", self.id, url);
            return Ok(());
        };
        if !result.is_success() {
            tracing::warn!("worker {} got HTTP {} for {}", self.id, result.status, url);
            return Ok(());
        }
        if !result.is_html() {
            tracing::debug!("worker {} skipping non-HTML content at {}", self.id, url);
            return Ok(());
        }

        // A failed send means the writer is gone; that is a crash, not a
        // page to drop silently.
        self.storage.store(url, &result.body)?;
        if self.state.record_stored() >= self.max_pages {
            self.state.request_stop();
            return Ok(());
        }

        self.enqueue_discovered(url, &result.body);
        Ok(())
    }

    /// Normalizes, scope-checks, and claims every link on a fetched page.
    fn enqueue_discovered(&self, url: &str, body: &str) {
        let Ok(base) = Url::parse(url) else {
            return;
        };
        for link in parse_links(body, &base) {
            if self.state.stop_requested() {
                break;
            }
            let Some(normalized) = normalize(&link) else {
                continue;
            };
            if self.scope.is_in_scope(&normalized) {
                self.visited.claim_and_enqueue(&normalized, &self.frontier);
            }
        }
    }
}

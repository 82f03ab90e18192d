//! Crawl controller
//!
//! Owns the frontier, the shared services, and the worker pool. A periodic
//! monitor loop watches the counters for the stop conditions (manual stop,
//! page cap, sustained idleness) and supervises the workers: a crashed
//! worker is logged and replaced so the pool keeps its target concurrency,
//! while normal and cancelled exits pass without comment.

use crate::config::Config;
use crate::crawler::fetcher::{build_http_client, Fetcher};
use crate::crawler::limiter::RateLimiter;
use crate::crawler::worker::Worker;
use crate::frontier::{Frontier, VisitedSet};
use crate::robots::RobotsService;
use crate::state::CrawlState;
use crate::storage::StorageSink;
use crate::url::{normalize, ScopePolicy};
use crate::CrawlError;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::{JoinError, JoinHandle};

const WORKER_STOP_TIMEOUT: Duration = Duration::from_secs(5);

/// How a worker task ended, as observed through its join handle.
#[derive(Debug)]
enum WorkerExit {
    Completed,
    Cancelled,
    Crashed(String),
}

/// Final counters reported after shutdown.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrawlSummary {
    pub pages_stored: usize,
    pub urls_seen: usize,
}

/// Crawl orchestrator: seeds the frontier, runs the pool, decides when the
/// crawl is over.
pub struct Controller {
    config: Arc<Config>,
    state: Arc<CrawlState>,
    frontier: Arc<Frontier>,
    visited: Arc<VisitedSet>,
    scope: Arc<ScopePolicy>,
    limiter: Arc<RateLimiter>,
    robots: Arc<RobotsService>,
    fetcher: Arc<Fetcher>,
    storage: StorageSink,
    workers: Vec<JoinHandle<Result<(), CrawlError>>>,
    spawned: usize,
}

impl Controller {
    /// Builds every shared service from the configuration.
    ///
    /// Failing to open the output file or build an HTTP client is fatal;
    /// everything after this point degrades per-URL instead.
    pub fn new(config: Config) -> Result<Self, CrawlError> {
        let scope = Arc::new(ScopePolicy::from_seeds(&config.crawler.seeds));
        let storage = StorageSink::start(Path::new(&config.output.path))?;
        let client = build_http_client(&config.user_agent.header_value())?;
        let fetcher = Arc::new(Fetcher::new(client));
        let robots = Arc::new(RobotsService::new(&config.user_agent.crawler_name)?);
        let limiter = Arc::new(RateLimiter::new(config.crawler.default_delay()));

        Ok(Self {
            config: Arc::new(config),
            state: Arc::new(CrawlState::new()),
            frontier: Arc::new(Frontier::new()),
            visited: Arc::new(VisitedSet::new()),
            scope,
            limiter,
            robots,
            fetcher,
            storage,
            workers: Vec::new(),
            spawned: 0,
        })
    }

    /// Shared state handle, for wiring external stop requests (Ctrl-C).
    pub fn state(&self) -> Arc<CrawlState> {
        Arc::clone(&self.state)
    }

    /// Runs the crawl to completion and returns the final counters.
    pub async fn run(mut self) -> CrawlSummary {
        self.seed_frontier();

        for _ in 0..self.config.crawler.workers {
            self.spawn_worker();
        }
        tracing::info!(
            "crawl started: {} workers, max {} pages, scope {:?}",
            self.config.crawler.workers,
            self.config.crawler.max_pages,
            self.scope.allowed_hosts()
        );

        self.monitor().await;
        self.shutdown().await
    }

    /// Normalizes the seeds and claims them through the visited set.
    ///
    /// Seeds that fail normalization are dropped; if none survive, the
    /// idle-shutdown condition ends the crawl shortly after start.
    fn seed_frontier(&self) {
        for seed in &self.config.crawler.seeds {
            match normalize(seed) {
                Some(normalized) => {
                    self.visited.claim_and_enqueue(&normalized, &self.frontier);
                }
                None => tracing::warn!("ignoring malformed seed URL: {}", seed),
            }
        }
    }

    fn spawn_worker(&mut self) {
        self.spawned += 1;
        let worker = Worker {
            id: self.spawned,
            frontier: Arc::clone(&self.frontier),
            visited: Arc::clone(&self.visited),
            scope: Arc::clone(&self.scope),
            limiter: Arc::clone(&self.limiter),
            robots: Arc::clone(&self.robots),
            fetcher: Arc::clone(&self.fetcher),
            storage: self.storage.handle(),
            state: Arc::clone(&self.state),
            max_pages: self.config.crawler.max_pages,
            fetch_attempts: self.config.crawler.fetch_attempts,
            frontier_poll: self.config.crawler.frontier_poll(),
        };
        self.workers.push(tokio::spawn(worker.run()));
    }

    /// The periodic supervision loop; returns when a stop condition holds.
    async fn monitor(&mut self) {
        let mut ticker = tokio::time::interval(self.config.crawler.monitor_interval());
        let mut idle_ticks = 0u32;

        loop {
            ticker.tick().await;

            tracing::debug!(
                "monitor: stop={} stored={} queued={} in_flight={} workers={}",
                self.state.stop_requested(),
                self.state.pages_stored(),
                self.frontier.len(),
                self.state.in_flight(),
                self.workers.len()
            );

            if self.state.stop_requested() {
                return;
            }

            if self.state.pages_stored() >= self.config.crawler.max_pages {
                tracing::info!(
                    "reached max pages ({}), stopping",
                    self.config.crawler.max_pages
                );
                return;
            }

            if self.frontier.is_empty() && self.state.in_flight() == 0 {
                idle_ticks += 1;
                if idle_ticks >= self.config.crawler.idle_shutdown_ticks {
                    tracing::info!("frontier empty and no in-flight work, stopping");
                    return;
                }
            } else {
                idle_ticks = 0;
            }

            self.reap_workers().await;
        }
    }

    /// Collects finished worker handles and replaces crashed workers.
    async fn reap_workers(&mut self) {
        let mut index = 0;
        while index < self.workers.len() {
            if !self.workers[index].is_finished() {
                index += 1;
                continue;
            }
            let handle = self.workers.swap_remove(index);
            match worker_exit(handle.await) {
                WorkerExit::Completed | WorkerExit::Cancelled => {}
                WorkerExit::Crashed(cause) => {
                    tracing::error!("worker crashed: {}", cause);
                    if !self.state.stop_requested() {
                        tracing::warn!("spawning a replacement worker");
                        self.spawn_worker();
                    }
                }
            }
        }
    }

    /// Tears the crawl down exactly once and reports the final counters.
    async fn shutdown(mut self) -> CrawlSummary {
        if self.state.begin_shutdown() {
            self.state.request_stop();
            tracing::info!("shutting down crawler");

            for handle in &self.workers {
                handle.abort();
            }
            for handle in self.workers.drain(..) {
                match tokio::time::timeout(WORKER_STOP_TIMEOUT, handle).await {
                    Ok(join) => {
                        if let WorkerExit::Crashed(cause) = worker_exit(join) {
                            tracing::error!("worker crashed during shutdown: {}", cause);
                        }
                    }
                    Err(_) => {
                        tracing::warn!("worker did not stop within {:?}", WORKER_STOP_TIMEOUT)
                    }
                }
            }

            // All worker-held queue handles are gone; close ours and let
            // the writer drain.
            self.storage.stop().await;
        }

        let summary = CrawlSummary {
            pages_stored: self.state.pages_stored(),
            urls_seen: self.visited.seen_count(),
        };
        tracing::info!(
            "crawl stopped: {} pages stored, {} URLs seen",
            summary.pages_stored,
            summary.urls_seen
        );
        summary
    }
}

fn worker_exit(join: Result<Result<(), CrawlError>, JoinError>) -> WorkerExit {
    match join {
        Ok(Ok(())) => WorkerExit::Completed,
        Ok(Err(err)) => WorkerExit::Crashed(err.to_string()),
        Err(join_err) if join_err.is_cancelled() => WorkerExit::Cancelled,
        Err(join_err) => WorkerExit::Crashed(format!("panic: {}", join_err)),
    }
}

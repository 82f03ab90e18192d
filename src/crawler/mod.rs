//! Crawler module: orchestration, fetching, rate limiting, link extraction
//!
//! The controller owns a pool of worker tasks that share a frontier; the
//! fetcher and rate limiter sit between the workers and the network.

mod controller;
mod fetcher;
mod limiter;
mod parser;
mod worker;

pub use controller::{Controller, CrawlSummary};
pub use fetcher::{build_http_client, FetchResult, Fetcher};
pub use limiter::RateLimiter;
pub use parser::parse_links;
pub use worker::Worker;

use crate::config::Config;
use crate::CrawlError;

/// Runs a complete crawl with the given configuration.
///
/// Convenience wrapper: builds a [`Controller`], runs it to completion, and
/// returns the final counters.
pub async fn crawl(config: Config) -> Result<CrawlSummary, CrawlError> {
    let controller = Controller::new(config)?;
    Ok(controller.run().await)
}

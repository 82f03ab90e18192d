//! HTTP fetcher
//!
//! Performs the page GETs with bounded retries. Only 429, 5xx and transient
//! transport failures are retried; every other response is returned to the
//! worker as-is for it to judge. Backoff doubles from 250ms up to 2s with a
//! little jitter, and a numeric `Retry-After` header takes precedence,
//! capped at 10s.

use rand::Rng;
use reqwest::header::{ACCEPT, CONTENT_TYPE, RETRY_AFTER};
use reqwest::{redirect::Policy, Client};
use std::time::Duration;

const ACCEPT_HTML: &str = "text/html,application/xhtml+xml,application/xml;q=0.9,*/*;q=0.8";
const BACKOFF_BASE: Duration = Duration::from_millis(250);
const BACKOFF_CAP: Duration = Duration::from_millis(2000);
const JITTER_MAX_MS: u64 = 120;
const RETRY_AFTER_CAP: Duration = Duration::from_secs(10);

/// Result of a single completed HTTP exchange.
///
/// Transient by design: consumed immediately by the worker, never stored.
#[derive(Debug, Clone)]
pub struct FetchResult {
    pub status: u16,
    pub body: String,
    pub content_type: Option<String>,
    pub retry_after: Option<Duration>,
}

impl FetchResult {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn is_html(&self) -> bool {
        self.content_type
            .as_deref()
            .map(|ct| ct.to_ascii_lowercase().contains("text/html"))
            .unwrap_or(false)
    }

    fn is_retryable_status(&self) -> bool {
        self.status == 429 || (500..600).contains(&self.status)
    }
}

/// Builds the shared HTTP client for page fetches.
///
/// Identifying user agent, bounded connect/total timeouts, standard
/// redirect following, compressed transfer.
pub fn build_http_client(user_agent: &str) -> Result<Client, reqwest::Error> {
    Client::builder()
        .user_agent(user_agent.to_string())
        .timeout(Duration::from_secs(8))
        .connect_timeout(Duration::from_secs(5))
        .redirect(Policy::limited(10))
        .gzip(true)
        .brotli(true)
        .build()
}

/// Page fetcher with retry/backoff.
pub struct Fetcher {
    client: Client,
}

impl Fetcher {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    /// Fetches `url`, retrying transient failures up to `max_attempts`
    /// total attempts.
    ///
    /// Returns the first 2xx result, or the first response that is neither
    /// retryable nor successful (the caller decides what to do with a 404).
    /// Returns `None` when every attempt failed. Task cancellation drops
    /// the future at its next await point, so an aborted fetch never keeps
    /// sleeping.
    pub async fn fetch_with_retries(&self, url: &str, max_attempts: u32) -> Option<FetchResult> {
        let mut backoff = BACKOFF_BASE;
        for attempt in 1..=max_attempts {
            match self.fetch_once(url).await {
                Ok(result) => {
                    if result.is_success() {
                        return Some(result);
                    }
                    if !result.is_retryable_status() {
                        return Some(result);
                    }
                    tracing::debug!(
                        "attempt {}/{} for {} got HTTP {}",
                        attempt,
                        max_attempts,
                        url,
                        result.status
                    );
                    if attempt == max_attempts {
                        break;
                    }
                    tokio::time::sleep(retry_wait(&result, backoff)).await;
                }
                Err(err) => {
                    if !is_transient(&err) {
                        tracing::debug!("giving up on {}: {}", url, err);
                        return None;
                    }
                    tracing::debug!("attempt {}/{} for {} failed: {}", attempt, max_attempts, url, err);
                    if attempt == max_attempts {
                        break;
                    }
                    tokio::time::sleep(backoff + jitter()).await;
                }
            }
            backoff = (backoff * 2).min(BACKOFF_CAP);
        }
        None
    }

    async fn fetch_once(&self, url: &str) -> Result<FetchResult, reqwest::Error> {
        let response = self
            .client
            .get(url)
            .header(ACCEPT, ACCEPT_HTML)
            .send()
            .await?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let retry_after = response
            .headers()
            .get(RETRY_AFTER)
            .and_then(|value| value.to_str().ok())
            .and_then(|value| value.trim().parse::<u64>().ok())
            .map(Duration::from_secs);
        let body = response.text().await?;

        Ok(FetchResult {
            status,
            body,
            content_type,
            retry_after,
        })
    }
}

/// Wait before retrying a 429/5xx: honor Retry-After when present (capped),
/// otherwise jittered backoff.
fn retry_wait(result: &FetchResult, backoff: Duration) -> Duration {
    match result.retry_after {
        Some(retry_after) if retry_after > Duration::ZERO => retry_after.min(RETRY_AFTER_CAP),
        _ => backoff + jitter(),
    }
}

fn jitter() -> Duration {
    Duration::from_millis(rand::thread_rng().gen_range(0..JITTER_MAX_MS))
}

fn is_transient(err: &reqwest::Error) -> bool {
    // Malformed requests will not improve with retries; timeouts, refused
    // connections and mid-body failures might.
    !err.is_builder()
}

use serde::Deserialize;
use std::time::Duration;

/// Main configuration structure for Kumo
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub crawler: CrawlerConfig,
    #[serde(rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    pub output: OutputConfig,
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Seed URLs; their hosts define the crawl scope
    pub seeds: Vec<String>,

    /// Stop once this many pages have been stored
    #[serde(rename = "max-pages")]
    pub max_pages: usize,

    /// Number of concurrent worker tasks
    pub workers: usize,

    /// Politeness delay between requests to one host when robots.txt
    /// specifies no crawl-delay (milliseconds)
    #[serde(rename = "default-delay-ms", default = "default_delay_ms")]
    pub default_delay_ms: u64,

    /// Total attempts per URL before giving up
    #[serde(rename = "fetch-attempts", default = "default_fetch_attempts")]
    pub fetch_attempts: u32,

    /// How long a worker waits on an empty frontier before re-checking the
    /// stop flag (milliseconds)
    #[serde(rename = "frontier-poll-ms", default = "default_frontier_poll_ms")]
    pub frontier_poll_ms: u64,

    /// Monitor tick interval (milliseconds)
    #[serde(rename = "monitor-interval-ms", default = "default_monitor_interval_ms")]
    pub monitor_interval_ms: u64,

    /// Consecutive idle monitor ticks (empty frontier, nothing in flight)
    /// before the crawl is considered complete
    #[serde(rename = "idle-shutdown-ticks", default = "default_idle_shutdown_ticks")]
    pub idle_shutdown_ticks: u32,
}

impl CrawlerConfig {
    pub fn default_delay(&self) -> Duration {
        Duration::from_millis(self.default_delay_ms)
    }

    pub fn frontier_poll(&self) -> Duration {
        Duration::from_millis(self.frontier_poll_ms)
    }

    pub fn monitor_interval(&self) -> Duration {
        Duration::from_millis(self.monitor_interval_ms)
    }
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler; also the token matched against robots.txt
    /// `User-agent:` groups
    #[serde(rename = "crawler-name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version")]
    pub crawler_version: String,
}

impl UserAgentConfig {
    /// The User-Agent header value sent with page fetches.
    pub fn header_value(&self) -> String {
        format!("{}/{}", self.crawler_name, self.crawler_version)
    }
}

/// Output configuration
#[derive(Debug, Clone, Deserialize)]
pub struct OutputConfig {
    /// Path of the append-only page store
    pub path: String,
}

fn default_delay_ms() -> u64 {
    1000
}

fn default_fetch_attempts() -> u32 {
    3
}

fn default_frontier_poll_ms() -> u64 {
    500
}

fn default_monitor_interval_ms() -> u64 {
    500
}

fn default_idle_shutdown_ticks() -> u32 {
    6
}

//! Robots.txt handling module
//!
//! Fetches, caches, and evaluates robots.txt per host. Policy failures never
//! block the crawl: when robots.txt cannot be retrieved the service fails
//! open and reports the URL as allowed with no extra delay.

mod cache;
mod parser;

pub use cache::{CachedRules, DEFAULT_TTL_SECONDS};
pub use parser::{parse_robots, RuleGroup};

use crate::url::extract_authority;
use crate::CrawlError;
use dashmap::DashMap;
use std::sync::Arc;
use std::time::Duration;
use url::Url;

/// Outcome of a robots.txt consultation for one URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RobotsCheck {
    pub allowed: bool,
    /// Crawl-delay directive for this crawler's group, if any.
    pub crawl_delay: Option<Duration>,
}

impl RobotsCheck {
    fn allow_all() -> Self {
        Self {
            allowed: true,
            crawl_delay: None,
        }
    }
}

/// Per-host robots.txt fetcher and cache.
pub struct RobotsService {
    client: reqwest::Client,
    cache: DashMap<String, Arc<CachedRules>>,
    agent_token: String,
    ttl: chrono::Duration,
}

impl RobotsService {
    /// Creates a service identifying itself with `agent_token`, which is
    /// also the token matched against `User-agent:` groups.
    pub fn new(agent_token: &str) -> Result<Self, CrawlError> {
        let client = reqwest::Client::builder()
            .user_agent(agent_token.to_string())
            .timeout(Duration::from_secs(5))
            .connect_timeout(Duration::from_secs(5))
            .build()?;
        Ok(Self {
            client,
            cache: DashMap::new(),
            agent_token: agent_token.to_string(),
            ttl: chrono::Duration::seconds(DEFAULT_TTL_SECONDS),
        })
    }

    /// Checks whether `url` may be fetched, refreshing the host's cached
    /// rules if they are missing or expired.
    ///
    /// URLs without a recognizable authority, and hosts whose robots.txt
    /// cannot be fetched, are allowed (fail-open). Fetch failures are not
    /// cached, so the next check retries.
    pub async fn check(&self, url: &str) -> RobotsCheck {
        let Some(authority) = extract_authority(url) else {
            return RobotsCheck::allow_all();
        };

        let cached = self
            .cache
            .get(&authority)
            .map(|entry| Arc::clone(entry.value()));
        let rules = match cached {
            Some(rules) if !rules.is_expired() => rules,
            _ => match self.fetch_rules(&authority).await {
                Some(rules) => {
                    let rules = Arc::new(rules);
                    // Whole-record replacement; concurrent refreshers may
                    // race, the last insert wins and both are fresh.
                    self.cache.insert(authority, Arc::clone(&rules));
                    rules
                }
                None => return RobotsCheck::allow_all(),
            },
        };

        let path = path_of(url);
        RobotsCheck {
            allowed: rules.rules.is_allowed(&path),
            crawl_delay: rules.rules.crawl_delay_s.map(Duration::from_secs),
        }
    }

    /// Fetches `https://authority/robots.txt`, falling back to plain http.
    async fn fetch_rules(&self, authority: &str) -> Option<CachedRules> {
        for scheme in ["https", "http"] {
            let robots_url = format!("{}://{}/robots.txt", scheme, authority);
            if let Some(rules) = self.try_fetch(&robots_url).await {
                return Some(rules);
            }
        }
        None
    }

    async fn try_fetch(&self, robots_url: &str) -> Option<CachedRules> {
        let response = match self.client.get(robots_url).send().await {
            Ok(response) => response,
            Err(err) => {
                tracing::debug!("robots.txt fetch failed for {}: {}", robots_url, err);
                return None;
            }
        };
        if response.status().as_u16() >= 400 {
            tracing::debug!(
                "robots.txt at {} returned {}",
                robots_url,
                response.status()
            );
            return None;
        }
        let body = response.text().await.ok()?;
        let group = parse_robots(&body, &self.agent_token);
        Some(CachedRules::new(group, self.ttl))
    }

    /// Number of hosts with cached rules.
    pub fn cached_hosts(&self) -> usize {
        self.cache.len()
    }
}

fn path_of(url: &str) -> String {
    match Url::parse(url) {
        Ok(parsed) => parsed.path().to_string(),
        Err(_) => "/".to_string(),
    }
}

//! Robots.txt caching
//!
//! Fetched rules are cached per authority and expire after a fixed TTL.
//! Expired entries are replaced wholesale with a fresh record, never
//! mutated in place.

use crate::robots::parser::RuleGroup;
use chrono::{DateTime, Duration, Utc};

/// Default lifetime of a cached robots.txt record: 6 hours.
pub const DEFAULT_TTL_SECONDS: i64 = 6 * 60 * 60;

/// One host's parsed robots.txt rules plus fetch metadata.
#[derive(Debug, Clone)]
pub struct CachedRules {
    pub rules: RuleGroup,
    pub fetched_at: DateTime<Utc>,
    pub ttl: Duration,
}

impl CachedRules {
    /// Wraps freshly fetched rules with the current timestamp.
    pub fn new(rules: RuleGroup, ttl: Duration) -> Self {
        Self {
            rules,
            fetched_at: Utc::now(),
            ttl,
        }
    }

    /// Whether the record has outlived its TTL.
    pub fn is_expired(&self) -> bool {
        Utc::now() - self.fetched_at > self.ttl
    }
}

use crate::url::{extract_host, normalize};
use std::collections::HashSet;

/// Host whitelist that bounds the crawl.
///
/// Discovered links are restricted to the hosts of the seed URLs and their
/// subdomains. Without this limit the frontier grows without bound and the
/// crawl runtime becomes unpredictable.
#[derive(Debug, Clone)]
pub struct ScopePolicy {
    allowed_hosts: HashSet<String>,
}

impl ScopePolicy {
    /// Creates a scope policy from an explicit set of lowercase hosts.
    pub fn new(allowed_hosts: HashSet<String>) -> Self {
        Self { allowed_hosts }
    }

    /// Derives the allowed hosts from seed URLs.
    ///
    /// Seeds that fail normalization contribute nothing; they are skipped
    /// at enqueue time as well.
    pub fn from_seeds(seeds: &[String]) -> Self {
        let allowed_hosts = seeds
            .iter()
            .filter_map(|seed| normalize(seed))
            .filter_map(|normalized| extract_host(&normalized))
            .collect();
        Self { allowed_hosts }
    }

    /// Checks whether a URL falls inside the crawl boundary.
    ///
    /// A URL is in scope iff its host equals an allowed host or is a
    /// subdomain of one (suffix match on `"." + allowed_host`).
    pub fn is_in_scope(&self, url: &str) -> bool {
        let Some(host) = extract_host(url) else {
            return false;
        };
        self.allowed_hosts
            .iter()
            .any(|allowed| host == *allowed || host.ends_with(&format!(".{}", allowed)))
    }

    /// Returns the allowed hosts.
    pub fn allowed_hosts(&self) -> &HashSet<String> {
        &self.allowed_hosts
    }
}

use crate::frontier::Frontier;
use dashmap::DashSet;

/// Deduplication guard for the frontier.
///
/// Every URL passes through [`VisitedSet::claim_and_enqueue`] before it may
/// enter the frontier. The membership test and the insertion are one atomic
/// add-if-absent, so two workers discovering the same link concurrently can
/// never both enqueue it.
#[derive(Debug, Default)]
pub struct VisitedSet {
    seen: DashSet<String>,
}

impl VisitedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Atomically claims `url` and, if it was not seen before, enqueues it.
    ///
    /// Returns `true` only for the single caller that claimed the URL first.
    pub fn claim_and_enqueue(&self, url: &str, frontier: &Frontier) -> bool {
        if self.seen.insert(url.to_string()) {
            frontier.push(url.to_string());
            true
        } else {
            false
        }
    }

    /// Number of distinct URLs ever claimed.
    pub fn seen_count(&self) -> usize {
        self.seen.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::time::Duration;

    #[tokio::test]
    async fn test_claims_once() {
        let visited = VisitedSet::new();
        let frontier = Frontier::new();

        assert!(visited.claim_and_enqueue("https://example.com/", &frontier));
        assert!(!visited.claim_and_enqueue("https://example.com/", &frontier));
        assert_eq!(frontier.len(), 1);
        assert_eq!(visited.seen_count(), 1);
    }

    #[tokio::test]
    async fn test_distinct_urls_all_enqueued() {
        let visited = VisitedSet::new();
        let frontier = Frontier::new();

        assert!(visited.claim_and_enqueue("https://example.com/a", &frontier));
        assert!(visited.claim_and_enqueue("https://example.com/b", &frontier));
        assert_eq!(frontier.len(), 2);
    }

    #[tokio::test]
    async fn test_concurrent_claims_enqueue_exactly_once() {
        let visited = Arc::new(VisitedSet::new());
        let frontier = Arc::new(Frontier::new());

        let mut handles = Vec::new();
        for _ in 0..32 {
            let visited = visited.clone();
            let frontier = frontier.clone();
            handles.push(tokio::spawn(async move {
                visited.claim_and_enqueue("https://example.com/contended", &frontier)
            }));
        }

        let mut winners = 0;
        for handle in handles {
            if handle.await.unwrap() {
                winners += 1;
            }
        }

        assert_eq!(winners, 1);
        assert_eq!(visited.seen_count(), 1);
        assert_eq!(frontier.len(), 1);
        let queued = frontier.pop_timeout(Duration::from_millis(10)).await;
        assert_eq!(queued.as_deref(), Some("https://example.com/contended"));
        assert!(frontier.is_empty());
    }
}

//! Robots.txt parsing
//!
//! Deliberately simplified semantics: prefix rules only, no wildcards and no
//! `$` anchors. A page is allowed when the longest matching Allow prefix is
//! at least as long as the longest matching Disallow prefix.

use std::collections::HashMap;

/// The directive group that applies to one user agent.
#[derive(Debug, Clone, Default)]
pub struct RuleGroup {
    pub allow: Vec<String>,
    pub disallow: Vec<String>,
    pub crawl_delay_s: Option<u64>,
}

impl RuleGroup {
    /// Decides whether `path` may be fetched under this group.
    ///
    /// Longest matching prefix wins between the allow and disallow lists;
    /// ties favor allow, and a path matched by neither list is allowed
    /// (both lengths -1).
    pub fn is_allowed(&self, path: &str) -> bool {
        best_prefix_len(&self.allow, path) >= best_prefix_len(&self.disallow, path)
    }
}

fn best_prefix_len(rules: &[String], path: &str) -> i64 {
    let mut best = -1;
    for rule in rules {
        if rule.is_empty() {
            continue;
        }
        if path.starts_with(rule.as_str()) {
            best = best.max(rule.len() as i64);
        }
    }
    best
}

/// Parses a robots.txt body and selects the group for `agent_token`.
///
/// Lines are comment-stripped at `#`; blank lines are skipped. Each
/// `User-agent:` line switches the current group (keys are
/// case-insensitive); `Allow`, `Disallow` and `Crawl-delay` accumulate into
/// it. Empty `Disallow` values are dropped since an empty pattern matches
/// nothing. Selection prefers an exact match on the crawler's own token,
/// then `*`, then an empty allow-all group.
pub fn parse_robots(body: &str, agent_token: &str) -> RuleGroup {
    let mut groups: HashMap<String, RuleGroup> = HashMap::new();
    let mut current_agent: Option<String> = None;

    for line in body.lines() {
        let line = strip_comment(line).trim();
        if line.is_empty() {
            continue;
        }
        let Some((key, value)) = line.split_once(':') else {
            continue;
        };
        let key = key.trim().to_lowercase();
        let value = value.trim();

        if key == "user-agent" {
            let agent = value.to_lowercase();
            groups.entry(agent.clone()).or_default();
            current_agent = Some(agent);
            continue;
        }

        let Some(agent) = &current_agent else {
            // Directives before any User-agent line apply to nobody.
            continue;
        };
        let group = groups.entry(agent.clone()).or_default();
        match key.as_str() {
            "allow" => group.allow.push(value.to_string()),
            "disallow" => {
                if !value.is_empty() {
                    group.disallow.push(value.to_string());
                }
            }
            "crawl-delay" => {
                if let Ok(seconds) = value.parse::<u64>() {
                    group.crawl_delay_s = Some(seconds);
                }
            }
            _ => {}
        }
    }

    let token = agent_token.to_lowercase();
    if let Some(group) = groups.remove(&token) {
        return group;
    }
    if let Some(group) = groups.remove("*") {
        return group;
    }
    RuleGroup::default()
}

fn strip_comment(line: &str) -> &str {
    match line.find('#') {
        Some(idx) => &line[..idx],
        None => line,
    }
}

use url::Url;

/// Normalizes a raw URL into the canonical form used for deduplication.
///
/// # Normalization Steps
///
/// 1. Trim surrounding whitespace; reject empty input
/// 2. Reject `mailto:`, `javascript:` and `tel:` links
/// 3. Parse the URL; reject anything that is not http(s) or has no host
/// 4. Lowercase the scheme and host
/// 5. Strip default ports (80 for http, 443 for https)
/// 6. Default an empty path to `/`
/// 7. Keep the query string, drop the fragment
///
/// Returns `None` on any parse failure or rejected scheme; callers must
/// treat `None` as "discard, do not enqueue". The function is idempotent on
/// its own output.
///
/// # Examples
///
/// ```
/// use kumo::url::normalize;
///
/// let url = normalize("HTTP://Example.COM:80/page?q=1#top").unwrap();
/// assert_eq!(url, "http://example.com/page?q=1");
/// assert_eq!(normalize("mailto:someone@example.com"), None);
/// ```
pub fn normalize(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    let lower = raw.to_ascii_lowercase();
    if lower.starts_with("mailto:") || lower.starts_with("javascript:") || lower.starts_with("tel:")
    {
        return None;
    }

    // The url crate lowercases scheme and host, drops default ports on
    // serialization, and defaults an empty path to "/" for http(s).
    let mut url = Url::parse(raw).ok()?;
    if url.scheme() != "http" && url.scheme() != "https" {
        return None;
    }
    url.host_str()?;

    url.set_fragment(None);

    Some(url.into())
}

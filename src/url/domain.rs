use url::Url;

/// Extracts the lowercase host from a URL string.
///
/// Returns `None` if the string does not parse or has no host.
///
/// # Examples
///
/// ```
/// use kumo::url::extract_host;
///
/// assert_eq!(extract_host("https://Sub.Example.COM/p"), Some("sub.example.com".to_string()));
/// assert_eq!(extract_host("not a url"), None);
/// ```
pub fn extract_host(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    parsed.host_str().map(|h| h.to_lowercase())
}

/// Extracts the authority (`host` or `host:port`) from a URL string.
///
/// The port is included only when it differs from the scheme default, which
/// keeps hosts on non-default ports distinct in per-host maps.
pub fn extract_authority(url: &str) -> Option<String> {
    let parsed = Url::parse(url).ok()?;
    let host = parsed.host_str()?.to_lowercase();
    match parsed.port() {
        Some(port) => Some(format!("{}:{}", host, port)),
        None => Some(host),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_simple_host() {
        assert_eq!(
            extract_host("https://example.com/path"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_host_lowercases() {
        assert_eq!(
            extract_host("https://EXAMPLE.COM/"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_host_ignores_port() {
        assert_eq!(
            extract_host("http://example.com:8080/"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_extract_host_invalid() {
        assert_eq!(extract_host("not a url"), None);
        assert_eq!(extract_host(""), None);
    }

    #[test]
    fn test_authority_without_port() {
        assert_eq!(
            extract_authority("https://example.com/path"),
            Some("example.com".to_string())
        );
    }

    #[test]
    fn test_authority_with_port() {
        assert_eq!(
            extract_authority("http://127.0.0.1:4545/robots.txt"),
            Some("127.0.0.1:4545".to_string())
        );
    }

    #[test]
    fn test_authority_default_port_stripped() {
        assert_eq!(
            extract_authority("http://example.com:80/"),
            Some("example.com".to_string())
        );
    }
}

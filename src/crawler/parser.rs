//! HTML link extraction
//!
//! The one HTML-aware function in the crawler. It is pure and synchronous:
//! `scraper::Html` is not `Send`, so the document must never be held across
//! an await point; callers get back plain absolute URL strings.

use scraper::{Html, Selector};
use url::Url;

/// Extracts the absolute targets of all `<a href>` elements in `html`.
///
/// Relative hrefs are resolved against `base_url`. Links that fail to
/// resolve are skipped; scheme filtering happens later during
/// normalization.
pub fn parse_links(html: &str, base_url: &Url) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut links = Vec::new();

    if let Ok(selector) = Selector::parse("a[href]") {
        for element in document.select(&selector) {
            if let Some(href) = element.value().attr("href") {
                if let Ok(absolute) = base_url.join(href) {
                    links.push(absolute.to_string());
                }
            }
        }
    }

    links
}

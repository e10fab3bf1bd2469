//! Article URL discovery on the listing page.
//!
//! Scans every hyperlink on the football section front page and keeps the
//! ones that look like article detail pages: either the explicit
//! `/sport/football/articles/` path, or a football-section URL whose final
//! path segment is a long alphanumeric identifier. Live blogs, fixtures,
//! tables, video, and gossip pages are excluded. Results are de-duplicated
//! with insertion order preserved, and the scan stops early at twice the
//! article cap so a huge listing page stays cheap.

use crate::scrapers::ScrapeError;
use once_cell::sync::Lazy;
use regex::Regex;
use scraper::{Html, Selector};
use tracing::{debug, info, instrument, warn};
use url::Url;

const ARTICLE_PATH: &str = "/sport/football/articles/";
const SECTION_PATH: &str = "/sport/football/";
const EXCLUDED_SEGMENTS: [&str; 5] = [
    "/live/",
    "/scores-fixtures",
    "/tables",
    "/video",
    "/gossip",
];

static LINK_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("a[href]").unwrap());

/// Final path segments that look like BBC article ids.
static ARTICLE_ID: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-z0-9]{8,}$").unwrap());

/// Fetch the listing page and extract candidate article URLs.
///
/// Zero discovered URLs is a recoverable condition, not an error; only a
/// failure to reach the listing page at all is surfaced.
#[instrument(level = "info", skip(http))]
pub async fn discover_article_urls(
    http: &reqwest::Client,
    listing_url: &str,
    article_cap: usize,
) -> Result<Vec<String>, ScrapeError> {
    let html = http
        .get(listing_url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;
    let base = Url::parse(listing_url)?;

    let urls = extract_article_urls(&html, &base, article_cap);
    info!(count = urls.len(), source = listing_url, "Indexed article URLs");
    if urls.is_empty() {
        warn!(source = listing_url, "No article URLs discovered on listing page");
    }
    Ok(urls)
}

/// Extract article-like URLs from listing-page HTML.
///
/// Pure over its inputs: resolves hrefs against `base`, applies the
/// include/exclude patterns, de-duplicates preserving first-seen order, and
/// stops once `2 * article_cap` URLs have been collected.
pub fn extract_article_urls(html: &str, base: &Url, article_cap: usize) -> Vec<String> {
    let document = Html::parse_document(html);
    let mut urls: Vec<String> = Vec::new();

    for element in document.select(&LINK_SELECTOR) {
        let Some(href) = element.value().attr("href") else {
            continue;
        };
        let Ok(resolved) = base.join(href) else {
            debug!(href, "skipping unresolvable href");
            continue;
        };
        let resolved = resolved.to_string();

        if !is_article_url(&resolved) {
            continue;
        }
        if urls.contains(&resolved) {
            continue;
        }

        debug!(url = %resolved, position = urls.len(), "discovered article URL");
        urls.push(resolved);

        // Bound the scan: collecting more than twice the cap buys nothing.
        if urls.len() >= article_cap * 2 {
            break;
        }
    }

    urls
}

/// Whether a resolved URL looks like an article detail page.
pub fn is_article_url(url: &str) -> bool {
    if EXCLUDED_SEGMENTS.iter().any(|segment| url.contains(segment)) {
        return false;
    }
    if url.contains(ARTICLE_PATH) {
        return true;
    }
    url.contains(SECTION_PATH) && ends_in_article_id(url)
}

fn ends_in_article_id(url: &str) -> bool {
    let Ok(parsed) = Url::parse(url) else {
        return false;
    };
    parsed
        .path_segments()
        .and_then(|segments| segments.filter(|s| !s.is_empty()).last())
        .is_some_and(|segment| ARTICLE_ID.is_match(segment))
}

//! Concurrent article fetching from BBC Sport Football.
//!
//! One tokio task per discovered URL; the batch is already capped upstream,
//! so there is no need for an in-flight bound. A failed or empty fetch costs
//! exactly that one article. Results arrive in completion order — ordering
//! is not part of the contract.

use crate::models::Article;
use crate::scrapers::ScrapeError;
use crate::scrapers::extract::{extract_body, extract_image_url, extract_title};
use chrono::Utc;
use scraper::Html;
use tracing::{debug, error, info, instrument, warn};

/// Source label stamped on every article this module produces.
pub const SOURCE_NAME: &str = "BBC Sport Football";

/// Fetch and extract a single article.
///
/// `Ok(None)` means the page was reachable but extraction produced no body
/// text; the caller discards it the same way it discards a failed fetch.
#[instrument(level = "info", skip(http, origin), fields(%url))]
pub async fn fetch_article(
    http: &reqwest::Client,
    url: &str,
    origin: &str,
) -> Result<Option<Article>, ScrapeError> {
    let html = http
        .get(url)
        .send()
        .await?
        .error_for_status()?
        .text()
        .await?;

    let document = Html::parse_document(&html);
    let title = extract_title(&document);
    let body = extract_body(&document);
    let image_url = extract_image_url(&document, origin);

    if body.is_empty() {
        return Ok(None);
    }

    info!(%title, body_len = body.len(), has_image = image_url.is_some(), "Parsed article");
    Ok(Some(Article {
        title,
        url: url.to_string(),
        body,
        source: SOURCE_NAME.to_string(),
        fetched_at: Utc::now(),
        image_url,
    }))
}

/// Fetch all articles concurrently, one task per URL.
///
/// Blocks until every task finishes (join barrier), then returns the
/// successful extractions. Failures are logged and skipped without failing
/// the batch; the returned count is at most the input count.
#[instrument(level = "info", skip_all, fields(urls = urls.len()))]
pub async fn fetch_articles(
    http: &reqwest::Client,
    urls: Vec<String>,
    origin: &str,
) -> Vec<Article> {
    let tasks: Vec<_> = urls
        .into_iter()
        .map(|url| {
            let http = http.clone();
            let origin = origin.to_string();
            tokio::spawn(async move {
                match fetch_article(&http, &url, &origin).await {
                    Ok(Some(article)) => {
                        debug!(%url, "Fetched article");
                        Some(article)
                    }
                    Ok(None) => {
                        warn!(%url, "Fetch produced no content");
                        None
                    }
                    Err(e) => {
                        error!(error = %e, %url, "Article fetch failed");
                        None
                    }
                }
            })
        })
        .collect();

    // Join barrier: wait for every task, then keep the survivors.
    let mut articles = Vec::new();
    for result in futures::future::join_all(tasks).await {
        match result {
            Ok(Some(article)) => articles.push(article),
            Ok(None) => {}
            Err(e) => error!(error = %e, "Article task panicked"),
        }
    }

    info!(count = articles.len(), "Fetched article contents");
    articles
}

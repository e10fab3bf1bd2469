//! News pipeline: discovery composed with the concurrent fetcher.
//!
//! This is the entry point the surrounding application calls to get "the
//! current articles". It never returns an error: partial failures cost
//! individual articles, and even total listing-page unavailability degrades
//! to an empty list with a logged cause so the caller can render a
//! try-again-later state instead of an error page.

use crate::config::AppConfig;
use crate::models::Article;
use crate::scrapers::{bbc, discovery};
use std::time::Instant;
use tracing::{error, info, instrument};

/// Discovers and fetches the current set of articles from the news site.
#[derive(Debug)]
pub struct NewsPipeline {
    http: reqwest::Client,
    listing_url: String,
    origin: String,
    article_cap: usize,
}

impl NewsPipeline {
    pub fn new(config: &AppConfig) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout())
            .user_agent(config.user_agent.clone())
            .build()?;

        Ok(Self {
            http,
            listing_url: config.news_listing_url.clone(),
            origin: config.news_origin.clone(),
            article_cap: config.article_cap,
        })
    }

    /// Run one full pipeline pass: discover URLs, cap them, fetch
    /// concurrently, and return whatever survived extraction.
    ///
    /// May take several seconds; the article fetches run concurrently but
    /// the call blocks until every task has finished.
    #[instrument(level = "info", skip_all)]
    pub async fn fetch_articles(&self) -> Vec<Article> {
        let started = Instant::now();

        let urls = match discovery::discover_article_urls(
            &self.http,
            &self.listing_url,
            self.article_cap,
        )
        .await
        {
            Ok(urls) => urls,
            Err(e) => {
                error!(
                    error = %e,
                    listing = %self.listing_url,
                    "Listing page unreachable; returning no articles"
                );
                return Vec::new();
            }
        };

        let capped: Vec<String> = urls.into_iter().take(self.article_cap).collect();
        let articles = bbc::fetch_articles(&self.http, capped, &self.origin).await;

        info!(
            count = articles.len(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "News pipeline pass complete"
        );
        articles
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_unreachable_listing_yields_empty_list_not_error() {
        let config = AppConfig {
            news_listing_url: "http://127.0.0.1:9/sport/football".to_string(),
            ..AppConfig::default()
        };
        let pipeline = NewsPipeline::new(&config).unwrap();
        let articles = pipeline.fetch_articles().await;
        assert!(articles.is_empty());
    }
}

//! BBC Sport Football scraping: URL discovery and article extraction.
//!
//! The pipeline follows a two-phase pattern:
//!
//! 1. **Discovery** ([`discovery`]): scan the listing page for article-like
//!    URLs, de-duplicated and bounded.
//! 2. **Fetching** ([`bbc`]): one lightweight task per URL downloads the
//!    detail page and runs the extraction heuristics in [`extract`].
//!
//! The extraction strategy is heuristic by design. BBC markup changes;
//! every selector here is a best effort that degrades to a coarser
//! fallback rather than failing, and a page that defeats all of them costs
//! one skipped article, never a pipeline failure.

pub mod bbc;
pub mod discovery;
pub mod extract;

use thiserror::Error;

/// Failures while fetching or resolving pages on the news site.
#[derive(Debug, Error)]
pub enum ScrapeError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
}

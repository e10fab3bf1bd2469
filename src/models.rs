//! Data models for scraped news articles.
//!
//! An [`Article`] is the unit the news pipeline hands to the surrounding
//! application. Articles are immutable once constructed, produced only by
//! the fetcher, and have no persistent identity beyond a single pipeline
//! run; callers that want persistence cache them on their side.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// A news article extracted from a detail page.
///
/// The canonical `url` doubles as the de-duplication key. `body` may be
/// truncated to the extraction character budget when structured extraction
/// fell back to raw container text.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct Article {
    /// Headline from the first level-1 heading, or a placeholder.
    pub title: String,
    /// Canonical article URL; the de-duplication key.
    pub url: String,
    /// Extracted body text, possibly truncated.
    pub body: String,
    /// Name of the source site this article came from.
    pub source: String,
    /// When the article was fetched.
    pub fetched_at: DateTime<Utc>,
    /// Thumbnail URL, when one could be extracted.
    pub image_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Article {
        Article {
            title: "Late winner settles derby".to_string(),
            url: "https://www.bbc.com/sport/football/articles/c9dj2k4x7e1o".to_string(),
            body: "A stoppage-time goal decided the match.".to_string(),
            source: "BBC Sport Football".to_string(),
            fetched_at: Utc::now(),
            image_url: Some("https://ichef.bbci.co.uk/news/image.jpg".to_string()),
        }
    }

    #[test]
    fn test_article_serialization_round_trip() {
        let article = sample();
        let json = serde_json::to_string(&article).unwrap();
        let parsed: Article = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, article);
    }

    #[test]
    fn test_article_without_image() {
        let mut article = sample();
        article.image_url = None;
        let json = serde_json::to_string(&article).unwrap();
        assert!(json.contains("\"image_url\":null"));
    }
}

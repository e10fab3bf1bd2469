//! Content extraction heuristics for article detail pages.
//!
//! Everything here is pure over a parsed document, which keeps the
//! heuristics testable against static HTML. Body extraction tries an
//! ordered cascade of content-block strategies and keeps whichever yields
//! the most paragraphs; the strategies are plain data, so adding one never
//! touches the orchestration. The most-paragraphs rule is tunable policy,
//! not a guaranteed-correct algorithm.

use once_cell::sync::Lazy;
use scraper::{Html, Selector};
use tracing::debug;

/// Title used when a page has no level-1 heading.
pub const TITLE_PLACEHOLDER: &str = "(untitled)";

/// Paragraphs at or under this length are boilerplate, not body text.
const MIN_PARAGRAPH_CHARS: usize = 20;
/// Stop accumulating body text once past this budget.
const BODY_TARGET_CHARS: usize = 500;
/// A paragraph-based body shorter than this triggers the raw fallback.
const MIN_BODY_CHARS: usize = 50;
/// Raw container text must clear this length to be worth keeping.
const MIN_RAW_CHARS: usize = 100;
/// Character budget for the raw-text fallback.
const RAW_BUDGET_CHARS: usize = 1000;

static TITLE_SELECTOR: Lazy<Selector> = Lazy::new(|| Selector::parse("h1").unwrap());
static ALL_PARAGRAPHS: Lazy<Selector> = Lazy::new(|| Selector::parse("p").unwrap());
static CONTENT_ROOT: Lazy<Selector> = Lazy::new(|| Selector::parse("article, main").unwrap());
static OG_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[property=\"og:image\"]").unwrap());
static TWITTER_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("meta[name=\"twitter:image\"]").unwrap());
static CONTENT_IMAGE: Lazy<Selector> =
    Lazy::new(|| Selector::parse("article img, figure img, main img, picture img").unwrap());

/// Ordered body-extraction strategies, most specific first.
static BODY_STRATEGIES: Lazy<Vec<(&'static str, Selector)>> = Lazy::new(|| {
    vec![
        ("article", Selector::parse("article p").unwrap()),
        (
            "text-block",
            Selector::parse("div[data-component=\"text-block\"] p").unwrap(),
        ),
        ("main", Selector::parse("main p").unwrap()),
    ]
});

/// Title from the first `h1`, or the placeholder.
pub fn extract_title(document: &Html) -> String {
    document
        .select(&TITLE_SELECTOR)
        .next()
        .map(|h1| collapse_whitespace(&h1.text().collect::<Vec<_>>().join(" ")))
        .filter(|title| !title.is_empty())
        .unwrap_or_else(|| TITLE_PLACEHOLDER.to_string())
}

/// Body text via the strategy cascade.
///
/// Picks the strategy yielding the most paragraph nodes, falls back to all
/// `p` elements when every structured strategy finds none, and falls back
/// further to raw container text (truncated to the character budget) when
/// the paragraph-based body stays under the minimum length.
pub fn extract_body(document: &Html) -> String {
    let mut chosen_name = "";
    let mut chosen: Vec<scraper::ElementRef> = Vec::new();
    for (name, selector) in BODY_STRATEGIES.iter() {
        let paragraphs: Vec<_> = document.select(selector).collect();
        debug!(strategy = name, paragraphs = paragraphs.len(), "body strategy candidate");
        if paragraphs.len() > chosen.len() {
            chosen_name = name;
            chosen = paragraphs;
        }
    }
    if chosen.is_empty() {
        chosen_name = "all-paragraphs";
        chosen = document.select(&ALL_PARAGRAPHS).collect();
    }
    debug!(strategy = chosen_name, paragraphs = chosen.len(), "body strategy selected");

    let mut body = String::new();
    for paragraph in &chosen {
        let text = collapse_whitespace(&paragraph.text().collect::<Vec<_>>().join(" "));
        if text.len() > MIN_PARAGRAPH_CHARS {
            body.push_str(&text);
            body.push(' ');
        }
        if body.len() > BODY_TARGET_CHARS {
            break;
        }
    }
    let body = body.trim().to_string();
    if body.len() >= MIN_BODY_CHARS {
        return body;
    }

    // Structured extraction came up short; take what the content containers
    // hold, bounded by the character budget.
    let raw = collapse_whitespace(
        &document
            .select(&CONTENT_ROOT)
            .flat_map(|el| el.text())
            .collect::<Vec<_>>()
            .join(" "),
    );
    if raw.len() > MIN_RAW_CHARS {
        debug!(raw_len = raw.len(), "falling back to raw container text");
        raw.chars().take(RAW_BUDGET_CHARS).collect()
    } else {
        body
    }
}

/// Thumbnail URL: Open Graph image, then Twitter card, then the first image
/// inside a content container. Protocol-relative and root-relative results
/// are absolutized against the site origin.
pub fn extract_image_url(document: &Html, origin: &str) -> Option<String> {
    let raw = document
        .select(&OG_IMAGE)
        .next()
        .and_then(|meta| meta.value().attr("content"))
        .filter(|src| !src.is_empty())
        .or_else(|| {
            document
                .select(&TWITTER_IMAGE)
                .next()
                .and_then(|meta| meta.value().attr("content"))
                .filter(|src| !src.is_empty())
        })
        .or_else(|| {
            document.select(&CONTENT_IMAGE).next().and_then(|img| {
                // data-src covers lazily loaded images.
                img.value()
                    .attr("src")
                    .filter(|src| !src.is_empty())
                    .or_else(|| img.value().attr("data-src").filter(|src| !src.is_empty()))
            })
        })?;

    Some(absolutize(raw, origin))
}

fn absolutize(url: &str, origin: &str) -> String {
    if url.starts_with("//") {
        format!("https:{url}")
    } else if url.starts_with('/') {
        format!("{}{}", origin.trim_end_matches('/'), url)
    } else {
        url.to_string()
    }
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const ORIGIN: &str = "https://www.bbc.com";

    fn parse(html: &str) -> Html {
        Html::parse_document(html)
    }

    fn long_paragraph(n: usize) -> String {
        format!("<p>Paragraph number {n} with enough text to pass the length filter.</p>")
    }

    #[test]
    fn test_title_from_first_h1() {
        let doc = parse("<html><body><h1> Big  match report </h1><h1>Other</h1></body></html>");
        assert_eq!(extract_title(&doc), "Big match report");
    }

    #[test]
    fn test_title_placeholder_when_missing() {
        let doc = parse("<html><body><h2>Not a headline</h2></body></html>");
        assert_eq!(extract_title(&doc), TITLE_PLACEHOLDER);
    }

    #[test]
    fn test_body_prefers_strategy_with_most_paragraphs() {
        let article_paragraphs: String = (0..2).map(long_paragraph).collect();
        let main_paragraphs: String = (0..5).map(long_paragraph).collect();
        let html = format!(
            "<html><body><article>{article_paragraphs}</article><main>{main_paragraphs}</main></body></html>"
        );
        let body = extract_body(&parse(&html));
        // "main p" sees five paragraphs, "article p" only two.
        assert!(body.contains("Paragraph number 4"));
    }

    #[test]
    fn test_body_falls_back_to_all_paragraphs() {
        let paragraphs: String = (0..3).map(long_paragraph).collect();
        let html = format!("<html><body><div>{paragraphs}</div></body></html>");
        let body = extract_body(&parse(&html));
        assert!(body.contains("Paragraph number 0"));
    }

    #[test]
    fn test_short_paragraphs_are_skipped() {
        let html = format!(
            "<html><body><article><p>Short.</p>{}</article></body></html>",
            long_paragraph(0)
        );
        let body = extract_body(&parse(&html));
        assert!(!body.contains("Short."));
        assert!(body.contains("Paragraph number 0"));
    }

    #[test]
    fn test_body_stops_near_target_budget() {
        let paragraphs: String = (0..50).map(long_paragraph).collect();
        let html = format!("<html><body><article>{paragraphs}</article></body></html>");
        let body = extract_body(&parse(&html));
        // One more paragraph may land after crossing the budget, never two.
        assert!(body.len() < BODY_TARGET_CHARS + 100);
    }

    #[test]
    fn test_raw_fallback_when_paragraphs_too_short() {
        let filler = "word ".repeat(400);
        let html =
            format!("<html><body><main><div>{filler}</div><p>tiny</p></main></body></html>");
        let body = extract_body(&parse(&html));
        assert!(body.len() >= MIN_BODY_CHARS);
        assert!(body.chars().count() <= RAW_BUDGET_CHARS);
    }

    #[test]
    fn test_og_image_wins() {
        let html = r#"<html><head>
            <meta property="og:image" content="https://ichef.bbci.co.uk/og.jpg">
            <meta name="twitter:image" content="https://ichef.bbci.co.uk/tw.jpg">
            </head><body><article><img src="/inline.jpg"></article></body></html>"#;
        assert_eq!(
            extract_image_url(&parse(html), ORIGIN),
            Some("https://ichef.bbci.co.uk/og.jpg".to_string())
        );
    }

    #[test]
    fn test_twitter_image_is_second_choice() {
        let html = r#"<html><head>
            <meta name="twitter:image" content="https://ichef.bbci.co.uk/tw.jpg">
            </head><body></body></html>"#;
        assert_eq!(
            extract_image_url(&parse(html), ORIGIN),
            Some("https://ichef.bbci.co.uk/tw.jpg".to_string())
        );
    }

    #[test]
    fn test_content_image_with_data_src() {
        let html = r#"<html><body><figure><img data-src="//cdn.example.com/lazy.jpg"></figure></body></html>"#;
        assert_eq!(
            extract_image_url(&parse(html), ORIGIN),
            Some("https://cdn.example.com/lazy.jpg".to_string())
        );
    }

    #[test]
    fn test_root_relative_image_gets_origin() {
        let html = r#"<html><body><main><img src="/media/photo.jpg"></main></body></html>"#;
        assert_eq!(
            extract_image_url(&parse(html), ORIGIN),
            Some("https://www.bbc.com/media/photo.jpg".to_string())
        );
    }

    #[test]
    fn test_no_image_yields_none() {
        let html = "<html><body><article><p>No pictures here.</p></article></body></html>";
        assert_eq!(extract_image_url(&parse(html), ORIGIN), None);
    }
}

//! HTML parsing helpers for source adapters.
//!
//! Thin wrappers over the `scraper` crate so adapters can pull text out
//! of index and chapter pages without repeating selector plumbing.

use scraper::{Html, Selector};

/// Parses an HTML document from a string.
pub fn parse(html: &str) -> Html {
    Html::parse_document(html)
}

/// Extracts text content from the first element matching a CSS selector.
///
/// Returns the element's combined text with surrounding whitespace
/// trimmed, or `None` if nothing matches (or the selector is invalid).
///
/// # Examples
///
/// ```rust
/// use novelsync::net::html;
///
/// let document = html::parse(r#"<div id="info"><h1>全民巨鱼求生</h1></div>"#);
/// let title = html::select_text(&document, "#info h1");
/// assert_eq!(title, Some("全民巨鱼求生".to_string()));
/// ```
pub fn select_text(html: &Html, selector: &str) -> Option<String> {
    Selector::parse(selector).ok().and_then(|sel| {
        html.select(&sel)
            .next()
            .map(|el| el.text().collect::<String>().trim().to_string())
    })
}

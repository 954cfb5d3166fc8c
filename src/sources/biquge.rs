use once_cell::sync::Lazy;
use regex::Regex;
use scraper::Selector;

use crate::{
    config::SyncConfig,
    error::Result,
    net::{HttpClient, html},
    source::{BookIndex, Source},
    types::ChapterRef,
};
use async_trait::async_trait;
use std::time::Duration;

/// Author line on the info block, e.g. "作 者：失控云".
static AUTHOR_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"作\s*者[：:]\s*(.+)").expect("invalid author regex"));

/// Biquge (xbiqugu.la) source adapter.
///
/// Index pages carry the title in `div#info h1`, the author in the first
/// `div#info p`, and the chapter list as `dd > a` links inside
/// `div#list`. Chapter bodies live in `div#content`.
pub struct BiquguSource {
    base_url: String,
    client: HttpClient,
}

impl BiquguSource {
    /// Creates an adapter for the public site with default tunables.
    pub fn new() -> Self {
        Self::with_base_url("http://www.xbiqugu.la")
    }

    /// Creates an adapter against a custom base URL.
    ///
    /// Used for mirrors, and by tests to point at a local server.
    pub fn with_base_url(base_url: impl Into<String>) -> Self {
        let client = HttpClient::new("biquge")
            .with_header(
                "Accept",
                "text/html,application/xhtml+xml,application/xml;q=0.9,image/avif,image/webp,*/*;q=0.8",
            )
            .with_header("Accept-Language", "zh-CN,zh;q=0.9,en;q=0.8")
            .with_header("Connection", "keep-alive");

        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            client,
        }
    }

    /// Applies engine tunables (timeout, retries, pacing) to the client.
    pub fn with_config(mut self, config: &SyncConfig) -> Self {
        self.client = self
            .client
            .with_timeout(Duration::from_secs(config.request_timeout_secs))
            .with_max_retries(config.max_retries)
            .with_pacing(config.chapter_delay_min_ms, config.chapter_delay_max_ms);
        self
    }
}

impl Default for BiquguSource {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Source for BiquguSource {
    fn id(&self) -> &'static str {
        "biquge"
    }

    fn name(&self) -> &'static str {
        "笔趣阁"
    }

    fn base_url(&self) -> &str {
        &self.base_url
    }

    async fn fetch_index(&self, book_path: &str) -> Result<BookIndex> {
        let url = format!("{}{}", self.base_url, book_path);
        let page = self.client.get_text(&url).await?;
        let document = html::parse(&page);

        let title = html::select_text(&document, "div#info h1").unwrap_or_default();

        let author = html::select_text(&document, "div#info p")
            .and_then(|line| {
                AUTHOR_RE
                    .captures(&line)
                    .and_then(|c| c.get(1))
                    .map(|m| m.as_str().trim().to_string())
            })
            .unwrap_or_default();

        let link_selector = Selector::parse("div#list dd a[href]")
            .map_err(|e| crate::Error::parse(format!("bad chapter selector: {e}")))?;

        let mut chapters = Vec::new();
        for element in document.select(&link_selector) {
            let chapter_title = element.text().collect::<String>().trim().to_string();
            let href = element.value().attr("href").unwrap_or_default();
            if chapter_title.is_empty() || href.is_empty() {
                continue;
            }
            chapters.push(ChapterRef {
                index: chapters.len(),
                title: chapter_title,
                locator: href.to_string(),
            });
        }

        Ok(BookIndex {
            title,
            author,
            chapters,
        })
    }

    async fn fetch_chapter(&self, locator: &str) -> Result<String> {
        let url = format!("{}{}", self.base_url, locator);
        let page = self.client.get_text(&url).await?;
        let document = html::parse(&page);

        html::select_text(&document, "div#content")
            .filter(|text| !text.is_empty())
            .ok_or_else(|| crate::Error::parse(format!("no content block at {locator}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const INDEX_PAGE: &str = r#"
        <html><body>
        <div id="info">
            <h1>全民巨鱼求生</h1>
            <p>作 者：失控云</p>
            <p>最后更新：2026-08-01</p>
        </div>
        <div id="list">
            <dl>
                <dd><a href="/145/145857/1.html">第一章 开端</a></dd>
                <dd><a href="/145/145857/2.html">第二章 深海</a></dd>
                <dd><a>无链接</a></dd>
            </dl>
        </div>
        </body></html>
    "#;

    #[test]
    fn index_page_parses_metadata_and_chapters() {
        let document = html::parse(INDEX_PAGE);

        let title = html::select_text(&document, "div#info h1").unwrap();
        assert_eq!(title, "全民巨鱼求生");

        let author_line = html::select_text(&document, "div#info p").unwrap();
        let author = AUTHOR_RE
            .captures(&author_line)
            .and_then(|c| c.get(1))
            .map(|m| m.as_str().trim().to_string())
            .unwrap();
        assert_eq!(author, "失控云");

        let selector = Selector::parse("div#list dd a[href]").unwrap();
        let links: Vec<_> = document.select(&selector).collect();
        assert_eq!(links.len(), 2);
        assert_eq!(links[0].value().attr("href"), Some("/145/145857/1.html"));
    }

    #[test]
    fn author_regex_accepts_both_colon_forms() {
        for line in ["作者：某人", "作 者: 某人", "作者:某人"] {
            let captured = AUTHOR_RE
                .captures(line)
                .and_then(|c| c.get(1))
                .map(|m| m.as_str().trim().to_string());
            assert_eq!(captured.as_deref(), Some("某人"), "line: {line}");
        }
    }

    #[test]
    fn base_url_trailing_slash_is_stripped() {
        let source = BiquguSource::with_base_url("http://mirror.example/");
        assert_eq!(source.base_url(), "http://mirror.example");
    }
}

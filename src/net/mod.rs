//! Network utilities: HTTP client with retries, jittered pacing, and
//! rotating user agents.
//!
//! Every source adapter drives its requests through [`HttpClient`],
//! which provides:
//!
//! - **Bounded retries**: each attempt is independent (fresh headers,
//!   newly rotated user agent) with a short randomized backoff between
//!   attempts to reduce server-side blocking.
//! - **Jittered pacing**: a [`Pacer`] enforces a small randomized delay
//!   between consecutive requests from the same client.
//! - **Request timeout**: configured at construction, so a hung request
//!   can only stall its own attempt.
//!
//! # Examples
//!
//! ```rust
//! use novelsync::net::HttpClient;
//! use std::time::Duration;
//!
//! # async fn example() -> novelsync::Result<()> {
//! let client = HttpClient::new("biquge")
//!     .with_timeout(Duration::from_secs(15))
//!     .with_max_retries(3)
//!     .with_pacing(50, 200);
//!
//! let html = client.get_text("http://www.xbiqugu.la/145/145857/").await?;
//! # Ok(())
//! # }
//! ```

use bytes::Bytes;
use encoding_rs::{Encoding, GBK};
use parking_lot::Mutex;
use rand::Rng;
use rand::seq::SliceRandom;
use reqwest::{Client, header::HeaderMap};
use std::time::{Duration, Instant};

pub mod html;

/// Browser user agents rotated across request attempts.
const USER_AGENTS: &[&str] = &[
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Macintosh; Intel Mac OS X 10.15; rv:123.0) Gecko/20100101 Firefox/123.0",
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/131.0.0.0 Safari/537.36 Edg/131.0.0.0",
];

/// Backoff between failed attempts, sampled uniformly (milliseconds).
const RETRY_BACKOFF_MS: (u64, u64) = (500, 1500);

/// Picks a user agent at random from the pool.
fn random_user_agent() -> &'static str {
    USER_AGENTS
        .choose(&mut rand::thread_rng())
        .copied()
        .unwrap_or(USER_AGENTS[0])
}

/// Enforces a randomized minimum gap between consecutive requests.
///
/// Each call to [`pause`](Pacer::pause) samples a jitter in the
/// configured range and sleeps however long is still needed since the
/// previous request. This is the crate's only rate-limiting mechanism;
/// there is no protocol-level negotiation.
#[derive(Debug)]
pub struct Pacer {
    last_request: Mutex<Option<Instant>>,
    min_delay_ms: u64,
    max_delay_ms: u64,
}

impl Clone for Pacer {
    fn clone(&self) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_delay_ms: self.min_delay_ms,
            max_delay_ms: self.max_delay_ms,
        }
    }
}

impl Pacer {
    /// Creates a pacer sampling delays uniformly in `[min_ms, max_ms]`.
    pub fn new(min_ms: u64, max_ms: u64) -> Self {
        Self {
            last_request: Mutex::new(None),
            min_delay_ms: min_ms,
            max_delay_ms: max_ms.max(min_ms),
        }
    }

    /// Sleeps until the sampled gap since the last request has elapsed.
    pub async fn pause(&self) {
        let jitter_ms = {
            let mut rng = rand::thread_rng();
            rng.gen_range(self.min_delay_ms..=self.max_delay_ms)
        };
        let gap = Duration::from_millis(jitter_ms);

        let wait = {
            let last = self.last_request.lock();
            match *last {
                Some(at) => gap.checked_sub(at.elapsed()),
                None => None,
            }
        };

        if let Some(wait) = wait {
            tokio::time::sleep(wait).await;
        }

        *self.last_request.lock() = Some(Instant::now());
    }
}

/// HTTP client wrapper with built-in pacing and retry logic.
///
/// Each client is associated with a source and carries that source's
/// default headers. Requests are paced, retried with jittered backoff,
/// and time-bounded individually.
#[derive(Clone, Debug)]
pub struct HttpClient {
    source_id: String,
    client: Client,
    pacer: Pacer,
    max_retries: u32,
    headers: HeaderMap,
}

impl HttpClient {
    /// Creates a new HTTP client for the specified source.
    ///
    /// Defaults: 15 second request timeout, 3 attempts, 50-200ms pacing
    /// jitter.
    pub fn new(source_id: impl Into<String>) -> Self {
        Self {
            source_id: source_id.into(),
            client: build_client(Duration::from_secs(15)),
            pacer: Pacer::new(50, 200),
            max_retries: 3,
            headers: HeaderMap::new(),
        }
    }

    /// Sets the per-request timeout (rebuilds the underlying client).
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.client = build_client(timeout);
        self
    }

    /// Sets the maximum number of attempts per request.
    pub fn with_max_retries(mut self, retries: u32) -> Self {
        self.max_retries = retries.max(1);
        self
    }

    /// Sets the pacing jitter range in milliseconds.
    pub fn with_pacing(mut self, min_ms: u64, max_ms: u64) -> Self {
        self.pacer = Pacer::new(min_ms, max_ms);
        self
    }

    /// Adds a default header to all requests made by this client.
    ///
    /// Invalid header names or values are silently ignored.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        if let (Ok(name), Ok(value)) = (
            name.parse::<reqwest::header::HeaderName>(),
            value.parse::<reqwest::header::HeaderValue>(),
        ) {
            self.headers.insert(name, value);
        }
        self
    }

    /// Performs a GET request with pacing and bounded retries.
    ///
    /// Every attempt gets a freshly rotated user agent. Non-2xx statuses
    /// and transport errors are retried up to the attempt limit with a
    /// randomized backoff in between; the last failure is returned as a
    /// [`Source`](crate::Error::Source) or
    /// [`Network`](crate::Error::Network) error.
    pub async fn get(&self, url: &str) -> crate::Result<Bytes> {
        Ok(self.get_with_content_type(url).await?.1)
    }

    async fn get_with_content_type(&self, url: &str) -> crate::Result<(Option<String>, Bytes)> {
        let mut attempt = 0u32;

        loop {
            attempt += 1;
            self.pacer.pause().await;

            let request = self
                .client
                .get(url)
                .headers(self.headers.clone())
                .header(reqwest::header::USER_AGENT, random_user_agent());

            let outcome = match request.send().await {
                Ok(response) if response.status().is_success() => {
                    let content_type = response
                        .headers()
                        .get(reqwest::header::CONTENT_TYPE)
                        .and_then(|v| v.to_str().ok())
                        .map(str::to_string);
                    return Ok((content_type, response.bytes().await?));
                }
                Ok(response) => Err(crate::Error::source(
                    &self.source_id,
                    format!("HTTP {} for {}", response.status(), url),
                )),
                Err(e) => Err(crate::Error::Network(e)),
            };

            if attempt >= self.max_retries {
                return outcome;
            }

            let backoff_ms = {
                let mut rng = rand::thread_rng();
                rng.gen_range(RETRY_BACKOFF_MS.0..=RETRY_BACKOFF_MS.1)
            };
            tracing::debug!(
                source = %self.source_id,
                url,
                attempt,
                backoff_ms,
                "request failed, retrying"
            );
            tokio::time::sleep(Duration::from_millis(backoff_ms)).await;
        }
    }

    /// Performs a GET request and returns the response body as text.
    ///
    /// The charset is detected rather than assumed: the `Content-Type`
    /// header is consulted first, then a `<meta charset>` sniff of the
    /// document head. Undeclared non-UTF-8 bodies are tried as GBK
    /// (what biquge-family mirrors actually serve) before the lossy
    /// UTF-8 last resort.
    pub async fn get_text(&self, url: &str) -> crate::Result<String> {
        let (content_type, bytes) = self.get_with_content_type(url).await?;
        Ok(decode_text(&bytes, content_type.as_deref()))
    }
}

/// Decodes a response body to text using the detected charset.
fn decode_text(bytes: &[u8], content_type: Option<&str>) -> String {
    let declared = content_type
        .and_then(charset_from_content_type)
        .or_else(|| charset_from_meta(bytes));
    if let Some(encoding) = declared {
        let (text, _, _) = encoding.decode(bytes);
        return text.into_owned();
    }

    if let Ok(text) = std::str::from_utf8(bytes) {
        return text.to_string();
    }

    // Undeclared and not UTF-8: these sites overwhelmingly serve GBK.
    let (text, _, had_errors) = GBK.decode(bytes);
    if !had_errors {
        return text.into_owned();
    }
    String::from_utf8_lossy(bytes).into_owned()
}

/// Parses the charset parameter of a `Content-Type` header value.
fn charset_from_content_type(value: &str) -> Option<&'static Encoding> {
    value.split(';').skip(1).find_map(|param| {
        let param = param.trim();
        param
            .strip_prefix("charset=")
            .or_else(|| param.strip_prefix("CHARSET="))
            .and_then(|label| Encoding::for_label(label.trim_matches(['"', '\'']).as_bytes()))
    })
}

/// Sniffs `charset=` out of a `<meta>` tag in the document head.
///
/// Only the first 1024 bytes are examined; charset labels are ASCII, so
/// a lossy decode of the head is safe for the scan.
fn charset_from_meta(bytes: &[u8]) -> Option<&'static Encoding> {
    let head = &bytes[..bytes.len().min(1024)];
    let head = String::from_utf8_lossy(head).to_ascii_lowercase();
    let rest = &head[head.find("charset=")? + "charset=".len()..];
    let label: String = rest
        .trim_start_matches(['"', '\''])
        .chars()
        .take_while(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_'))
        .collect();
    Encoding::for_label(label.as_bytes())
}

fn build_client(timeout: Duration) -> Client {
    Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(10)
        .gzip(true)
        .brotli(true)
        .build()
        .expect("Failed to build HTTP client")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_agent_pool_is_nonempty() {
        assert!(!USER_AGENTS.is_empty());
        assert!(random_user_agent().starts_with("Mozilla/5.0"));
    }

    #[tokio::test]
    async fn pacer_first_pause_is_immediate() {
        let pacer = Pacer::new(5_000, 5_000);
        let start = Instant::now();
        pacer.pause().await;
        // No prior request recorded, so no wait should happen.
        assert!(start.elapsed() < Duration::from_millis(500));
    }

    #[test]
    fn decode_text_honors_content_type_charset() {
        let (gbk, _, _) = GBK.encode("深海之下，巨鱼的心声。");
        let text = decode_text(&gbk, Some("text/html; charset=gbk"));
        assert_eq!(text, "深海之下，巨鱼的心声。");
    }

    #[test]
    fn decode_text_sniffs_meta_charset() {
        let (gbk, _, _) = GBK.encode(r#"<meta charset="gbk"><div>正文内容</div>"#);
        let text = decode_text(&gbk, Some("text/html"));
        assert!(text.contains("正文内容"));
    }

    #[test]
    fn decode_text_tries_gbk_for_undeclared_bodies() {
        let (gbk, _, _) = GBK.encode("未声明编码的正文");
        assert!(std::str::from_utf8(&gbk).is_err());
        let text = decode_text(&gbk, None);
        assert_eq!(text, "未声明编码的正文");
    }

    #[test]
    fn decode_text_passes_utf8_through() {
        let text = decode_text("已经是 UTF-8 的正文".as_bytes(), None);
        assert_eq!(text, "已经是 UTF-8 的正文");
    }

    #[tokio::test]
    async fn pacer_enforces_gap_between_requests() {
        let pacer = Pacer::new(100, 100);
        pacer.pause().await;
        let start = Instant::now();
        pacer.pause().await;
        assert!(start.elapsed() >= Duration::from_millis(90));
    }
}

//! Source trait: the seam between the sync engine and site adapters.
//!
//! A [`Source`] knows how to fetch and parse one site's pages into the
//! normalized shapes the engine consumes: a [`BookIndex`] (metadata plus
//! an ordered [`ChapterRef`] list) and raw chapter text. Everything
//! above this trait (delta planning, bounded-parallel fetching, retry
//! policy, document assembly) is site-agnostic.
//!
//! # Implementation Guidelines
//!
//! - Drive requests through [`net::HttpClient`](crate::net::HttpClient)
//!   so pacing, retries, and timeouts apply uniformly.
//! - `fetch_index` should fail with a descriptive error when the page is
//!   missing its expected structure; that failure is book-fatal.
//! - `fetch_chapter` should return the *raw* extracted text. Glyph
//!   decoding and boilerplate cleaning are applied by the fetcher.
//! - Sources that obfuscate text via a substitution cipher override
//!   [`glyph_map`](Source::glyph_map).
//!
//! # Examples
//!
//! ```rust
//! use async_trait::async_trait;
//! use novelsync::error::Result;
//! use novelsync::source::{BookIndex, Source};
//!
//! struct FixtureSource;
//!
//! #[async_trait]
//! impl Source for FixtureSource {
//!     fn id(&self) -> &'static str { "fixture" }
//!     fn name(&self) -> &'static str { "Fixture" }
//!     fn base_url(&self) -> &str { "http://localhost" }
//!
//!     async fn fetch_index(&self, _book_path: &str) -> Result<BookIndex> {
//!         Ok(BookIndex { title: "书".into(), author: "人".into(), chapters: vec![] })
//!     }
//!
//!     async fn fetch_chapter(&self, _locator: &str) -> Result<String> {
//!         Ok("正文".into())
//!     }
//! }
//! ```

use async_trait::async_trait;

use crate::{error::Result, glyph::GlyphMap, types::ChapterRef};

/// A freshly fetched chapter index with book metadata.
///
/// `chapters` is in source order; each [`ChapterRef::index`] equals its
/// position in this vector. Empty `title`/`author` mean the page did not
/// yield them and the engine falls back to the configured values.
#[derive(Debug, Clone)]
pub struct BookIndex {
    /// Book title from the index page (may be empty)
    pub title: String,

    /// Author from the index page (may be empty)
    pub author: String,

    /// Full chapter list in source order
    pub chapters: Vec<ChapterRef>,
}

/// Trait that all site adapters implement.
#[async_trait]
pub trait Source: Send + Sync {
    /// Unique identifier for this source (lowercase, stable).
    fn id(&self) -> &'static str;

    /// Human-readable name of the site.
    fn name(&self) -> &'static str;

    /// Root URL of the site, without a trailing slash.
    fn base_url(&self) -> &str;

    /// Fetches and parses a book's index page.
    ///
    /// # Errors
    ///
    /// * [`Error::Parse`](crate::Error::Parse) - page missing expected structure
    /// * [`Error::Source`](crate::Error::Source) - HTTP-level failure after retries
    /// * [`Error::Network`](crate::Error::Network) - transport failure after retries
    ///
    /// An error here aborts this book's sync (and only this book's).
    async fn fetch_index(&self, book_path: &str) -> Result<BookIndex>;

    /// Fetches one chapter and returns its raw extracted text.
    ///
    /// The fetcher layered on top converts any error into a failed
    /// chapter result, so implementations should not swallow failures
    /// themselves.
    async fn fetch_chapter(&self, locator: &str) -> Result<String>;

    /// Glyph substitution table for sources that obfuscate text.
    ///
    /// The default is `None` (no decoding applied).
    fn glyph_map(&self) -> Option<&GlyphMap> {
        None
    }
}

//! Core data types for books, chapters, and per-book sync reports.
//!
//! This module defines the fundamental data structures used throughout
//! novelsync:
//!
//! - [`Book`] - A configured book to keep in sync
//! - [`ChapterRef`] - One entry of a freshly fetched chapter index
//! - [`ChapterResult`] - The outcome of fetching one chapter
//! - [`BookReport`] - Per-book summary produced by a sync run
//!
//! `ChapterRef` and `ChapterResult` are ephemeral, scoped to a single
//! run; `Book` records persist in the config file and their `book_path`
//! doubles as the stable checkpoint key across runs.

use serde::{Deserialize, Serialize};

/// A book to keep in sync, as configured by the user.
///
/// The `book_path` is the site-specific identifier (e.g. `/145/145857/`)
/// and serves as the book's stable identity: it keys the checkpoint map
/// across runs. `name` and `author` are fallbacks used when the source's
/// index page does not yield them.
///
/// # Examples
///
/// ```rust
/// use novelsync::types::Book;
///
/// let book = Book {
///     name: "示例小说".to_string(),
///     author: "佚名".to_string(),
///     book_path: "/145/145857/".to_string(),
/// };
/// assert_eq!(book.book_path, "/145/145857/");
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Book {
    /// Display name (fallback if the index page has none)
    pub name: String,

    /// Author name (fallback if the index page has none)
    pub author: String,

    /// Site-specific book path; stable checkpoint key
    #[serde(default)]
    pub book_path: String,
}

/// One entry of a chapter index, immutable once parsed.
///
/// `index` is the 0-based ordinal position in source order. The final
/// document preserves this order regardless of fetch-completion order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterRef {
    /// 0-based position in the source's chapter list
    pub index: usize,

    /// Chapter title as listed on the index page
    pub title: String,

    /// Opaque fetch handle (relative URL on most sources)
    pub locator: String,
}

/// The outcome of fetching one chapter; produced once, never mutated.
///
/// A failed fetch still produces a result (with `ok == false` and empty
/// text) so the assembler can render an explicit placeholder block and
/// keep the document's chapter-count/index alignment intact.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChapterResult {
    /// Index of the originating [`ChapterRef`]
    pub index: usize,

    /// Chapter title, carried through for rendering
    pub title: String,

    /// Cleaned chapter text; empty when the fetch failed
    pub text: String,

    /// Whether the fetch produced usable content
    pub ok: bool,
}

impl ChapterResult {
    /// Creates a successful result with cleaned chapter text.
    pub fn success(index: usize, title: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            text: text.into(),
            ok: true,
        }
    }

    /// Creates a failed result (retries exhausted, short content, or a
    /// panicked fetch task).
    pub fn failed(index: usize, title: impl Into<String>) -> Self {
        Self {
            index,
            title: title.into(),
            text: String::new(),
            ok: false,
        }
    }
}

/// Per-book summary of one sync run.
///
/// Collected into a [`RunSummary`](crate::sync::RunSummary) and
/// serialized into the automation `details` payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookReport {
    /// Resolved display name (index page value when available)
    pub name: String,

    /// Resolved author
    pub author: String,

    /// Whether the book synced (partial chapter failures still count)
    pub success: bool,

    /// Output document filename, when a document was produced
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,

    /// Size of the written document in bytes
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file_size: Option<u64>,

    /// Chapters newly fetched this run
    pub new_chapters: usize,

    /// Total chapters in the fresh index
    pub total_chapters: usize,

    /// Chapters that failed all retries this run
    pub fail_count: usize,

    /// Failure reason for unsuccessful books
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

impl BookReport {
    /// Creates a failed report for a book that could not sync at all.
    pub fn failure(name: impl Into<String>, author: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            author: author.into(),
            success: false,
            filename: None,
            file_size: None,
            new_chapters: 0,
            total_chapters: 0,
            fail_count: 0,
            reason: Some(reason.into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chapter_result_constructors() {
        let ok = ChapterResult::success(3, "第四章", "正文内容");
        assert!(ok.ok);
        assert_eq!(ok.index, 3);
        assert_eq!(ok.text, "正文内容");

        let bad = ChapterResult::failed(7, "第八章");
        assert!(!bad.ok);
        assert_eq!(bad.index, 7);
        assert!(bad.text.is_empty());
    }

    #[test]
    fn book_report_failure_has_reason() {
        let report = BookReport::failure("书名", "作者", "no_chapters");
        assert!(!report.success);
        assert_eq!(report.reason.as_deref(), Some("no_chapters"));
        assert_eq!(report.total_chapters, 0);
    }

    #[test]
    fn book_deserializes_without_book_path() {
        let book: Book = serde_json::from_str(r#"{"name":"n","author":"a"}"#).unwrap();
        assert!(book.book_path.is_empty());
    }
}

//! Error types and result handling for novelsync operations.
//!
//! All public operations return a [`Result<T>`], a type alias for
//! `std::result::Result<T, Error>`.
//!
//! # Error Categories
//!
//! - **Network errors**: connection issues, timeouts, HTTP status failures
//! - **Parse errors**: index or chapter pages missing expected structure
//! - **Source errors**: site-specific failures with context
//! - **Not found**: missing books, empty chapter indexes
//! - **IO errors**: document and state-file operations
//! - **JSON errors**: config/checkpoint (de)serialization failures
//!
//! Note that per-chapter fetch failures are deliberately *not* errors:
//! the fetcher degrades them to a failed
//! [`ChapterResult`](crate::types::ChapterResult) so that one bad chapter
//! can never abort a book's sync.

use thiserror::Error;

/// Type alias for Results with novelsync errors.
///
/// # Examples
///
/// ```rust
/// use novelsync::{Result, Error};
///
/// fn example_operation() -> Result<String> {
///     Ok("Success".to_string())
/// }
///
/// fn example_with_error() -> Result<()> {
///     Err(Error::parse("Something went wrong"))
/// }
/// ```
pub type Result<T> = std::result::Result<T, Error>;

/// Comprehensive error type for all novelsync operations.
///
/// Only book-level failures surface as errors (index fetch failed, zero
/// chapters found, document write failed). Chapter-level problems are
/// absorbed by the fetcher's retry policy and become failed results.
#[derive(Error, Debug)]
pub enum Error {
    /// Network-related errors from HTTP operations.
    ///
    /// Wraps errors from the underlying HTTP client (reqwest), including
    /// connection timeouts, DNS resolution failures, and transport errors.
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// HTML parsing and data format errors.
    ///
    /// Used when a received page cannot be parsed as expected, such as an
    /// index page missing its chapter list container.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use novelsync::Error;
    ///
    /// let error = Error::parse("index page has no chapter list");
    /// ```
    #[error("Parse error: {0}")]
    Parse(String),

    /// Source-specific errors with contextual information.
    ///
    /// # Fields
    ///
    /// * `src` - The identifier of the source that encountered the error
    /// * `message` - Descriptive error message
    #[error("Source error [{src}]: {message}")]
    Source { src: String, message: String },

    /// Resource not found errors (missing book, empty index).
    #[error("Not found: {0}")]
    NotFound(String),

    /// File system and IO operation errors.
    ///
    /// Wraps standard IO errors from document writes, prior-content
    /// reads, and state-file operations.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization and deserialization errors.
    ///
    /// Wraps serde_json errors from the checkpoint state file and the
    /// novels config file.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Generic error messages that fit no other category.
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Creates a parse error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use novelsync::Error;
    ///
    /// let error = Error::parse("chapter list container missing");
    /// ```
    pub fn parse(msg: impl Into<String>) -> Self {
        Error::Parse(msg.into())
    }

    /// Creates a source-specific error with source ID and message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use novelsync::Error;
    ///
    /// let error = Error::source("biquge", "HTTP 503");
    /// ```
    pub fn source(src: impl Into<String>, msg: impl Into<String>) -> Self {
        Error::Source {
            src: src.into(),
            message: msg.into(),
        }
    }

    /// Creates a not found error with the given message.
    ///
    /// # Examples
    ///
    /// ```rust
    /// use novelsync::Error;
    ///
    /// let error = Error::not_found("no chapters listed for /145/145857/");
    /// ```
    pub fn not_found(msg: impl Into<String>) -> Self {
        Error::NotFound(msg.into())
    }
}

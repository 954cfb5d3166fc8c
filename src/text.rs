//! Text cleaning and filename sanitization.
//!
//! Chapter pages carry boilerplate the final document should not:
//! injected site URLs, "read on mobile" footers, and irregular
//! whitespace. [`clean_content`] strips the known ad strings and
//! normalizes paragraphs. [`sanitize_filename`] makes book names safe
//! for use as output filenames on common filesystems.

use once_cell::sync::Lazy;
use regex::Regex;

/// Advertisement fragments injected into chapter bodies by the source.
static AD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    [
        r"最新网址：\S+\s*",
        r"www\.xbiqugu?\.\w+\s*",
        r"笔趣阁\S*\s*",
        r"手机版阅读网址：\S*\s*",
    ]
    .iter()
    .map(|p| Regex::new(p).expect("invalid ad pattern"))
    .collect()
});

static RUNS_OF_SPACES: Lazy<Regex> = Lazy::new(|| Regex::new(r"[ \t]+").expect("invalid regex"));
static EXCESS_BLANKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("invalid regex"));

/// Cleans a chapter body: removes ad fragments and normalizes whitespace.
///
/// Paragraphs are trimmed and re-joined with single newlines; runs of
/// spaces/tabs collapse to one space. The result is what gets length-
/// checked against the minimum-content threshold, so boilerplate-only
/// pages end up short enough to be marked as failures.
///
/// # Examples
///
/// ```rust
/// use novelsync::text::clean_content;
///
/// let raw = "最新网址：www.example.com\n第一段   内容\n\n\n\n第二段内容";
/// assert_eq!(clean_content(raw), "第一段 内容\n第二段内容");
/// ```
pub fn clean_content(text: &str) -> String {
    let mut cleaned = text.to_string();
    for pattern in AD_PATTERNS.iter() {
        cleaned = pattern.replace_all(&cleaned, "").into_owned();
    }

    let cleaned = RUNS_OF_SPACES.replace_all(&cleaned, " ");
    let cleaned = EXCESS_BLANKS.replace_all(&cleaned, "\n\n");

    cleaned
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect::<Vec<_>>()
        .join("\n")
}

/// Sanitizes a book name for use as a filename.
///
/// Characters not allowed in filenames on most operating systems are
/// replaced with underscores; overlong names are truncated at a char
/// boundary and empty names fall back to "untitled".
///
/// # Examples
///
/// ```rust
/// use novelsync::text::sanitize_filename;
///
/// assert_eq!(sanitize_filename("问道:长生?"), "问道_长生_");
/// ```
pub fn sanitize_filename(name: &str) -> String {
    let invalid_chars = ['/', '\\', ':', '*', '?', '"', '<', '>', '|'];
    let mut sanitized = name.to_string();

    for &ch in &invalid_chars {
        sanitized = sanitized.replace(ch, "_");
    }

    let mut sanitized = sanitized.trim().to_string();
    if sanitized.chars().count() > 120 {
        sanitized = sanitized.chars().take(120).collect();
    }

    if sanitized.is_empty() {
        sanitized = "untitled".to_string();
    }

    sanitized
}

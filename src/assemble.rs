//! Document assembly: rendering chapter blocks and writing the merged
//! plain-text file.
//!
//! The assembler merges prior content with newly fetched, already
//! index-ordered chapter results. Failed chapters render as an explicit
//! placeholder block instead of being omitted; dropping them would
//! desynchronize the chapter count the checkpoint records from the
//! blocks the document actually contains, breaking future incremental
//! diffs.
//!
//! Writes are whole-file atomic overwrites (temp file + rename), never
//! append-in-place, so a crash mid-write leaves the previous document
//! intact.

use std::path::Path;

use crate::{error::Result, types::ChapterResult};

/// Placeholder body for chapters that failed all retries.
pub const FAILURE_PLACEHOLDER: &str = "[内容获取失败]";

/// Renders one chapter block: blank line, title, blank line, body.
pub fn render_chapter(result: &ChapterResult) -> String {
    let body = if result.ok {
        result.text.as_str()
    } else {
        FAILURE_PLACEHOLDER
    };
    format!("\n{}\n\n{}\n", result.title, body)
}

/// Renders the document header written at the top of a fresh document.
///
/// # Examples
///
/// ```rust
/// use novelsync::assemble::render_header;
///
/// let header = render_header("全民巨鱼求生", "失控云");
/// assert!(header.starts_with("《全民巨鱼求生》\n作者：失控云\n"));
/// ```
pub fn render_header(name: &str, author: &str) -> String {
    format!("《{}》\n作者：{}\n\n{}\n", name, author, "=".repeat(40))
}

/// Merges prior content with rendered chapter blocks.
///
/// When `existing` is non-empty the new blocks are appended to it;
/// otherwise the document starts with a header block. `results` must
/// already be in index order (the orchestrator guarantees this).
pub fn assemble(existing: &str, results: &[ChapterResult], name: &str, author: &str) -> String {
    let rendered: String = results.iter().map(render_chapter).collect();

    if existing.is_empty() {
        format!("{}{}", render_header(name, author), rendered)
    } else {
        format!("{}{}", existing, rendered)
    }
}

/// Writes the merged document, overwriting atomically.
///
/// The parent directory is created if needed; content goes to a sibling
/// temp file which is renamed over the target.
pub async fn write_document(path: &Path, content: &str) -> Result<u64> {
    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        tokio::fs::create_dir_all(parent).await?;
    }

    let tmp_path = path.with_extension("txt.tmp");
    tokio::fs::write(&tmp_path, content.as_bytes()).await?;
    tokio::fs::rename(&tmp_path, path).await?;

    Ok(content.len() as u64)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ok_result(index: usize, title: &str, text: &str) -> ChapterResult {
        ChapterResult::success(index, title, text)
    }

    #[test]
    fn chapter_block_format() {
        let block = render_chapter(&ok_result(0, "第一章 开端", "正文内容"));
        assert_eq!(block, "\n第一章 开端\n\n正文内容\n");
    }

    #[test]
    fn failed_chapter_renders_placeholder() {
        let block = render_chapter(&ChapterResult::failed(1, "第二章"));
        assert_eq!(block, format!("\n第二章\n\n{FAILURE_PLACEHOLDER}\n"));
    }

    #[test]
    fn fresh_document_starts_with_header() {
        let results = vec![ok_result(0, "第一章", "甲"), ok_result(1, "第二章", "乙")];
        let doc = assemble("", &results, "书名", "作者名");

        assert!(doc.starts_with("《书名》\n作者：作者名\n"));
        let first = doc.find("第一章").unwrap();
        let second = doc.find("第二章").unwrap();
        assert!(first < second);
    }

    #[test]
    fn append_keeps_existing_content_first() {
        let existing = "《书名》\n作者：作者名\n\n====\n\n第一章\n\n甲\n";
        let results = vec![ok_result(1, "第二章", "乙")];
        let doc = assemble(existing, &results, "书名", "作者名");

        assert!(doc.starts_with(existing));
        assert!(doc.ends_with("\n第二章\n\n乙\n"));
        // No second header block.
        assert_eq!(doc.matches("《书名》").count(), 1);
    }

    #[tokio::test]
    async fn write_document_creates_parent_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("book.txt");

        let size = write_document(&path, "第一版").await.unwrap();
        assert_eq!(size, "第一版".len() as u64);

        write_document(&path, "第二版").await.unwrap();
        let on_disk = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(on_disk, "第二版");
    }
}

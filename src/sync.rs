//! The incremental sync engine: plans, fetches, assembles, and
//! checkpoints one book at a time.
//!
//! [`SyncEngine`] drives the whole pipeline for a list of configured
//! books. Books are processed sequentially relative to each other; each
//! book's delta is fetched with its own bounded task group. One book's
//! total failure (index fetch failed, zero chapters) never aborts the
//! remaining books.
//!
//! The checkpoint map is read once at run start, mutated only between
//! books by this driver, and saved once at run end. A failed save is
//! logged, not fatal: the documents already written are safe, and the
//! only cost is a redundant refetch next run.
//!
//! # Examples
//!
//! ```rust,no_run
//! use novelsync::prelude::*;
//! use novelsync::sources::BiquguSource;
//! use std::sync::Arc;
//!
//! # async fn example() -> novelsync::Result<()> {
//! let config = SyncConfig::default();
//! let source = Arc::new(BiquguSource::new().with_config(&config));
//! let engine = SyncEngine::new(source, config);
//!
//! let books = vec![Book {
//!     name: "全民巨鱼求生".into(),
//!     author: "失控云".into(),
//!     book_path: "/145/145857/".into(),
//! }];
//!
//! let summary = engine.run(&books).await;
//! println!("{}/{} books synced", summary.succeeded(), summary.total());
//! # Ok(())
//! # }
//! ```

use chrono::Utc;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;

use crate::{
    assemble,
    checkpoint::{Checkpoint, CheckpointMap, CheckpointStore},
    config::SyncConfig,
    error::Result,
    fetch::{ChapterFetcher, fetch_delta},
    plan::{SyncPlan, plan_sync},
    source::Source,
    text::sanitize_filename,
    types::{Book, BookReport},
};

/// Drives incremental syncs for a set of books against one source.
pub struct SyncEngine {
    source: Arc<dyn Source>,
    store: CheckpointStore,
    config: SyncConfig,
}

impl SyncEngine {
    /// Creates an engine; the checkpoint store is derived from
    /// `config.state_file`.
    pub fn new(source: Arc<dyn Source>, config: SyncConfig) -> Self {
        let store = CheckpointStore::new(config.state_file.clone());
        Self {
            source,
            store,
            config,
        }
    }

    /// The engine's tunables.
    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Syncs one book against the in-memory checkpoint map.
    ///
    /// Fetches the fresh index, plans the delta, downloads it with
    /// bounded parallelism, merges onto prior content, writes the
    /// document atomically, and advances the checkpoint to the index
    /// total (failed chapters included: they render as placeholders
    /// and are not retried on later runs).
    ///
    /// # Errors
    ///
    /// Only book-fatal conditions: missing `book_path`, index fetch
    /// failure, an empty chapter index, or a document write failure.
    pub async fn sync_book(&self, book: &Book, state: &mut CheckpointMap) -> Result<BookReport> {
        if book.book_path.is_empty() {
            return Err(crate::Error::Other(format!(
                "no book_path configured for 《{}》",
                book.name
            )));
        }

        let index = self.source.fetch_index(&book.book_path).await?;
        let total = index.chapters.len();
        if total == 0 {
            return Err(crate::Error::not_found(format!(
                "no chapters listed for {}",
                book.book_path
            )));
        }

        // Index metadata wins; config values are the fallback.
        let name = if index.title.is_empty() {
            book.name.clone()
        } else {
            index.title.clone()
        };
        let author = if index.author.is_empty() {
            book.author.clone()
        } else {
            index.author.clone()
        };

        let filename = format!(
            "{}-{}.txt",
            sanitize_filename(&name),
            sanitize_filename(&author)
        );
        let target_path = self.config.output_dir.join(&filename);

        let checkpoint = state.get(&book.book_path).cloned();
        let prior_file_exists = checkpoint
            .as_ref()
            .map(|cp| cp.content_file.exists())
            .unwrap_or(false);

        match plan_sync(total, checkpoint.as_ref(), prior_file_exists) {
            SyncPlan::UpToDate => {
                let prior = checkpoint.expect("up-to-date plan requires a checkpoint");
                tracing::info!(book = %name, chapters = total, "no new chapters");
                let file_size = self
                    .reuse_prior_document(&prior.content_file, &target_path)
                    .await?;

                Ok(BookReport {
                    name,
                    author,
                    success: true,
                    filename: Some(filename),
                    file_size: Some(file_size),
                    new_chapters: 0,
                    total_chapters: total,
                    fail_count: 0,
                    reason: None,
                })
            }
            SyncPlan::Fetch { start, fresh } => {
                // Load prior content for an append; an unreadable prior
                // file degrades to a full refetch instead of failing.
                let (start, existing) = if fresh {
                    (start, String::new())
                } else {
                    let prior = checkpoint.as_ref().expect("append plan requires a checkpoint");
                    match tokio::fs::read_to_string(&prior.content_file).await {
                        Ok(content) => (start, content),
                        Err(e) => {
                            tracing::warn!(
                                book = %name,
                                error = %e,
                                "prior content unreadable, refetching from scratch"
                            );
                            (0, String::new())
                        }
                    }
                };

                let delta: Vec<_> = index.chapters[start..].to_vec();
                let new_chapters = delta.len();
                tracing::info!(
                    book = %name,
                    total,
                    new = new_chapters,
                    from = start + 1,
                    workers = self.config.max_workers.min(new_chapters),
                    "fetching new chapters"
                );

                let fetcher = Arc::new(ChapterFetcher::new(Arc::clone(&self.source), &self.config));
                let results = fetch_delta(fetcher, delta, self.config.max_workers).await;
                let fail_count = results.iter().filter(|r| !r.ok).count();

                let document = assemble::assemble(&existing, &results, &name, &author);
                let file_size = assemble::write_document(&target_path, &document).await?;
                tracing::info!(
                    book = %name,
                    file = %target_path.display(),
                    bytes = file_size,
                    failed = fail_count,
                    "document written"
                );

                state.insert(
                    book.book_path.clone(),
                    Checkpoint {
                        name: name.clone(),
                        author: author.clone(),
                        chapter_count: total,
                        content_file: target_path,
                        updated_at: Utc::now(),
                    },
                );

                Ok(BookReport {
                    name,
                    author,
                    success: true,
                    filename: Some(filename),
                    file_size: Some(file_size),
                    new_chapters,
                    total_chapters: total,
                    fail_count,
                    reason: None,
                })
            }
        }
    }

    /// Copies the prior document to the run's output location unchanged.
    async fn reuse_prior_document(&self, prior: &Path, target: &Path) -> Result<u64> {
        if prior != target {
            if let Some(parent) = target.parent()
                && !parent.as_os_str().is_empty()
            {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::copy(prior, target).await?;
        }
        Ok(tokio::fs::metadata(target).await?.len())
    }

    /// Runs a full sync over all configured books.
    ///
    /// Loads the checkpoint state once, processes books sequentially
    /// (continuing past per-book failures), and saves the state once at
    /// the end.
    pub async fn run(&self, books: &[Book]) -> RunSummary {
        let mut state = self.store.load().await;
        let mut reports = Vec::with_capacity(books.len());

        for book in books {
            match self.sync_book(book, &mut state).await {
                Ok(report) => reports.push(report),
                Err(e) => {
                    tracing::warn!(book = %book.name, error = %e, "book sync failed");
                    reports.push(BookReport::failure(&book.name, &book.author, e.to_string()));
                }
            }
        }

        if let Err(e) = self.store.save(&state).await {
            tracing::warn!(error = %e, "failed to save state file");
        }

        RunSummary { reports }
    }
}

/// Aggregate outcome of one run across all books.
#[derive(Debug, Clone)]
pub struct RunSummary {
    /// Per-book reports in processing order
    pub reports: Vec<BookReport>,
}

impl RunSummary {
    /// Number of books that synced (partial chapter failures included).
    pub fn succeeded(&self) -> usize {
        self.reports.iter().filter(|r| r.success).count()
    }

    /// Number of books processed.
    pub fn total(&self) -> usize {
        self.reports.len()
    }

    /// `true` when at least one book synced; drives the exit code.
    pub fn any_success(&self) -> bool {
        self.succeeded() > 0
    }

    /// Emits `key=value` summary lines for automation consumers.
    ///
    /// Written lines: `total_books` (successes), `total_novels`
    /// (processed), `details` (JSON array of reports), and `filenames`
    /// (comma-separated output files) when any book succeeded.
    pub fn write_automation_output<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        writeln!(writer, "total_books={}", self.succeeded())?;
        writeln!(writer, "total_novels={}", self.total())?;

        let details =
            serde_json::to_string(&self.reports).map_err(std::io::Error::other)?;
        writeln!(writer, "details={details}")?;

        let filenames: Vec<_> = self
            .reports
            .iter()
            .filter(|r| r.success)
            .filter_map(|r| r.filename.as_deref())
            .collect();
        if !filenames.is_empty() {
            writeln!(writer, "filenames={}", filenames.join(","))?;
        }

        Ok(())
    }
}

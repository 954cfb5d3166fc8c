//! # novelsync - Incremental novel chapter-sync library
//!
//! novelsync keeps local plain-text copies of web novels up to date. It
//! fetches a book's chapter index, diffs it against a durable checkpoint
//! from the previous run, downloads only the new chapters with bounded
//! parallelism, and merges them onto the existing document, tolerating
//! partial failures of individual chapters without corrupting either the
//! document or the checkpoint.
//!
//! ## Features
//!
//! - **Incremental sync**: a checkpoint file records per-book progress so
//!   repeated runs fetch only newly published chapters
//! - **Bounded parallelism**: each book's delta downloads through a
//!   semaphore-scoped task group with strict output ordering
//! - **Failure containment**: a chapter that fails all retries becomes an
//!   explicit placeholder block; one bad chapter never aborts a book, one
//!   bad book never aborts the run
//! - **Polite fetching**: jittered request pacing, rotating user agents,
//!   randomized retry backoff, per-request timeouts
//! - **Pluggable sources**: site adapters implement a small [`Source`]
//!   trait; everything above it is site-agnostic
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use novelsync::prelude::*;
//! use novelsync::sources::BiquguSource;
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> novelsync::Result<()> {
//!     let config = NovelConfig::load("novels.json").await?;
//!     let source = Arc::new(BiquguSource::new().with_config(&config.settings));
//!     let engine = SyncEngine::new(source, config.settings.clone());
//!
//!     let summary = engine.run(&config.novels).await;
//!     println!("{}/{} books synced", summary.succeeded(), summary.total());
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`source`]: adapter trait for site-specific fetching and parsing
//! - [`plan`]: delta computation from index total vs checkpoint
//! - [`fetch`]: retrying chapter fetcher + bounded concurrent orchestrator
//! - [`assemble`]: chapter rendering and atomic document writes
//! - [`checkpoint`]: durable per-book progress records
//! - [`sync`]: the engine tying the pipeline together
//! - [`net`]: HTTP client with pacing, retries, and HTML helpers

pub mod assemble;
pub mod checkpoint;
pub mod config;
pub mod error;
pub mod fetch;
pub mod glyph;
pub mod net;
pub mod plan;
pub mod source;
pub mod sources;
pub mod sync;
pub mod text;
pub mod types;

/// Prelude module for convenient imports.
///
/// # Example
///
/// ```rust
/// use novelsync::prelude::*;
///
/// // Now you have access to:
/// // - SyncEngine, RunSummary
/// // - Source, BookIndex
/// // - Book, ChapterRef, ChapterResult, BookReport
/// // - SyncConfig, NovelConfig, CheckpointStore, Checkpoint
/// ```
pub mod prelude {
    pub use crate::{
        checkpoint::{Checkpoint, CheckpointMap, CheckpointStore},
        config::{NovelConfig, SyncConfig, SyncConfigBuilder},
        source::{BookIndex, Source},
        sync::{RunSummary, SyncEngine},
        text::sanitize_filename,
        types::{Book, BookReport, ChapterRef, ChapterResult},
    };
}

// Re-export main types at crate root for direct access
pub use checkpoint::{Checkpoint, CheckpointMap, CheckpointStore};
pub use config::{NovelConfig, SyncConfig};
pub use error::{Error, Result};
pub use source::{BookIndex, Source};
pub use sync::{RunSummary, SyncEngine};
pub use types::{Book, BookReport, ChapterRef, ChapterResult};

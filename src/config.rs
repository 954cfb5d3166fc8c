//! Configuration: sync tunables and the novels list file.
//!
//! [`SyncConfig`] holds every knob the engine honors; all fields have
//! defaults so both the builder and a partially filled config file work.
//! [`NovelConfig`] is the on-disk shape of `novels.json`: the list of
//! books to sync plus an optional `settings` block of tunables.
//!
//! # Examples
//!
//! ```rust
//! use novelsync::config::SyncConfigBuilder;
//!
//! let config = SyncConfigBuilder::default()
//!     .max_workers(4usize)
//!     .max_retries(2u32)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(config.max_workers, 4);
//! assert_eq!(config.min_content_len, 50);
//! ```

use derive_builder::Builder;
use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::{error::Result, types::Book};

fn default_max_workers() -> usize {
    8
}
fn default_max_retries() -> u32 {
    3
}
fn default_request_timeout_secs() -> u64 {
    15
}
fn default_chapter_delay_min_ms() -> u64 {
    50
}
fn default_chapter_delay_max_ms() -> u64 {
    200
}
fn default_min_content_len() -> usize {
    50
}
fn default_output_dir() -> PathBuf {
    PathBuf::from("output")
}
fn default_state_file() -> PathBuf {
    PathBuf::from("state.json")
}

/// Tunables for a sync run.
///
/// * `max_workers` - concurrency bound per book's delta (actual worker
///   count is `min(max_workers, delta_len)`)
/// * `max_retries` - attempts per chapter request
/// * `request_timeout_secs` - per-attempt HTTP timeout
/// * `chapter_delay_min_ms` / `chapter_delay_max_ms` - randomized pacing
///   jitter between requests
/// * `min_content_len` - cleaned-text length a chapter must exceed to
///   count as successfully fetched
/// * `output_dir` - where per-book documents are written
/// * `state_file` - checkpoint file path
#[derive(Debug, Clone, Builder, Deserialize)]
#[builder(setter(into))]
#[serde(default)]
pub struct SyncConfig {
    #[serde(default = "default_max_workers")]
    #[builder(default = "default_max_workers()")]
    pub max_workers: usize,

    #[serde(default = "default_max_retries")]
    #[builder(default = "default_max_retries()")]
    pub max_retries: u32,

    #[serde(default = "default_request_timeout_secs")]
    #[builder(default = "default_request_timeout_secs()")]
    pub request_timeout_secs: u64,

    #[serde(default = "default_chapter_delay_min_ms")]
    #[builder(default = "default_chapter_delay_min_ms()")]
    pub chapter_delay_min_ms: u64,

    #[serde(default = "default_chapter_delay_max_ms")]
    #[builder(default = "default_chapter_delay_max_ms()")]
    pub chapter_delay_max_ms: u64,

    #[serde(default = "default_min_content_len")]
    #[builder(default = "default_min_content_len()")]
    pub min_content_len: usize,

    #[serde(default = "default_output_dir")]
    #[builder(default = "default_output_dir()")]
    pub output_dir: PathBuf,

    #[serde(default = "default_state_file")]
    #[builder(default = "default_state_file()")]
    pub state_file: PathBuf,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            max_retries: default_max_retries(),
            request_timeout_secs: default_request_timeout_secs(),
            chapter_delay_min_ms: default_chapter_delay_min_ms(),
            chapter_delay_max_ms: default_chapter_delay_max_ms(),
            min_content_len: default_min_content_len(),
            output_dir: default_output_dir(),
            state_file: default_state_file(),
        }
    }
}

/// The `novels.json` config file: books to sync plus optional tunables.
#[derive(Debug, Clone, Deserialize)]
pub struct NovelConfig {
    /// Books to process, in order
    pub novels: Vec<Book>,

    /// Tunables; missing fields fall back to defaults
    #[serde(default)]
    pub settings: SyncConfig,
}

impl NovelConfig {
    /// Loads and parses a config file.
    ///
    /// # Errors
    ///
    /// * [`Error::Io`](crate::Error::Io) - file missing or unreadable
    /// * [`Error::Json`](crate::Error::Json) - malformed JSON
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let raw = tokio::fs::read_to_string(path.as_ref()).await?;
        Ok(serde_json::from_str(&raw)?)
    }
}

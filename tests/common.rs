//! Common test utilities: a scriptable in-memory source.
//!
//! Shared across the integration test modules. The mock source serves a
//! single book at `/book/`, with per-chapter behavior (content, error,
//! panic) and injectable latency so completion order can be forced to
//! differ from index order.

use async_trait::async_trait;
use novelsync::config::{SyncConfig, SyncConfigBuilder};
use novelsync::error::Result;
use novelsync::prelude::*;
use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

/// Path the mock source serves; any other path fails the index fetch.
#[allow(dead_code)]
pub const BOOK_PATH: &str = "/book/";

/// What a scripted chapter does when fetched.
#[derive(Clone)]
#[allow(dead_code)]
pub enum Behavior {
    /// Return this text
    Content(String),
    /// Fail the fetch with an error
    Error,
    /// Panic inside the fetch task
    Panic,
}

/// One scripted chapter.
#[derive(Clone)]
pub struct MockChapter {
    pub title: String,
    pub behavior: Behavior,
    pub latency: Duration,
}

#[allow(dead_code)]
impl MockChapter {
    pub fn ok(title: &str, text: &str) -> Self {
        Self {
            title: title.to_string(),
            behavior: Behavior::Content(text.to_string()),
            latency: Duration::ZERO,
        }
    }

    pub fn failing(title: &str) -> Self {
        Self {
            title: title.to_string(),
            behavior: Behavior::Error,
            latency: Duration::ZERO,
        }
    }

    pub fn panicking(title: &str) -> Self {
        Self {
            title: title.to_string(),
            behavior: Behavior::Panic,
            latency: Duration::ZERO,
        }
    }

    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }
}

/// Scriptable source serving one book; counts chapter fetches.
pub struct MockSource {
    pub title: String,
    pub author: String,
    pub chapters: Mutex<Vec<MockChapter>>,
    pub chapter_fetches: AtomicUsize,
}

#[allow(dead_code)]
impl MockSource {
    pub fn new(chapters: Vec<MockChapter>) -> Self {
        Self {
            title: "测试小说".to_string(),
            author: "测试者".to_string(),
            chapters: Mutex::new(chapters),
            chapter_fetches: AtomicUsize::new(0),
        }
    }

    /// Appends chapters, simulating new remote publications.
    pub fn publish(&self, more: Vec<MockChapter>) {
        self.chapters.lock().unwrap().extend(more);
    }

    pub fn fetches(&self) -> usize {
        self.chapter_fetches.load(Ordering::SeqCst)
    }

    pub fn reset_fetches(&self) {
        self.chapter_fetches.store(0, Ordering::SeqCst);
    }
}

#[async_trait]
impl Source for MockSource {
    fn id(&self) -> &'static str {
        "mock"
    }

    fn name(&self) -> &'static str {
        "Mock"
    }

    fn base_url(&self) -> &str {
        "http://mock.invalid"
    }

    async fn fetch_index(&self, book_path: &str) -> Result<BookIndex> {
        if book_path != BOOK_PATH {
            return Err(novelsync::Error::not_found(format!(
                "unknown book {book_path}"
            )));
        }

        let chapters = self
            .chapters
            .lock()
            .unwrap()
            .iter()
            .enumerate()
            .map(|(index, ch)| ChapterRef {
                index,
                title: ch.title.clone(),
                locator: format!("/ch/{index}"),
            })
            .collect();

        Ok(BookIndex {
            title: self.title.clone(),
            author: self.author.clone(),
            chapters,
        })
    }

    async fn fetch_chapter(&self, locator: &str) -> Result<String> {
        self.chapter_fetches.fetch_add(1, Ordering::SeqCst);

        let index: usize = locator
            .trim_start_matches("/ch/")
            .parse()
            .map_err(|_| novelsync::Error::parse(format!("bad locator {locator}")))?;

        let (behavior, latency) = {
            let chapters = self.chapters.lock().unwrap();
            let chapter = chapters
                .get(index)
                .ok_or_else(|| novelsync::Error::not_found(format!("chapter {index}")))?;
            (chapter.behavior.clone(), chapter.latency)
        };

        if latency > Duration::ZERO {
            tokio::time::sleep(latency).await;
        }

        match behavior {
            Behavior::Content(text) => Ok(text),
            Behavior::Error => Err(novelsync::Error::source("mock", "injected failure")),
            Behavior::Panic => panic!("injected panic in chapter fetch"),
        }
    }
}

/// Chapter body long enough to pass the test threshold, stable under
/// content cleaning (single CJK line, no whitespace).
#[allow(dead_code)]
pub fn body(tag: &str) -> String {
    format!("{tag}{}", "文".repeat(20))
}

/// Engine tunables pointed at a temp directory.
#[allow(dead_code)]
pub fn test_config(dir: &Path) -> SyncConfig {
    SyncConfigBuilder::default()
        .max_workers(4usize)
        .min_content_len(5usize)
        .chapter_delay_min_ms(0u64)
        .chapter_delay_max_ms(0u64)
        .output_dir(dir.join("output"))
        .state_file(dir.join("state.json"))
        .build()
        .unwrap()
}

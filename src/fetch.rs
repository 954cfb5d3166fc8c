//! Chapter fetching: retry policy, content gating, and the bounded
//! concurrent orchestrator.
//!
//! [`ChapterFetcher`] turns one [`ChapterRef`] into one
//! [`ChapterResult`], absorbing every failure mode below chapter
//! granularity: transport errors after retries, parse misses, and
//! boilerplate-only pages all become failed results, never errors.
//!
//! [`fetch_delta`] runs a whole delta with bounded parallelism while
//! guaranteeing slot-based ordering: the output vector's positions match
//! the input delta exactly, no matter in which order tasks complete. A
//! panicking task only poisons its own slot.

use futures::future;
use std::sync::Arc;
use tokio::sync::Semaphore;

use crate::{
    config::SyncConfig,
    source::Source,
    text,
    types::{ChapterRef, ChapterResult},
};

/// Fetches single chapters with retries and a minimum-content gate.
///
/// Retry and backoff happen inside the source's HTTP client; the fetcher
/// adds the normalization pipeline (glyph decode, boilerplate cleaning)
/// and the success criterion. HTTP 200 pages that carry only error
/// boilerplate are indistinguishable at transport level, so success is
/// defined as cleaned text longer than `min_content_len`.
pub struct ChapterFetcher {
    source: Arc<dyn Source>,
    min_content_len: usize,
}

impl ChapterFetcher {
    /// Creates a fetcher over the given source.
    pub fn new(source: Arc<dyn Source>, config: &SyncConfig) -> Self {
        Self {
            source,
            min_content_len: config.min_content_len,
        }
    }

    /// Fetches one chapter; infallible by design.
    ///
    /// On any failure the returned result has `ok == false` and empty
    /// text. The caller records the failure and continues.
    pub async fn fetch(&self, chapter: &ChapterRef) -> ChapterResult {
        let raw = match self.source.fetch_chapter(&chapter.locator).await {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(
                    index = chapter.index,
                    title = %chapter.title,
                    error = %e,
                    "chapter fetch failed"
                );
                return ChapterResult::failed(chapter.index, chapter.title.clone());
            }
        };

        let decoded = match self.source.glyph_map() {
            Some(map) => map.decode(&raw),
            None => raw,
        };
        let cleaned = text::clean_content(&decoded);

        if cleaned.chars().count() > self.min_content_len {
            ChapterResult::success(chapter.index, chapter.title.clone(), cleaned)
        } else {
            tracing::warn!(
                index = chapter.index,
                title = %chapter.title,
                len = cleaned.chars().count(),
                "chapter content below minimum length"
            );
            ChapterResult::failed(chapter.index, chapter.title.clone())
        }
    }
}

/// Fetches a delta with bounded parallelism, preserving input order.
///
/// Concurrency is `min(max_workers, delta.len())`, enforced with a
/// semaphore; the task group is scoped to this one call and torn down
/// when it returns. Each chapter gets its own spawned task and its own
/// pre-assigned output slot (the join handle's position), so completion
/// order cannot disturb the result sequence. A task that panics is
/// converted into a failed result for its slot; sibling tasks and the
/// batch are unaffected.
pub async fn fetch_delta(
    fetcher: Arc<ChapterFetcher>,
    delta: Vec<ChapterRef>,
    max_workers: usize,
) -> Vec<ChapterResult> {
    if delta.is_empty() {
        return Vec::new();
    }

    let workers = max_workers.clamp(1, delta.len());
    let semaphore = Arc::new(Semaphore::new(workers));

    // Keep (index, title) aside so a panicked task can still fill its slot.
    let slots: Vec<(usize, String)> = delta
        .iter()
        .map(|c| (c.index, c.title.clone()))
        .collect();

    let handles: Vec<_> = delta
        .into_iter()
        .map(|chapter| {
            let fetcher = Arc::clone(&fetcher);
            let semaphore = Arc::clone(&semaphore);
            tokio::spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("semaphore closed while fetching");
                fetcher.fetch(&chapter).await
            })
        })
        .collect();

    let settled = future::join_all(handles).await;

    slots
        .into_iter()
        .zip(settled)
        .map(|((index, title), joined)| match joined {
            Ok(result) => result,
            Err(e) => {
                tracing::warn!(index, error = %e, "chapter task aborted");
                ChapterResult::failed(index, title)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Result;
    use crate::source::{BookIndex, Source};
    use async_trait::async_trait;

    /// Source whose chapters are canned strings keyed by locator.
    struct CannedSource;

    #[async_trait]
    impl Source for CannedSource {
        fn id(&self) -> &'static str {
            "canned"
        }
        fn name(&self) -> &'static str {
            "Canned"
        }
        fn base_url(&self) -> &str {
            "http://localhost"
        }

        async fn fetch_index(&self, _book_path: &str) -> Result<BookIndex> {
            unimplemented!("not used in fetcher tests")
        }

        async fn fetch_chapter(&self, locator: &str) -> Result<String> {
            match locator {
                "/long" => Ok("很".repeat(80)),
                "/short" => Ok("太短".to_string()),
                "/err" => Err(crate::Error::parse("no content block")),
                _ => Ok(String::new()),
            }
        }
    }

    fn fetcher() -> Arc<ChapterFetcher> {
        let config = SyncConfig::default();
        Arc::new(ChapterFetcher::new(Arc::new(CannedSource), &config))
    }

    fn chapter(index: usize, locator: &str) -> ChapterRef {
        ChapterRef {
            index,
            title: format!("第{}章", index + 1),
            locator: locator.to_string(),
        }
    }

    #[tokio::test]
    async fn long_content_succeeds() {
        let result = fetcher().fetch(&chapter(0, "/long")).await;
        assert!(result.ok);
        assert_eq!(result.text.chars().count(), 80);
    }

    #[tokio::test]
    async fn short_content_is_marked_failed() {
        let result = fetcher().fetch(&chapter(0, "/short")).await;
        assert!(!result.ok);
        assert!(result.text.is_empty());
    }

    #[tokio::test]
    async fn source_error_is_absorbed() {
        let result = fetcher().fetch(&chapter(2, "/err")).await;
        assert!(!result.ok);
        assert_eq!(result.index, 2);
    }

    #[tokio::test]
    async fn fetch_delta_preserves_input_order() {
        let delta: Vec<_> = (0..6)
            .map(|i| chapter(i, if i == 3 { "/err" } else { "/long" }))
            .collect();
        let results = fetch_delta(fetcher(), delta, 4).await;

        assert_eq!(results.len(), 6);
        for (slot, result) in results.iter().enumerate() {
            assert_eq!(result.index, slot);
        }
        assert!(!results[3].ok);
        assert!(results.iter().enumerate().all(|(i, r)| r.ok || i == 3));
    }

    #[tokio::test]
    async fn empty_delta_yields_empty_results() {
        let results = fetch_delta(fetcher(), Vec::new(), 8).await;
        assert!(results.is_empty());
    }
}

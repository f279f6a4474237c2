//! Memoized, concurrency-bounded changed-file retrieval.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use futures::stream::{self, StreamExt, TryStreamExt};
use tokio::sync::{OnceCell, Semaphore};
use tracing::debug;

use crate::commits::source::CommitFileSource;
use crate::error::FetchError;
use crate::git::{short_hash, AnnotatedCommit, Commit};
use crate::utils::settings::get_env_var;

/// Retrievals allowed in flight when nothing else is configured.
pub const DEFAULT_MAX_CONCURRENCY: usize = 500;

/// Environment variable overriding the in-flight retrieval limit.
pub const MAX_CONCURRENCY_ENV: &str = "SRM_MAX_THREADS";

/// Tuning for [`CommitFileFetcher`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetcherConfig {
    /// Maximum number of retrievals in flight at once.
    pub max_concurrency: usize,
}

impl Default for FetcherConfig {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
        }
    }
}

impl FetcherConfig {
    /// Reads the limit from `SRM_MAX_THREADS` (environment, then settings file).
    pub fn from_env() -> Self {
        Self::from_setting(get_env_var(MAX_CONCURRENCY_ENV).ok().as_deref())
    }

    /// Parses a limit setting; missing, non-numeric and zero values fall back
    /// to [`DEFAULT_MAX_CONCURRENCY`].
    pub fn from_setting(value: Option<&str>) -> Self {
        let max_concurrency = value
            .and_then(|v| v.trim().parse::<usize>().ok())
            .filter(|&n| n > 0)
            .unwrap_or(DEFAULT_MAX_CONCURRENCY);

        Self { max_concurrency }
    }

    /// Returns a copy with a different limit.
    pub fn with_max_concurrency(mut self, max_concurrency: usize) -> Self {
        self.max_concurrency = max_concurrency;
        self
    }
}

/// Memoized changed-file lists keyed by the raw commit hash.
///
/// Entries are only ever added; the cache lives as long as the fetcher and
/// grows with the number of distinct commits seen in one run.
type FileChangeCache = HashMap<String, Arc<OnceCell<Arc<[String]>>>>;

/// Annotates commits with the files they changed.
///
/// Each distinct hash is retrieved at most once per fetcher, even when
/// requested concurrently. At most `max_concurrency` retrievals run at once.
/// Within a batch, commits are started strictly in input order as slots
/// free up; the semaphore bounds retrievals across concurrent batches.
pub struct CommitFileFetcher<S> {
    source: S,
    max_concurrency: usize,
    semaphore: Semaphore,
    cache: Mutex<FileChangeCache>,
}

impl<S: CommitFileSource> CommitFileFetcher<S> {
    /// Creates a fetcher over `source`. A limit of zero is treated as one.
    pub fn new(source: S, config: FetcherConfig) -> Self {
        let permits = config.max_concurrency.clamp(1, Semaphore::MAX_PERMITS);

        Self {
            source,
            max_concurrency: permits,
            semaphore: Semaphore::new(permits),
            cache: Mutex::new(HashMap::new()),
        }
    }

    /// Number of hashes with a cached file list.
    pub fn cached_len(&self) -> usize {
        self.lock_cache()
            .values()
            .filter(|cell| cell.initialized())
            .count()
    }

    fn lock_cache(&self) -> std::sync::MutexGuard<'_, FileChangeCache> {
        self.cache.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Returns the files changed by `hash`, retrieving them on first use.
    ///
    /// Failures are not cached; a later call retries the retrieval.
    pub async fn files_for_commit(&self, hash: &str) -> Result<Arc<[String]>, FetchError> {
        let cell = self.lock_cache().entry(hash.to_string()).or_default().clone();

        if let Some(files) = cell.get() {
            debug!(hash = short_hash(hash), "Using cached file list");
            return Ok(files.clone());
        }

        cell.get_or_try_init(|| async {
            let _permit =
                self.semaphore
                    .acquire()
                    .await
                    .map_err(|e| FetchError::TaskFailed {
                        hash: hash.to_string(),
                        reason: e.to_string(),
                    })?;

            let files = self.source.commit_files(hash).await?;
            debug!(
                hash = short_hash(hash),
                files = files.len(),
                "Retrieved changed files"
            );
            Ok::<_, FetchError>(Arc::from(files))
        })
        .await
        .cloned()
    }

    /// Annotates every commit with its changed files, in input order.
    ///
    /// The first retrieval failure aborts the whole batch.
    pub async fn with_files(
        &self,
        commits: Vec<Commit>,
    ) -> Result<Vec<AnnotatedCommit>, FetchError> {
        stream::iter(commits)
            .map(|commit| async move {
                let files = self.files_for_commit(&commit.hash).await?;
                Ok::<_, FetchError>(commit.with_files(files.to_vec()))
            })
            .buffered(self.max_concurrency)
            .try_collect()
            .await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::commits::test_utils::MockCommitFileSource;

    fn commits(hashes: &[&str]) -> Vec<Commit> {
        hashes
            .iter()
            .map(|h| Commit::new(*h, format!("commit {h}")))
            .collect()
    }

    #[test]
    fn config_defaults_to_500() {
        assert_eq!(FetcherConfig::default().max_concurrency, 500);
        assert_eq!(FetcherConfig::from_setting(None).max_concurrency, 500);
    }

    #[test]
    fn config_parses_setting() {
        assert_eq!(FetcherConfig::from_setting(Some("8")).max_concurrency, 8);
        assert_eq!(FetcherConfig::from_setting(Some(" 16 ")).max_concurrency, 16);
    }

    #[test]
    fn config_ignores_invalid_setting() {
        assert_eq!(FetcherConfig::from_setting(Some("0")).max_concurrency, 500);
        assert_eq!(FetcherConfig::from_setting(Some("lots")).max_concurrency, 500);
        assert_eq!(FetcherConfig::from_setting(Some("-3")).max_concurrency, 500);
    }

    #[tokio::test]
    async fn files_for_commit_is_memoized() {
        let source = MockCommitFileSource::new().with_files("h1", &["a/x.js"]);
        let calls = source.call_handle();
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        let first = fetcher.files_for_commit("h1").await.unwrap();
        let second = fetcher.files_for_commit("h1").await.unwrap();

        assert_eq!(&*first, ["a/x.js".to_string()]);
        assert_eq!(first, second);
        assert_eq!(calls.calls_for("h1"), 1);
        assert_eq!(fetcher.cached_len(), 1);
    }

    #[tokio::test]
    async fn duplicate_hashes_in_one_batch_fetch_once() {
        let source = MockCommitFileSource::new()
            .with_files("h1", &["a/x.js"])
            .with_files("h2", &["b/y.js"])
            .with_delay("h1", Duration::from_millis(20));
        let calls = source.call_handle();
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        let annotated = fetcher
            .with_files(commits(&["h1", "h2", "h1"]))
            .await
            .unwrap();

        assert_eq!(annotated.len(), 3);
        assert_eq!(annotated[0].files, annotated[2].files);
        assert_eq!(calls.calls_for("h1"), 1);
        assert_eq!(calls.calls_for("h2"), 1);
    }

    #[tokio::test]
    async fn with_files_preserves_input_order() {
        let source = MockCommitFileSource::new()
            .with_files("c1", &["one.js"])
            .with_files("c2", &["two.js"])
            .with_files("c3", &["three.js"])
            .with_delay("c1", Duration::from_millis(60))
            .with_delay("c2", Duration::from_millis(30));
        let calls = source.call_handle();
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        let annotated = fetcher
            .with_files(commits(&["c1", "c2", "c3"]))
            .await
            .unwrap();

        let hashes: Vec<_> = annotated.iter().map(AnnotatedCommit::hash).collect();
        assert_eq!(hashes, vec!["c1", "c2", "c3"]);
        assert_eq!(annotated[2].files, vec!["three.js".to_string()]);
        assert_eq!(calls.completion_order(), vec!["c3", "c2", "c1"]);
    }

    #[tokio::test]
    async fn limit_of_one_never_overlaps() {
        let hashes = ["a", "b", "c", "d", "e"];
        let mut source = MockCommitFileSource::new();
        for h in hashes {
            source = source
                .with_files(h, &["file.js"])
                .with_delay(h, Duration::from_millis(5));
        }
        let calls = source.call_handle();
        let fetcher =
            CommitFileFetcher::new(source, FetcherConfig::default().with_max_concurrency(1));

        fetcher.with_files(commits(&hashes)).await.unwrap();

        assert_eq!(calls.max_in_flight(), 1);
        assert_eq!(calls.call_order(), vec!["a", "b", "c", "d", "e"]);
    }

    #[tokio::test]
    async fn large_batch_is_admitted_in_input_order() {
        let hashes: Vec<String> = (0..200).map(|i| format!("h{i:03}")).collect();
        let mut source = MockCommitFileSource::new();
        for h in &hashes {
            source = source
                .with_files(h, &["file.js"])
                .with_delay(h, Duration::from_millis(1));
        }
        let calls = source.call_handle();
        let fetcher =
            CommitFileFetcher::new(source, FetcherConfig::default().with_max_concurrency(1));

        let refs: Vec<&str> = hashes.iter().map(String::as_str).collect();
        let annotated = fetcher.with_files(commits(&refs)).await.unwrap();

        let got: Vec<_> = annotated.iter().map(AnnotatedCommit::hash).collect();
        assert_eq!(got, refs);
        assert_eq!(calls.max_in_flight(), 1);
        assert_eq!(calls.call_order(), hashes);
    }

    #[tokio::test]
    async fn limit_caps_in_flight_retrievals() {
        let hashes = ["a", "b", "c", "d", "e", "f"];
        let mut source = MockCommitFileSource::new();
        for h in hashes {
            source = source
                .with_files(h, &["file.js"])
                .with_delay(h, Duration::from_millis(10));
        }
        let calls = source.call_handle();
        let fetcher =
            CommitFileFetcher::new(source, FetcherConfig::default().with_max_concurrency(2));

        fetcher.with_files(commits(&hashes)).await.unwrap();

        assert!(calls.max_in_flight() <= 2);
        assert_eq!(calls.total_calls(), 6);
    }

    #[tokio::test]
    async fn zero_limit_still_makes_progress() {
        let source = MockCommitFileSource::new().with_files("h1", &["x"]);
        let fetcher =
            CommitFileFetcher::new(source, FetcherConfig::default().with_max_concurrency(0));

        let annotated = fetcher.with_files(commits(&["h1"])).await.unwrap();
        assert_eq!(annotated[0].files, vec!["x".to_string()]);
    }

    #[tokio::test]
    async fn failure_aborts_the_batch() {
        let source = MockCommitFileSource::new()
            .with_files("good", &["a.js"])
            .with_failure("bad");
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        let err = fetcher
            .with_files(commits(&["good", "bad"]))
            .await
            .unwrap_err();
        assert_eq!(err.hash(), "bad");
    }

    #[tokio::test]
    async fn failures_are_not_cached() {
        let source = MockCommitFileSource::new().with_failure("bad");
        let calls = source.call_handle();
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        assert!(fetcher.files_for_commit("bad").await.is_err());
        assert!(fetcher.files_for_commit("bad").await.is_err());
        assert_eq!(calls.calls_for("bad"), 2);
        assert_eq!(fetcher.cached_len(), 0);
    }

    #[tokio::test]
    async fn hashes_are_not_normalized() {
        let source = MockCommitFileSource::new()
            .with_files("ABC", &["upper.js"])
            .with_files("abc", &["lower.js"]);
        let calls = source.call_handle();
        let fetcher = CommitFileFetcher::new(source, FetcherConfig::default());

        fetcher.files_for_commit("ABC").await.unwrap();
        fetcher.files_for_commit("abc").await.unwrap();
        assert_eq!(calls.total_calls(), 2);
    }
}

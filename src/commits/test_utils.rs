//! Shared test utilities for the `commits` module.

#![allow(clippy::unwrap_used)]

use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::commits::source::CommitFileSource;
use crate::error::FetchError;

#[derive(Default)]
struct CallLog {
    calls: Mutex<Vec<String>>,
    completions: Mutex<Vec<String>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
}

/// Mock file source with per-hash file lists, delays and failures.
///
/// Every retrieval is recorded so tests can inspect call counts, start
/// order, completion order and the peak number of overlapping retrievals
/// through a [`CallHandle`], even after the source has been moved into a
/// [`CommitFileFetcher`](super::CommitFileFetcher).
#[derive(Default)]
pub(crate) struct MockCommitFileSource {
    files: HashMap<String, Vec<String>>,
    delays: HashMap<String, Duration>,
    failures: Vec<String>,
    log: Arc<CallLog>,
}

impl MockCommitFileSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Registers the file list returned for `hash`.
    pub(crate) fn with_files(mut self, hash: &str, files: &[&str]) -> Self {
        self.files.insert(
            hash.to_string(),
            files.iter().map(ToString::to_string).collect(),
        );
        self
    }

    /// Makes retrieval of `hash` take `delay`.
    pub(crate) fn with_delay(mut self, hash: &str, delay: Duration) -> Self {
        self.delays.insert(hash.to_string(), delay);
        self
    }

    /// Makes retrieval of `hash` fail.
    pub(crate) fn with_failure(mut self, hash: &str) -> Self {
        self.failures.push(hash.to_string());
        self
    }

    pub(crate) fn call_handle(&self) -> CallHandle {
        CallHandle {
            log: self.log.clone(),
        }
    }
}

/// Shared handle to a mock source's call log.
pub(crate) struct CallHandle {
    log: Arc<CallLog>,
}

impl CallHandle {
    pub(crate) fn total_calls(&self) -> usize {
        self.log.calls.lock().unwrap().len()
    }

    pub(crate) fn calls_for(&self, hash: &str) -> usize {
        self.log
            .calls
            .lock()
            .unwrap()
            .iter()
            .filter(|h| h.as_str() == hash)
            .count()
    }

    /// Hashes in the order their retrieval started.
    pub(crate) fn call_order(&self) -> Vec<String> {
        self.log.calls.lock().unwrap().clone()
    }

    /// Hashes in the order their retrieval finished.
    pub(crate) fn completion_order(&self) -> Vec<String> {
        self.log.completions.lock().unwrap().clone()
    }

    pub(crate) fn max_in_flight(&self) -> usize {
        self.log.max_in_flight.load(Ordering::SeqCst)
    }
}

impl CommitFileSource for MockCommitFileSource {
    fn commit_files<'a>(
        &'a self,
        hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, FetchError>> + Send + 'a>> {
        Box::pin(async move {
            self.log.calls.lock().unwrap().push(hash.to_string());
            let now = self.log.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
            self.log.max_in_flight.fetch_max(now, Ordering::SeqCst);

            if let Some(delay) = self.delays.get(hash) {
                tokio::time::sleep(*delay).await;
            } else {
                tokio::task::yield_now().await;
            }

            self.log.in_flight.fetch_sub(1, Ordering::SeqCst);
            self.log.completions.lock().unwrap().push(hash.to_string());

            if self.failures.iter().any(|h| h == hash) {
                return Err(FetchError::TaskFailed {
                    hash: hash.to_string(),
                    reason: "mock failure".to_string(),
                });
            }

            Ok(self.files.get(hash).cloned().unwrap_or_default())
        })
    }
}

//! Commit attribution: changed-file retrieval and per-package filtering.

pub mod fetcher;
pub mod filter;
pub mod source;
#[cfg(test)]
pub(crate) mod test_utils;

pub use fetcher::{CommitFileFetcher, FetcherConfig, DEFAULT_MAX_CONCURRENCY, MAX_CONCURRENCY_ENV};
pub use filter::{attribute, filter_by_packages, Attribution};
pub use source::{CommitFileSource, GitCommitFileSource};

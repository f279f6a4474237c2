//! Retrieval of the files a commit changed.

use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;

use crate::error::FetchError;
use crate::git::GitRepository;

/// Source of per-commit changed-file lists.
///
/// Paths are relative to the repository root. Implementations should not
/// cache; [`CommitFileFetcher`](super::CommitFileFetcher) memoizes results.
pub trait CommitFileSource: Send + Sync {
    /// Returns the files changed by the commit named `hash`.
    fn commit_files<'a>(
        &'a self,
        hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, FetchError>> + Send + 'a>>;
}

/// Reads changed files from a local git repository.
///
/// Each retrieval opens the repository on the blocking thread pool, so many
/// retrievals can be in flight at once.
#[derive(Debug, Clone)]
pub struct GitCommitFileSource {
    repo_root: PathBuf,
}

impl GitCommitFileSource {
    /// Creates a source for the repository whose working tree is `repo_root`.
    pub fn new<P: Into<PathBuf>>(repo_root: P) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }
}

impl CommitFileSource for GitCommitFileSource {
    fn commit_files<'a>(
        &'a self,
        hash: &'a str,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, FetchError>> + Send + 'a>> {
        let repo_root = self.repo_root.clone();
        let owned_hash = hash.to_string();

        Box::pin(async move {
            tokio::task::spawn_blocking(move || {
                let repo =
                    GitRepository::open_at(&repo_root).map_err(|source| FetchError::Diff {
                        hash: owned_hash.clone(),
                        source,
                    })?;
                repo.commit_files(&owned_hash)
            })
            .await
            .map_err(|e| FetchError::TaskFailed {
                hash: hash.to_string(),
                reason: e.to_string(),
            })?
        })
    }
}

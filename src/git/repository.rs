//! Git repository operations

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use git2::{ErrorCode, Oid, Repository, Sort};

use crate::error::{FetchError, ResolutionError};
use crate::git::Commit;

/// Git repository wrapper
pub struct GitRepository {
    repo: Repository,
}

impl GitRepository {
    /// Open the repository containing `path`, searching parent directories
    pub fn discover<P: AsRef<Path>>(path: P) -> Result<Self, ResolutionError> {
        let path = path.as_ref();
        let repo =
            Repository::discover(path).map_err(|source| ResolutionError::RepositoryNotFound {
                path: path.to_path_buf(),
                source,
            })?;

        Ok(Self { repo })
    }

    /// Open the repository whose working tree root is exactly `path`
    pub fn open_at<P: AsRef<Path>>(path: P) -> Result<Self, git2::Error> {
        let repo = Repository::open(path)?;

        Ok(Self { repo })
    }

    /// Get the working tree root
    pub fn root(&self) -> Result<PathBuf, ResolutionError> {
        self.repo
            .workdir()
            .map(Path::to_path_buf)
            .ok_or_else(|| ResolutionError::BareRepository {
                path: self.repo.path().to_path_buf(),
            })
    }

    /// List the files changed by a commit, relative to the repository root.
    ///
    /// Merge commits report the union of their diffs against every parent and
    /// root commits diff against the empty tree. Each path appears once, in
    /// the order it was first seen.
    pub fn commit_files(&self, hash: &str) -> Result<Vec<String>, FetchError> {
        let object = self.repo.revparse_single(hash).map_err(|source| {
            // A well-formed object id that the repository does not contain
            if source.code() == ErrorCode::NotFound && Oid::from_str(hash).is_ok() {
                FetchError::CommitNotFound {
                    hash: hash.to_string(),
                    source,
                }
            } else {
                FetchError::InvalidHash {
                    hash: hash.to_string(),
                    source,
                }
            }
        })?;
        let commit = object
            .peel_to_commit()
            .map_err(|source| FetchError::CommitNotFound {
                hash: hash.to_string(),
                source,
            })?;

        let diff_err = |source: git2::Error| FetchError::Diff {
            hash: hash.to_string(),
            source,
        };

        let commit_tree = commit.tree().map_err(diff_err)?;
        let parent_trees = commit
            .parents()
            .map(|parent| parent.tree().map(Some))
            .collect::<Result<Vec<_>, _>>()
            .map_err(diff_err)?;
        let parent_trees = if parent_trees.is_empty() {
            vec![None]
        } else {
            parent_trees
        };

        let mut seen = HashSet::new();
        let mut files = Vec::new();

        for parent_tree in &parent_trees {
            let diff = self
                .repo
                .diff_tree_to_tree(parent_tree.as_ref(), Some(&commit_tree), None)
                .map_err(diff_err)?;

            for delta in diff.deltas() {
                let path = delta
                    .new_file()
                    .path()
                    .or_else(|| delta.old_file().path())
                    .and_then(Path::to_str);

                if let Some(path) = path {
                    if seen.insert(path.to_string()) {
                        files.push(path.to_string());
                    }
                }
            }
        }

        Ok(files)
    }

    /// List commits for a range, newest first (git log order).
    ///
    /// `A..B` walks from `B` excluding everything reachable from `A`; any other
    /// revision walks all of its ancestors. Merge commits are included.
    /// Symmetric ranges (`A...B`) are not supported.
    pub fn commits(&self, range: &str) -> Result<Vec<Commit>> {
        if range.contains("...") {
            bail!("Symmetric difference ranges are not supported: {range} (use A..B)");
        }

        let mut walker = self.repo.revwalk().context("Failed to create revwalk")?;
        walker
            .set_sorting(Sort::TOPOLOGICAL | Sort::TIME)
            .context("Failed to configure revwalk")?;

        if let Some((start_spec, end_spec)) = range.split_once("..") {
            let start_commit = self
                .repo
                .revparse_single(start_spec)
                .with_context(|| format!("Failed to parse start commit: {start_spec}"))?
                .peel_to_commit()
                .context("Failed to peel start object to commit")?;
            let end_commit = self
                .repo
                .revparse_single(end_spec)
                .with_context(|| format!("Failed to parse end commit: {end_spec}"))?
                .peel_to_commit()
                .context("Failed to peel end object to commit")?;

            walker
                .push(end_commit.id())
                .context("Failed to push end commit")?;
            walker
                .hide(start_commit.id())
                .context("Failed to hide start commit")?;
        } else {
            let commit = self
                .repo
                .revparse_single(range)
                .with_context(|| format!("Failed to parse commit: {range}"))?
                .peel_to_commit()
                .context("Failed to peel object to commit")?;
            walker.push(commit.id()).context("Failed to push commit")?;
        }

        let mut commits = Vec::new();
        for oid in walker {
            let oid = oid.context("Failed to get commit OID from walker")?;
            let commit = self
                .repo
                .find_commit(oid)
                .context("Failed to find commit")?;
            commits.push(Commit::from_git_commit(&commit)?);
        }

        Ok(commits)
    }
}

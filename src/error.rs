//! Error kinds surfaced by package resolution and commit file retrieval.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to locate the package, the repository, or linked packages.
#[derive(Error, Debug)]
pub enum ResolutionError {
    /// No `package.json` between the start directory and the filesystem root.
    #[error("No package.json found in {} or any parent directory", .start.display())]
    ManifestNotFound {
        /// Directory the upward search started from.
        start: PathBuf,
    },

    /// The working location is not inside a git working tree.
    #[error("No git repository found for {}", .path.display())]
    RepositoryNotFound {
        /// Path that was used for repository discovery.
        path: PathBuf,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },

    /// The repository has no working tree (bare repository).
    #[error("Git repository at {} has no working directory", .path.display())]
    BareRepository {
        /// Path of the git directory.
        path: PathBuf,
    },

    /// The package directory is not located under the repository root.
    #[error("Package directory {} is outside repository root {}", .package_dir.display(), .repo_root.display())]
    OutsideRepository {
        /// Directory containing the manifest.
        package_dir: PathBuf,
        /// Repository working tree root.
        repo_root: PathBuf,
    },

    /// The configured linked-dependency directory is missing or not listable.
    #[error("Failed to list linked packages directory {}", .dir.display())]
    LinkedDirUnreadable {
        /// Absolute directory that was listed.
        dir: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// The configured linked-dependency directory is absolute or climbs
    /// above the repository root.
    #[error("Linked packages directory {dir:?} must be relative to the repository root")]
    LinkedDirOutsideRepository {
        /// Directory as configured.
        dir: String,
    },

    /// A manifest exists but could not be read.
    #[error("Failed to read manifest {}", .path.display())]
    ManifestUnreadable {
        /// Manifest path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },

    /// A manifest could not be parsed as a package descriptor.
    #[error("Failed to parse manifest {}", .path.display())]
    ManifestInvalid {
        /// Manifest path.
        path: PathBuf,
        /// Underlying JSON error.
        #[source]
        source: serde_json::Error,
    },

    /// A path could not be canonicalized.
    #[error("Failed to resolve path {}", .path.display())]
    PathUnresolvable {
        /// Path that failed to canonicalize.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: io::Error,
    },
}

/// Failure to retrieve the changed files of one commit.
#[derive(Error, Debug)]
pub enum FetchError {
    /// The identifier is not a valid object id.
    #[error("Invalid commit hash '{hash}'")]
    InvalidHash {
        /// Raw identifier as supplied.
        hash: String,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },

    /// The object id does not name a commit in the repository.
    #[error("Commit {hash} not found")]
    CommitNotFound {
        /// Raw identifier as supplied.
        hash: String,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },

    /// Opening the repository or diffing trees failed.
    #[error("Failed to list files changed by commit {hash}")]
    Diff {
        /// Raw identifier as supplied.
        hash: String,
        /// Underlying git error.
        #[source]
        source: git2::Error,
    },

    /// The retrieval task panicked or was cancelled by the runtime.
    #[error("File retrieval task for commit {hash} failed: {reason}")]
    TaskFailed {
        /// Raw identifier as supplied.
        hash: String,
        /// Description of the task failure.
        reason: String,
    },
}

impl FetchError {
    /// Returns the commit hash the failure belongs to.
    pub fn hash(&self) -> &str {
        match self {
            Self::InvalidHash { hash, .. }
            | Self::CommitNotFound { hash, .. }
            | Self::Diff { hash, .. }
            | Self::TaskFailed { hash, .. } => hash,
        }
    }
}

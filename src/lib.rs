//! # monorepo-commits
//!
//! Attributes git commits to the packages of a monorepo so that a release
//! of one package only sees the commits that touched it, or the sibling
//! packages it depends on.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use monorepo_commits::commits::{filter_by_packages, CommitFileFetcher, FetcherConfig};
//! use monorepo_commits::commits::GitCommitFileSource;
//! use monorepo_commits::git::GitRepository;
//! use monorepo_commits::package::{PackagePathSet, RepoPathResolver};
//!
//! # async fn run() -> anyhow::Result<()> {
//! let resolved = RepoPathResolver::new(".").resolve()?;
//! let commits = GitRepository::discover(".")?.commits("HEAD")?;
//!
//! let fetcher = CommitFileFetcher::new(
//!     GitCommitFileSource::new(&resolved.repo_root),
//!     FetcherConfig::from_env(),
//! );
//! let annotated = fetcher.with_files(commits).await?;
//! let relevant = filter_by_packages(&PackagePathSet::new(resolved.package_path), &annotated);
//! println!("{} relevant commits", relevant.len());
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod cli;
pub mod commits;
pub mod config;
pub mod data;
pub mod error;
pub mod git;
pub mod package;
pub mod release;
pub mod utils;

pub use crate::cli::Cli;
pub use crate::error::{FetchError, ResolutionError};

/// The current version of monorepo-commits.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

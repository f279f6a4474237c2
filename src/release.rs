//! Release pipeline integration.
//!
//! [`OnlyPackageCommits`] wraps a [`ReleaseHook`] so that the hook only
//! sees the commits relevant to the package it runs for.

use std::future::Future;
use std::path::{Path, PathBuf};
use std::pin::Pin;

use anyhow::Result;
use tracing::info;

use crate::commits::{
    filter_by_packages, CommitFileFetcher, CommitFileSource, FetcherConfig, GitCommitFileSource,
};
use crate::config::PluginConfig;
use crate::error::ResolutionError;
use crate::git::Commit;
use crate::package::{
    LinkedDependencyResolver, PackageManifest, PackagePathSet, RepoPathResolver, ResolvedPackage,
};

/// What a release step observes: where it runs and which commits it sees.
#[derive(Debug, Clone, Default)]
pub struct ReleaseContext {
    /// Working directory of the release step (inside the package).
    pub cwd: PathBuf,
    /// Commits since the last release, in the order the pipeline supplied.
    pub commits: Vec<Commit>,
}

impl ReleaseContext {
    /// Creates a context for `cwd` with the given commits.
    pub fn new<P: Into<PathBuf>>(cwd: P, commits: Vec<Commit>) -> Self {
        Self {
            cwd: cwd.into(),
            commits,
        }
    }
}

/// A step of the release pipeline.
pub trait ReleaseHook: Send + Sync {
    /// Value produced by the step.
    type Output: Send;

    /// Runs the step.
    fn run<'a>(
        &'a self,
        config: &'a PluginConfig,
        context: ReleaseContext,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Output>> + Send + 'a>>;
}

/// A package and the paths its commits are attributed against.
#[derive(Debug, Clone)]
pub struct PackageScope {
    /// Package name from the manifest.
    pub name: String,
    /// Package location within the repository.
    pub resolved: ResolvedPackage,
    /// Own path followed by linked package paths.
    pub paths: PackagePathSet,
}

impl PackageScope {
    /// Resolves the package owning `cwd` and, when configured, its linked
    /// sibling packages.
    pub fn resolve(config: &PluginConfig, cwd: &Path) -> Result<Self, ResolutionError> {
        let resolved = RepoPathResolver::new(cwd).resolve()?;
        let linked = LinkedDependencyResolver::new(&resolved.repo_root)
            .resolve_linked_paths(config.linked_dependencies(), &resolved.package_path)?;

        let name = PackageManifest::load(&resolved.manifest_path)?.name;

        let mut paths = PackagePathSet::new(resolved.package_path.clone());
        paths.extend(linked);

        Ok(Self {
            name,
            resolved,
            paths,
        })
    }
}

/// Restricts the commits a wrapped hook sees to those touching the package.
pub struct OnlyPackageCommits<H, S> {
    inner: H,
    fetcher: CommitFileFetcher<S>,
}

impl<H, S> OnlyPackageCommits<H, S>
where
    H: ReleaseHook,
    S: CommitFileSource,
{
    /// Wraps `inner`, retrieving changed files through `fetcher`.
    pub fn new(inner: H, fetcher: CommitFileFetcher<S>) -> Self {
        Self { inner, fetcher }
    }

    /// The fetcher whose cache is shared by every run of this wrapper.
    pub fn fetcher(&self) -> &CommitFileFetcher<S> {
        &self.fetcher
    }

    /// Runs the wrapped hook against an already resolved `scope`.
    pub async fn run_in_scope(
        &self,
        scope: &PackageScope,
        config: &PluginConfig,
        mut context: ReleaseContext,
    ) -> Result<H::Output> {
        info!(package_paths = %scope.paths, "Filter commits by package path");

        let commits = std::mem::take(&mut context.commits);
        let annotated = self.fetcher.with_files(commits).await?;
        context.commits = filter_by_packages(&scope.paths, &annotated)
            .into_iter()
            .map(|annotated| annotated.commit)
            .collect();
        let count = context.commits.len();

        let output = self.inner.run(config, context).await?;

        info!(
            "Found {} commits for package {} since last release",
            count, scope.name
        );

        Ok(output)
    }
}

impl<H: ReleaseHook> OnlyPackageCommits<H, GitCommitFileSource> {
    /// Wraps `inner`, reading changed files from the repository at `repo_root`.
    pub fn for_repository<P: Into<PathBuf>>(
        inner: H,
        repo_root: P,
        fetcher_config: FetcherConfig,
    ) -> Self {
        let source = GitCommitFileSource::new(repo_root);
        Self::new(inner, CommitFileFetcher::new(source, fetcher_config))
    }
}

impl<H, S> ReleaseHook for OnlyPackageCommits<H, S>
where
    H: ReleaseHook,
    S: CommitFileSource,
{
    type Output = H::Output;

    fn run<'a>(
        &'a self,
        config: &'a PluginConfig,
        context: ReleaseContext,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Output>> + Send + 'a>> {
        Box::pin(async move {
            let scope = PackageScope::resolve(config, &context.cwd)?;
            self.run_in_scope(&scope, config, context).await
        })
    }
}

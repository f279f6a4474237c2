//! Commits command: lists the commits relevant to one package.

use std::future::Future;
use std::pin::Pin;

use anyhow::{Context, Result};
use clap::Parser;

use crate::cli::PackageArgs;
use crate::commits::FetcherConfig;
use crate::config::PluginConfig;
use crate::data::{CommitReport, OutputFormat, VersionInfo};
use crate::git::{Commit, GitRepository};
use crate::release::{OnlyPackageCommits, PackageScope, ReleaseContext, ReleaseHook};

/// Commits command options.
#[derive(Parser)]
pub struct CommitsCommand {
    /// Commit range to analyze (e.g., v1.2.0..HEAD). A single revision
    /// selects all of its history. Defaults to HEAD.
    #[arg(value_name = "COMMIT_RANGE")]
    pub commit_range: Option<String>,

    /// Package location and configuration.
    #[command(flatten)]
    pub package: PackageArgs,

    /// Maximum number of concurrent file retrievals
    /// (default: SRM_MAX_THREADS, or 500).
    #[arg(long)]
    pub concurrency: Option<usize>,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,
}

/// Release step that hands back the commits it was given.
struct CollectCommits;

impl ReleaseHook for CollectCommits {
    type Output = Vec<Commit>;

    fn run<'a>(
        &'a self,
        _config: &'a PluginConfig,
        context: ReleaseContext,
    ) -> Pin<Box<dyn Future<Output = Result<Self::Output>> + Send + 'a>> {
        Box::pin(async move { Ok(context.commits) })
    }
}

impl CommitsCommand {
    /// Executes the commits command.
    pub async fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;
        let cwd = self.package.working_dir()?;
        let config = self.package.plugin_config(&cwd)?;
        let commit_range = self.commit_range.as_deref().unwrap_or("HEAD");

        let (repo_root, commits) = {
            let repo = GitRepository::discover(&cwd).context(
                "Failed to open git repository. Make sure you're in a git repository.",
            )?;
            (repo.root()?, repo.commits(commit_range)?)
        };

        let fetcher_config = match self.concurrency {
            Some(limit) => FetcherConfig::default().with_max_concurrency(limit),
            None => FetcherConfig::from_env(),
        };

        let scope = PackageScope::resolve(&config, &cwd)?;
        let hook = OnlyPackageCommits::for_repository(CollectCommits, repo_root, fetcher_config);
        let commits = hook
            .run_in_scope(&scope, &config, ReleaseContext::new(&cwd, commits))
            .await?;

        let report = CommitReport {
            versions: VersionInfo::default(),
            package: scope.name,
            package_paths: scope.paths,
            commits,
        };

        print!("{}", report.render(format)?);

        Ok(())
    }
}

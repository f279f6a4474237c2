//! CLI interface for monorepo-commits.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};

use crate::config::PluginConfig;

pub mod commits;
pub mod paths;

pub use commits::CommitsCommand;
pub use paths::PathsCommand;

/// monorepo-commits: restricts a monorepo's commit history to one package.
#[derive(Parser)]
#[command(name = "monorepo-commits")]
#[command(about = "Lists the commits relevant to one package of a monorepo", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The main command to execute.
    #[command(subcommand)]
    pub command: Commands,
}

/// Main command categories.
#[derive(Subcommand)]
pub enum Commands {
    /// Lists the commits that touched the package or its linked packages.
    Commits(CommitsCommand),
    /// Shows the package paths commits are attributed against.
    Paths(PathsCommand),
}

impl Cli {
    /// Name of the selected subcommand, for diagnostics.
    pub fn command_name(&self) -> &'static str {
        match self.command {
            Commands::Commits(_) => "commits",
            Commands::Paths(_) => "paths",
        }
    }

    /// Executes the CLI command.
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Commits(commits_cmd) => commits_cmd.execute().await,
            Commands::Paths(paths_cmd) => paths_cmd.execute(),
        }
    }
}

/// Options locating the package and its configuration.
#[derive(Args, Debug, Clone, Default)]
pub struct PackageArgs {
    /// Directory inside the package (defaults to the current directory).
    #[arg(short = 'C', long = "directory", value_name = "DIR")]
    pub directory: Option<PathBuf>,

    /// Plugin configuration file (defaults to .monorepo-commits.json in the working directory).
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory of sibling packages, relative to the repository root.
    /// Enables linked dependency analysis.
    #[arg(long, value_name = "DIR")]
    pub linked_dir: Option<String>,
}

impl PackageArgs {
    /// Returns the working directory to resolve the package from.
    pub fn working_dir(&self) -> Result<PathBuf> {
        match &self.directory {
            Some(dir) => Ok(dir.clone()),
            None => std::env::current_dir().context("Failed to determine current directory"),
        }
    }

    /// Loads the plugin configuration, applying command-line overrides.
    pub fn plugin_config(&self, cwd: &std::path::Path) -> Result<PluginConfig> {
        let config = match &self.config {
            Some(path) => PluginConfig::load_from_path(path)?,
            None => PluginConfig::discover(cwd)?,
        };

        Ok(config.with_linked_dir(self.linked_dir.clone()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;

    #[test]
    fn parses_commits_subcommand() {
        let cli = Cli::try_parse_from([
            "monorepo-commits",
            "commits",
            "v1.0.0..HEAD",
            "--linked-dir",
            "packages",
            "--concurrency",
            "8",
            "--format",
            "yaml",
        ])
        .unwrap();

        let Commands::Commits(cmd) = cli.command else {
            panic!("expected commits subcommand");
        };
        assert_eq!(cmd.commit_range.as_deref(), Some("v1.0.0..HEAD"));
        assert_eq!(cmd.package.linked_dir.as_deref(), Some("packages"));
        assert_eq!(cmd.concurrency, Some(8));
        assert_eq!(cmd.format, "yaml");
    }

    #[test]
    fn parses_paths_subcommand_with_directory() {
        let cli =
            Cli::try_parse_from(["monorepo-commits", "paths", "-C", "packages/core"]).unwrap();

        let Commands::Paths(cmd) = cli.command else {
            panic!("expected paths subcommand");
        };
        assert_eq!(
            cmd.package.directory.as_deref(),
            Some(std::path::Path::new("packages/core"))
        );
    }

    #[test]
    fn config_help_names_the_working_directory() {
        use clap::CommandFactory;

        let mut cmd = Cli::command();
        let paths = cmd.find_subcommand_mut("paths").unwrap();
        let help = paths
            .get_arguments()
            .find(|arg| arg.get_id() == "config")
            .and_then(|arg| arg.get_help())
            .unwrap()
            .to_string();
        assert!(help.contains("working directory"), "{help}");
    }

    #[test]
    fn command_name_follows_subcommand() {
        let cli = Cli::try_parse_from(["monorepo-commits", "paths"]).unwrap();
        assert_eq!(cli.command_name(), "paths");

        let cli = Cli::try_parse_from(["monorepo-commits", "commits"]).unwrap();
        assert_eq!(cli.command_name(), "commits");
    }

    #[test]
    fn linked_dir_flag_enables_analysis() {
        let temp_dir = tempfile::TempDir::new().unwrap();
        let args = PackageArgs {
            linked_dir: Some("libs".to_string()),
            ..PackageArgs::default()
        };

        let config = args.plugin_config(temp_dir.path()).unwrap();
        assert_eq!(config.linked_dependencies().unwrap().dir, "libs");
    }
}

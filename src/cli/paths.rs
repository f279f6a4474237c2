//! Paths command: shows the package paths commits are attributed against.

use anyhow::Result;
use clap::Parser;

use crate::cli::PackageArgs;
use crate::data::{OutputFormat, PackagePathsReport};
use crate::release::PackageScope;

/// Paths command options.
#[derive(Parser)]
pub struct PathsCommand {
    /// Package location and configuration.
    #[command(flatten)]
    pub package: PackageArgs,

    /// Output format: text (default), json, yaml.
    #[arg(long, default_value = "text")]
    pub format: String,
}

impl PathsCommand {
    /// Executes the paths command.
    pub fn execute(self) -> Result<()> {
        let format: OutputFormat = self.format.parse()?;
        let cwd = self.package.working_dir()?;
        let config = self.package.plugin_config(&cwd)?;

        let scope = PackageScope::resolve(&config, &cwd)?;
        let report = PackagePathsReport {
            package: scope.name,
            repo_root: scope.resolved.repo_root.display().to_string(),
            package_paths: scope.paths,
        };

        print!("{}", report.render(format)?);

        Ok(())
    }
}

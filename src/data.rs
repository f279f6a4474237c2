//! Report structures and their serialization.

use std::fmt;

use anyhow::{Context, Result};
use serde::Serialize;

use crate::git::{short_hash, Commit};
use crate::package::PackagePathSet;

pub mod yaml;

pub use yaml::to_yaml;

/// Output format for reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    /// One line per commit.
    #[default]
    Text,
    /// JSON format.
    Json,
    /// YAML format.
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = anyhow::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "text" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            "yaml" => Ok(Self::Yaml),
            other => anyhow::bail!("Unknown output format '{other}'. Expected text, json or yaml"),
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
            Self::Yaml => write!(f, "yaml"),
        }
    }
}

/// Version information for the tool that produced a report.
#[derive(Debug, Clone, Serialize)]
pub struct VersionInfo {
    /// Version of monorepo-commits.
    pub monorepo_commits: String,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            monorepo_commits: crate::VERSION.to_string(),
        }
    }
}

/// Commits attributed to one package.
#[derive(Debug, Clone, Serialize)]
pub struct CommitReport {
    /// Version information.
    pub versions: VersionInfo,
    /// Declared package name.
    pub package: String,
    /// Paths the commits were attributed against, own path first.
    pub package_paths: PackagePathSet,
    /// Attributed commits in pipeline order.
    pub commits: Vec<Commit>,
}

impl CommitReport {
    /// Renders the report in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.to_text()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => to_yaml(self),
        }
    }

    fn to_text(&self) -> String {
        let mut out = format!(
            "Found {} commits for package {} ({})\n",
            self.commits.len(),
            self.package,
            self.package_paths
        );
        for commit in &self.commits {
            out.push_str(&format!("{} {}\n", short_hash(&commit.hash), commit.subject));
        }
        out
    }
}

/// Package paths resolved for one package.
#[derive(Debug, Clone, Serialize)]
pub struct PackagePathsReport {
    /// Declared package name.
    pub package: String,
    /// Repository working tree root.
    pub repo_root: String,
    /// Own path followed by linked package paths.
    pub package_paths: PackagePathSet,
}

impl PackagePathsReport {
    /// Renders the report in the requested format.
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self
                .package_paths
                .iter()
                .map(|path| format!("{path}\n"))
                .collect()),
            OutputFormat::Json => {
                serde_json::to_string_pretty(self).context("Failed to serialize report to JSON")
            }
            OutputFormat::Yaml => to_yaml(self),
        }
    }
}

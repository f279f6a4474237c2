//! Plugin configuration.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use crate::package::LinkedDependencies;

/// Configuration file looked up in the working directory when none is given.
pub const DEFAULT_CONFIG_FILE: &str = ".monorepo-commits.json";

/// Options recognised by the commit filter.
///
/// Unknown keys are ignored so the same file can carry options for other
/// release steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PluginConfig {
    /// Also attribute commits touching sibling packages this package depends on.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub analyze_linked_dependencies: Option<LinkedDependencies>,
}

impl PluginConfig {
    /// Loads configuration from a JSON file.
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))
    }

    /// Loads `.monorepo-commits.json` from `dir`, or the defaults if absent.
    pub fn discover<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(DEFAULT_CONFIG_FILE);
        if path.is_file() {
            Self::load_from_path(path)
        } else {
            Ok(Self::default())
        }
    }

    /// Overrides the linked packages directory when `dir` is given.
    pub fn with_linked_dir(mut self, dir: Option<String>) -> Self {
        if let Some(dir) = dir {
            self.analyze_linked_dependencies = Some(LinkedDependencies { dir });
        }
        self
    }

    /// The linked-dependency option, if enabled.
    pub fn linked_dependencies(&self) -> Option<&LinkedDependencies> {
        self.analyze_linked_dependencies.as_ref()
    }
}

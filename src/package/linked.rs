//! Linked sibling packages: dependencies that live in the same monorepo.

use std::collections::HashSet;
use std::fs;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ResolutionError;
use crate::package::manifest::PackageManifest;
use crate::package::path::PackagePath;

/// The `analyzeLinkedDependencies` option.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct LinkedDependencies {
    /// Directory holding sibling packages, relative to the repository root.
    pub dir: String,
}

/// Finds the sibling packages a package depends on.
#[derive(Debug, Clone)]
pub struct LinkedDependencyResolver {
    repo_root: PathBuf,
}

impl LinkedDependencyResolver {
    /// Creates a resolver for the repository rooted at `repo_root`.
    pub fn new<P: Into<PathBuf>>(repo_root: P) -> Self {
        Self {
            repo_root: repo_root.into(),
        }
    }

    /// Returns `<dir>/<name>` for every declared dependency that has a
    /// directory of the same name under `dir`, in declaration order.
    ///
    /// Without a config the result is empty.
    pub fn resolve_linked_paths(
        &self,
        config: Option<&LinkedDependencies>,
        package_path: &PackagePath,
    ) -> Result<Vec<PackagePath>, ResolutionError> {
        let Some(config) = config else {
            return Ok(Vec::new());
        };

        let linked_dir = PackagePath::parse_within_root(&config.dir).ok_or_else(|| {
            ResolutionError::LinkedDirOutsideRepository {
                dir: config.dir.clone(),
            }
        })?;
        let available = self.sibling_names(&linked_dir)?;

        let manifest =
            PackageManifest::load_from_dir(self.repo_root.join(package_path.to_path_buf()))?;

        let linked: Vec<PackagePath> = manifest
            .dependency_names()
            .filter(|name| available.contains(*name))
            .map(|name| linked_dir.join(name))
            .collect();

        debug!(
            dir = %linked_dir,
            available = available.len(),
            linked = linked.len(),
            "Resolved linked dependencies"
        );

        Ok(linked)
    }

    /// Names of the immediate child directories of `dir`.
    fn sibling_names(&self, dir: &PackagePath) -> Result<HashSet<String>, ResolutionError> {
        let abs_dir = self.repo_root.join(dir.to_path_buf());
        let unreadable = |source: std::io::Error| ResolutionError::LinkedDirUnreadable {
            dir: abs_dir.clone(),
            source,
        };

        let mut names = HashSet::new();
        for entry in fs::read_dir(&abs_dir).map_err(unreadable)? {
            let entry = entry.map_err(unreadable)?;
            if entry.path().is_dir() {
                names.insert(entry.file_name().to_string_lossy().into_owned());
            }
        }

        Ok(names)
    }
}

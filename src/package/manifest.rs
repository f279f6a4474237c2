//! Package manifest (`package.json`) reading.

use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::error::ResolutionError;

/// File name of a package manifest.
pub const MANIFEST_FILE: &str = "package.json";

/// The parts of a package descriptor that attribution needs.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// Declared package name.
    #[serde(default)]
    pub name: String,

    /// Runtime dependencies, in declaration order.
    #[serde(default)]
    pub dependencies: Option<Map<String, Value>>,
}

impl PackageManifest {
    /// Reads and parses a manifest file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, ResolutionError> {
        let path = path.as_ref();
        let content =
            fs::read_to_string(path).map_err(|source| ResolutionError::ManifestUnreadable {
                path: path.to_path_buf(),
                source,
            })?;

        Self::parse(&content, path)
    }

    /// Reads the manifest located directly in `dir`.
    pub fn load_from_dir<P: AsRef<Path>>(dir: P) -> Result<Self, ResolutionError> {
        Self::load(dir.as_ref().join(MANIFEST_FILE))
    }

    fn parse(content: &str, path: &Path) -> Result<Self, ResolutionError> {
        serde_json::from_str(content).map_err(|source| ResolutionError::ManifestInvalid {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Names of the declared runtime dependencies, in declaration order.
    ///
    /// A manifest without a `dependencies` mapping has none.
    pub fn dependency_names(&self) -> impl Iterator<Item = &str> {
        self.dependencies
            .iter()
            .flat_map(|deps| deps.keys().map(String::as_str))
    }
}

/// Finds the nearest manifest at or above `start`.
pub fn find_manifest<P: AsRef<Path>>(start: P) -> Result<PathBuf, ResolutionError> {
    let start = start.as_ref();

    start
        .ancestors()
        .map(|dir| dir.join(MANIFEST_FILE))
        .find(|candidate| candidate.is_file())
        .ok_or_else(|| ResolutionError::ManifestNotFound {
            start: start.to_path_buf(),
        })
}

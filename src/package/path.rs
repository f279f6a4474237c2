//! Package paths relative to the repository root, and their resolution
//! from a working directory.

use std::fmt;
use std::path::{Component, Path, PathBuf, MAIN_SEPARATOR};

use serde::{Serialize, Serializer};

use crate::error::ResolutionError;
use crate::git::GitRepository;
use crate::package::manifest::find_manifest;

/// Repository-relative root directory of one package, held as path segments.
///
/// The empty path (no segments) is the repository root itself.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct PackagePath {
    segments: Vec<String>,
}

impl PackagePath {
    /// Parses a repository-relative path string.
    ///
    /// Both `/` and the host separator delimit segments; `.` and empty
    /// segments are dropped and `..` removes the preceding segment.
    pub fn parse(path: &str) -> Self {
        Self {
            segments: normalize_segments(path)
                .into_iter()
                .map(str::to_string)
                .collect(),
        }
    }

    /// Parses `path` as a location inside the repository.
    ///
    /// Returns `None` for absolute paths and for paths whose `..` segments
    /// climb above the repository root.
    pub fn parse_within_root(path: &str) -> Option<Self> {
        if path.starts_with(['/', MAIN_SEPARATOR]) || Path::new(path).is_absolute() {
            return None;
        }

        let mut segments: Vec<String> = Vec::new();
        for segment in path.split(|c: char| c == '/' || c == MAIN_SEPARATOR) {
            match segment {
                "" | "." => {}
                ".." => {
                    segments.pop()?;
                }
                _ => segments.push(segment.to_string()),
            }
        }
        Some(Self { segments })
    }

    /// Builds a package path from a host path that is already relative to
    /// the repository root.
    pub fn from_relative_path(path: &Path) -> Self {
        let mut segments: Vec<String> = Vec::new();
        for component in path.components() {
            match component {
                Component::Normal(part) => segments.push(part.to_string_lossy().into_owned()),
                Component::ParentDir => {
                    segments.pop();
                }
                Component::CurDir | Component::RootDir | Component::Prefix(_) => {}
            }
        }
        Self { segments }
    }

    /// The path segments, outermost first.
    pub fn segments(&self) -> &[String] {
        &self.segments
    }

    /// Whether this is the repository root.
    pub fn is_root(&self) -> bool {
        self.segments.is_empty()
    }

    /// Returns a child package path.
    pub fn join(&self, name: &str) -> Self {
        let mut joined = self.clone();
        joined.segments.extend(
            normalize_segments(name)
                .into_iter()
                .map(str::to_string),
        );
        joined
    }

    /// Host path relative to the repository root.
    pub fn to_path_buf(&self) -> PathBuf {
        self.segments.iter().collect()
    }

    /// Whether `file` lies at or below this package directory.
    ///
    /// The package segments must be a positional prefix of the file's
    /// normalized segments, so `packages/foo` owns `packages/foo/index.js`
    /// and `packages/foo` itself but not `packages/foobar/index.js`.
    pub fn contains_file(&self, file: &str) -> bool {
        let file_segments = normalize_segments(file);
        file_segments.len() >= self.segments.len()
            && self
                .segments
                .iter()
                .zip(&file_segments)
                .all(|(package_segment, file_segment)| package_segment == file_segment)
    }
}

impl fmt::Display for PackagePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_root() {
            return write!(f, ".");
        }
        write!(f, "{}", self.segments.join("/"))
    }
}

impl Serialize for PackagePath {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Splits a path string into normalized segments.
fn normalize_segments(path: &str) -> Vec<&str> {
    let mut segments = Vec::new();
    for segment in path.split(|c: char| c == '/' || c == MAIN_SEPARATOR) {
        match segment {
            "" | "." => {}
            ".." => {
                segments.pop();
            }
            _ => segments.push(segment),
        }
    }
    segments
}

/// Ordered, duplicate-free package paths to attribute commits against.
///
/// The first entry is the package's own path; linked packages follow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PackagePathSet {
    paths: Vec<PackagePath>,
}

impl PackagePathSet {
    /// Creates a set holding only the package's own path.
    pub fn new(own: PackagePath) -> Self {
        Self { paths: vec![own] }
    }

    /// Appends a path unless an equal one is already present.
    ///
    /// Returns whether the path was added.
    pub fn push(&mut self, path: PackagePath) -> bool {
        if self.paths.contains(&path) {
            return false;
        }
        self.paths.push(path);
        true
    }

    /// The package's own path.
    pub fn own(&self) -> &PackagePath {
        &self.paths[0]
    }

    /// Iterates over the paths in attribution order.
    pub fn iter(&self) -> std::slice::Iter<'_, PackagePath> {
        self.paths.iter()
    }

    /// Number of paths in the set.
    pub fn len(&self) -> usize {
        self.paths.len()
    }

    /// Always false; the set holds at least the package's own path.
    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl Extend<PackagePath> for PackagePathSet {
    fn extend<I: IntoIterator<Item = PackagePath>>(&mut self, iter: I) {
        for path in iter {
            self.push(path);
        }
    }
}

impl<'a> IntoIterator for &'a PackagePathSet {
    type Item = &'a PackagePath;
    type IntoIter = std::slice::Iter<'a, PackagePath>;

    fn into_iter(self) -> Self::IntoIter {
        self.paths.iter()
    }
}

impl fmt::Display for PackagePathSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let joined: Vec<String> = self.paths.iter().map(ToString::to_string).collect();
        write!(f, "[{}]", joined.join(", "))
    }
}

/// Where a package lives relative to its repository.
#[derive(Debug, Clone)]
pub struct ResolvedPackage {
    /// Canonical working tree root.
    pub repo_root: PathBuf,
    /// Canonical location of the package manifest.
    pub manifest_path: PathBuf,
    /// Manifest directory relative to `repo_root`.
    pub package_path: PackagePath,
}

/// Resolves the package owning a working directory.
#[derive(Debug, Clone)]
pub struct RepoPathResolver {
    cwd: PathBuf,
}

impl RepoPathResolver {
    /// Creates a resolver starting from `cwd`.
    pub fn new<P: Into<PathBuf>>(cwd: P) -> Self {
        Self { cwd: cwd.into() }
    }

    /// Locates the nearest manifest and the repository root.
    pub fn resolve(&self) -> Result<ResolvedPackage, ResolutionError> {
        let cwd = canonicalize(&self.cwd)?;
        let manifest_path = find_manifest(&cwd)?;
        let repo_root = canonicalize(&GitRepository::discover(&cwd)?.root()?)?;

        let package_dir = manifest_path.parent().unwrap_or(&cwd);
        let relative = package_dir.strip_prefix(&repo_root).map_err(|_| {
            ResolutionError::OutsideRepository {
                package_dir: package_dir.to_path_buf(),
                repo_root: repo_root.clone(),
            }
        })?;
        let package_path = PackagePath::from_relative_path(relative);

        Ok(ResolvedPackage {
            repo_root,
            manifest_path,
            package_path,
        })
    }

    /// Returns the package root relative to the repository root.
    pub fn resolve_package_path(&self) -> Result<PackagePath, ResolutionError> {
        Ok(self.resolve()?.package_path)
    }
}

fn canonicalize(path: &Path) -> Result<PathBuf, ResolutionError> {
    path.canonicalize()
        .map_err(|source| ResolutionError::PathUnresolvable {
            path: path.to_path_buf(),
            source,
        })
}

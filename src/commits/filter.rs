//! Attribution of annotated commits to package paths.

use tracing::debug;

use crate::git::AnnotatedCommit;
use crate::package::{PackagePath, PackagePathSet};

/// One commit attributed to one package path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Attribution<'a> {
    /// The package path the commit touched.
    pub package: &'a PackagePath,
    /// The attributed commit.
    pub commit: &'a AnnotatedCommit,
    /// The first changed file found under `package`.
    pub file: &'a str,
}

/// Attributes commits to each package path in turn.
///
/// For every package path, in order, yields the commits (in input order)
/// that changed at least one file under it. A commit touching several
/// package paths is attributed once per path.
pub fn attribute<'a>(
    package_paths: &'a PackagePathSet,
    commits: &'a [AnnotatedCommit],
) -> Vec<Attribution<'a>> {
    package_paths
        .iter()
        .flat_map(|package| {
            commits.iter().filter_map(move |commit| {
                let file = commit
                    .files
                    .iter()
                    .find(|file| package.contains_file(file))?;

                debug!(
                    package = %package,
                    "Including commit \"{}\" because it modified package file \"{}\".",
                    commit.subject(),
                    file
                );

                Some(Attribution {
                    package,
                    commit,
                    file,
                })
            })
        })
        .collect()
}

/// Returns the commits relevant to the package paths.
///
/// The result concatenates each path's matching commits in path order, so a
/// commit matching two paths appears twice.
pub fn filter_by_packages(
    package_paths: &PackagePathSet,
    commits: &[AnnotatedCommit],
) -> Vec<AnnotatedCommit> {
    attribute(package_paths, commits)
        .into_iter()
        .map(|attribution| attribution.commit.clone())
        .collect()
}

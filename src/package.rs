//! Package discovery within a monorepo: manifests, package paths, and
//! linked sibling packages.

pub mod linked;
pub mod manifest;
pub mod path;

pub use linked::{LinkedDependencies, LinkedDependencyResolver};
pub use manifest::{PackageManifest, MANIFEST_FILE};
pub use path::{PackagePath, PackagePathSet, RepoPathResolver, ResolvedPackage};

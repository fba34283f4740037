//! The materialized, read-only project configuration.

use std::path::{Path, PathBuf};

use path_clean::PathClean;

use crate::descriptor::BundleDescriptor;
use crate::error::Result;
use crate::manifest::{self, Manifest, ManifestDiscovery};
use crate::metadata::PackageMetadata;
use crate::validation::validate_manifest;

/// Everything the build reads about a project, loaded once at process start.
#[derive(Debug, Clone)]
pub struct Project {
    root: PathBuf,
    dist_dir: PathBuf,
    metadata: PackageMetadata,
    bundles: Vec<BundleDescriptor>,
}

impl Project {
    /// Build a project from already-loaded parts. The manifest is validated.
    pub fn new(
        root: impl Into<PathBuf>,
        manifest: Manifest,
        metadata: PackageMetadata,
    ) -> Result<Self> {
        validate_manifest(&manifest)?;
        let root: PathBuf = root.into();
        let dist_dir = if manifest.dist_dir.is_absolute() {
            manifest.dist_dir.clean()
        } else {
            root.join(&manifest.dist_dir).clean()
        };

        Ok(Self {
            root,
            dist_dir,
            metadata,
            bundles: manifest.bundles,
        })
    }

    /// Discover the manifest under `root` and read `package.json` next to it.
    pub fn load(root: impl AsRef<Path>) -> Result<Self> {
        let root = root.as_ref();
        let manifest = ManifestDiscovery::new(root).load()?;
        let metadata = PackageMetadata::load(root)?;
        Self::new(root, manifest, metadata)
    }

    /// Like [`Project::load`] but with an explicit manifest path.
    pub fn load_with_manifest(root: impl AsRef<Path>, manifest_path: &Path) -> Result<Self> {
        let root = root.as_ref();
        let manifest = manifest::load_from(manifest_path)?;
        let metadata = PackageMetadata::load(root)?;
        Self::new(root, manifest, metadata)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn dist_dir(&self) -> &Path {
        &self.dist_dir
    }

    pub fn metadata(&self) -> &PackageMetadata {
        &self.metadata
    }

    pub fn bundles(&self) -> &[BundleDescriptor] {
        &self.bundles
    }

    /// Absolute path of a project-relative file.
    pub fn resolve(&self, relative: impl AsRef<Path>) -> PathBuf {
        self.root.join(relative).clean()
    }
}

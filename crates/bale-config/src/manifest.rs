//! Manifest discovery and loading.
//!
//! The manifest is the ordered list of bundle descriptors for a project,
//! stored as `bale.toml` (preferred) or `bale.json` at the project root.

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Format as _, Json, Toml},
};
use serde::{Deserialize, Serialize};

use crate::descriptor::BundleDescriptor;
use crate::error::{ConfigError, Result};

const MANIFEST_FILES: &[&str] = &["bale.toml", "bale.json"];

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Distribution root, relative to the project root.
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,

    #[serde(default, rename = "bundle")]
    pub bundles: Vec<BundleDescriptor>,
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for Manifest {
    fn default() -> Self {
        Self {
            dist_dir: default_dist_dir(),
            bundles: Vec::new(),
        }
    }
}

/// File-based manifest discovery.
///
/// # Example
///
/// ```no_run
/// use bale_config::ManifestDiscovery;
///
/// let manifest = ManifestDiscovery::new(".").load().unwrap();
/// println!("{} bundles", manifest.bundles.len());
/// ```
pub struct ManifestDiscovery {
    root: PathBuf,
}

impl ManifestDiscovery {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
        }
    }

    /// Find the manifest file, trying `bale.toml` before `bale.json`.
    pub fn find(&self) -> Option<PathBuf> {
        MANIFEST_FILES
            .iter()
            .map(|name| self.root.join(name))
            .find(|path| path.exists())
    }

    pub fn load(&self) -> Result<Manifest> {
        let path = self
            .find()
            .ok_or_else(|| ConfigError::NotFound(self.root.clone()))?;
        load_from(&path)
    }
}

/// Load a manifest from an explicit path. The format follows the extension.
pub fn load_from(path: &Path) -> Result<Manifest> {
    if !path.exists() {
        return Err(ConfigError::NotFound(path.to_path_buf()));
    }

    let figment = match path.extension().and_then(|ext| ext.to_str()) {
        Some("toml") => Figment::new().merge(Toml::file(path)),
        Some("json") => Figment::new().merge(Json::file(path)),
        _ => return Err(ConfigError::UnsupportedFormat(path.to_path_buf())),
    };

    let manifest: Manifest = figment.extract().map_err(|e| ConfigError::InvalidValue {
        field: path.display().to_string(),
        hint: Some(e.to_string()),
    })?;

    tracing::debug!(
        path = %path.display(),
        bundles = manifest.bundles.len(),
        "loaded manifest"
    );

    Ok(manifest)
}

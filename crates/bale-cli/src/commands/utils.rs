//! Shared helpers for commands.

use std::path::{Path, PathBuf};

use bale_config::Project;

use crate::cli::ProjectArgs;
use crate::error::{CliError, Result};

/// Project root: `--cwd` when given, the current directory otherwise.
pub(crate) fn project_root(args: &ProjectArgs) -> Result<PathBuf> {
    let cwd = std::env::current_dir()?;
    let root = match &args.cwd {
        Some(dir) => resolve_path(dir, &cwd),
        None => cwd,
    };
    if !root.is_dir() {
        return Err(CliError::FileNotFound(root));
    }
    Ok(root)
}

/// Load the manifest and `package.json` once for the whole invocation.
pub(crate) fn load_project(args: &ProjectArgs) -> Result<Project> {
    let root = project_root(args)?;
    let project = match &args.config {
        Some(manifest) => {
            let manifest = resolve_path(manifest, &root);
            Project::load_with_manifest(&root, &manifest)?
        }
        None => Project::load(&root)?,
    };

    tracing::debug!(
        root = %project.root().display(),
        bundles = project.bundles().len(),
        "loaded project"
    );
    Ok(project)
}

pub(crate) fn resolve_path(path: &Path, base: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base.join(path)
    }
}

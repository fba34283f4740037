//! Module substitution.
//!
//! Keys are bare specifiers or absolute module paths. Relative imports are
//! resolved against their importer before lookup.

use std::path::{Path, PathBuf};
use std::sync::Arc;

use bale_config::ModuleReplacement;
use indexmap::IndexMap;
use path_clean::PathClean;

use super::{Resolution, VIRTUAL_PREFIX};

const EXTENSIONS: &[&str] = &["js", "mjs", "cjs", "json"];

#[derive(Debug, Clone)]
pub struct ReplaceModulePlugin {
    replacements: Arc<IndexMap<String, ModuleReplacement>>,
}

impl ReplaceModulePlugin {
    pub fn new(replacements: IndexMap<String, ModuleReplacement>) -> Self {
        Self {
            replacements: Arc::new(replacements),
        }
    }

    pub fn resolve_id(&self, specifier: &str, importer: Option<&str>) -> Option<Resolution> {
        let (key, replacement) = self.lookup(specifier, importer)?;
        Some(match replacement {
            ModuleReplacement::Path(path) => Resolution::Module(path.to_string_lossy().into_owned()),
            ModuleReplacement::Contents(_) => Resolution::Module(virtual_id(key)),
            ModuleReplacement::External(target) => Resolution::External(target.clone()),
        })
    }

    pub fn load(&self, id: &str) -> Option<String> {
        let key = id.strip_prefix(VIRTUAL_PREFIX)?.strip_prefix("replace:")?;
        match self.replacements.get(key)? {
            ModuleReplacement::Contents(contents) => Some(contents.clone()),
            _ => None,
        }
    }

    fn lookup(&self, specifier: &str, importer: Option<&str>) -> Option<(&String, &ModuleReplacement)> {
        if let Some(found) = self.replacements.get_key_value(specifier) {
            return Some(found);
        }

        let base = if specifier.starts_with("./") || specifier.starts_with("../") {
            let importer = importer.filter(|id| !id.starts_with('\0'))?;
            Path::new(importer).parent()?.join(specifier).clean()
        } else if specifier.starts_with('/') {
            PathBuf::from(specifier).clean()
        } else {
            return None;
        };

        candidates(&base).find_map(|candidate| {
            self.replacements
                .get_key_value(candidate.to_string_lossy().as_ref())
        })
    }
}

fn candidates(base: &Path) -> impl Iterator<Item = PathBuf> + '_ {
    let with_extensions = EXTENSIONS.iter().map(move |ext| {
        let mut name = base.as_os_str().to_owned();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    });
    std::iter::once(base.to_path_buf())
        .chain(with_extensions)
        .chain(std::iter::once(base.join("index.js")))
}

fn virtual_id(key: &str) -> String {
    format!("{VIRTUAL_PREFIX}replace:{key}")
}

use std::path::Path;

use bale_config::{BundleDescriptor, PackageMetadata, SyntaxPlugin, Target};

use crate::Result;
use crate::variant::targets::{NODE_BASELINE, browserslist_targets};

/// Files under these path fragments are never transformed.
const EXCLUDED_PATHS: &[&str] = &["/core-js/"];

/// How the transform decides between script and module parsing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Decided from the content (import/export statements).
    Unambiguous,
    Module,
    Script,
}

/// How object spread is lowered.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectSpread {
    /// Always rewritten to `Object.assign` (loose, built-ins only).
    Assign,
    /// Left to the targets; lowered with runtime helpers when they need it.
    Targets,
}

/// Configuration of the legacy-syntax transform for one descriptor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownlevelConfig {
    pub source_kind: SourceKind,
    /// Runtime targets, e.g. `node14`, `chrome60`.
    pub targets: Vec<String>,
    /// Transforms forced on regardless of the targets.
    pub plugins: Vec<SyntaxPlugin>,
    pub object_spread: ObjectSpread,
    pub exclude: Vec<String>,
}

impl DownlevelConfig {
    /// Fails when the descriptor names a syntax plugin that does not exist.
    pub fn for_descriptor(descriptor: &BundleDescriptor, metadata: &PackageMetadata) -> Result<Self> {
        let mut targets = vec![NODE_BASELINE.to_string()];
        if descriptor.target == Target::Universal {
            targets.extend(browserslist_targets(&metadata.browserslist));
        }

        Ok(Self {
            source_kind: SourceKind::Unambiguous,
            targets,
            plugins: descriptor.syntax_plugins()?,
            object_spread: ObjectSpread::Assign,
            exclude: EXCLUDED_PATHS.iter().map(|s| s.to_string()).collect(),
        })
    }

    /// Whether `path` is left untouched.
    pub fn is_excluded(&self, path: &Path) -> bool {
        let path = path.to_string_lossy().replace('\\', "/");
        self.exclude.iter().any(|pattern| path.contains(pattern.as_str()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Error;

    #[test]
    fn test_node_targets_baseline_only() {
        let metadata = PackageMetadata::new("1.0.0").with_browserslist(["chrome >= 60"]);
        let config =
            DownlevelConfig::for_descriptor(&BundleDescriptor::node("src/a.js", "a.js"), &metadata)
                .unwrap();
        assert_eq!(config.targets, vec!["node14"]);
        assert_eq!(config.source_kind, SourceKind::Unambiguous);
        assert_eq!(config.object_spread, ObjectSpread::Assign);
    }

    #[test]
    fn test_universal_adds_browser_matrix() {
        let metadata = PackageMetadata::new("1.0.0").with_browserslist(["chrome >= 60", "defaults"]);
        let mut descriptor = BundleDescriptor::universal("src/a.js", "a.js", "a");
        descriptor.plugins = vec!["@babel/plugin-transform-optional-chaining".to_string()];

        let config = DownlevelConfig::for_descriptor(&descriptor, &metadata).unwrap();
        assert_eq!(config.targets, vec!["node14", "chrome60"]);
        assert_eq!(config.plugins, vec![SyntaxPlugin::OptionalChaining]);
    }

    #[test]
    fn test_unknown_plugin_is_a_config_error() {
        let mut descriptor = BundleDescriptor::universal("src/a.js", "a.js", "a");
        descriptor.plugins = vec!["transform-html-literals".to_string()];

        let err = DownlevelConfig::for_descriptor(&descriptor, &PackageMetadata::new("1.0.0"))
            .unwrap_err();
        assert!(matches!(
            err,
            Error::Config(bale_config::ConfigError::UnknownSyntaxPlugin { .. })
        ));
    }

    #[test]
    fn test_core_js_is_excluded() {
        let config = DownlevelConfig::for_descriptor(
            &BundleDescriptor::node("src/a.js", "a.js"),
            &PackageMetadata::new("1.0.0"),
        )
        .unwrap();
        assert!(config.is_excluded(Path::new("/repo/node_modules/core-js/modules/es.map.js")));
        assert!(!config.is_excluded(Path::new("/repo/dist/index.js")));
    }
}

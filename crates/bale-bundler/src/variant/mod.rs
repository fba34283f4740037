//! Build variants: one concrete configuration per physical output file.
//!
//! A [`BundleDescriptor`](bale_config::BundleDescriptor) describes a logical
//! bundle; [`resolve`] expands it into one or more [`VariantConfig`]s (a
//! universal descriptor yields a UMD variant and, for standalone and parser
//! outputs, an ESM twin). Resolution is pure: nothing here touches the
//! filesystem.

mod resolve;
pub mod targets;

use std::path::PathBuf;

use bale_config::{GlobalBuildOptions, ModuleReplacement, Target, TextReplaceRule};
use indexmap::IndexMap;

use crate::downlevel::DownlevelConfig;
use crate::plugins::{PipelinePlugin, PluginKind};

pub use resolve::{Variants, define_map, resolve};

/// Constant-injection map: expression text to replacement literal.
pub type DefineMap = IndexMap<String, String>;

/// Physical module format of a variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    Cjs,
    Umd,
    Esm,
}

impl Format {
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Cjs => "cjs",
            Format::Umd => "umd",
            Format::Esm => "esm",
        }
    }

    /// The format the bundler itself emits; UMD is CommonJS plus a wrapper.
    pub fn bundler_format(&self) -> Format {
        match self {
            Format::Umd => Format::Cjs,
            other => *other,
        }
    }
}

impl std::fmt::Display for Format {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.pad(self.as_str())
    }
}

/// Everything needed to build one physical artifact.
#[derive(Debug, Clone)]
pub struct VariantConfig {
    /// Logical output name relative to the distribution root.
    pub name: String,
    /// Absolute entry module.
    pub entry: PathBuf,
    /// Final output path relative to the distribution root (after `save_as`).
    pub relative_output: String,
    /// Absolute final output path.
    pub output: PathBuf,
    pub format: Format,
    pub target: Target,
    /// UMD global name.
    pub global_name: Option<String>,
    pub define: DefineMap,
    /// Merged module replacements. Path-like keys are absolute.
    pub replace_module: IndexMap<String, ModuleReplacement>,
    pub replace_text: Vec<TextReplaceRule>,
    pub plugins: Vec<PipelinePlugin>,
    pub minify: bool,
    pub external: Vec<String>,
    pub runtime_target: Vec<String>,
    /// Present when the legacy-syntax pass runs for this variant.
    pub downlevel: Option<DownlevelConfig>,
}

impl VariantConfig {
    pub fn plugin_kinds(&self) -> Vec<PluginKind> {
        self.plugins.iter().map(PipelinePlugin::kind).collect()
    }

    pub fn is_downleveled(&self) -> bool {
        self.downlevel.is_some()
    }

    /// Whether this invocation builds the variant: the file filter must
    /// select it and playground mode only keeps UMD outputs.
    pub fn is_selected(&self, options: &GlobalBuildOptions) -> bool {
        options.selects_file(&self.name) && (!options.playground || self.format == Format::Umd)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_umd_bundles_as_cjs() {
        assert_eq!(Format::Umd.bundler_format(), Format::Cjs);
        assert_eq!(Format::Esm.bundler_format(), Format::Esm);
        assert_eq!(Format::Cjs.to_string(), "cjs");
    }
}

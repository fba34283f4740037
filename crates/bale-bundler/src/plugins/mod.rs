//! Pipeline plugins.
//!
//! A closed set of plugin kinds, each answering the same hooks. Hooks a kind
//! has no use for are no-ops. The composer ([`compose`]) decides the order;
//! the bundler backend drives the module-level hooks (`resolve_id`, `load`,
//! `transform`) and the executor drives the chunk-level ones (`render_chunk`,
//! `build_end`).

mod compose;
mod evaluate;
mod license;
mod polyfill;
mod replace_module;
mod replace_text;
mod umd;
mod visualize;
mod warnings;

use std::path::{Path, PathBuf};

use crate::diagnostics::BundlerDiagnostic;

pub use compose::{ComposeContext, compose};
pub use evaluate::EvaluatePlugin;
pub use license::{LicenseEntry, LicenseLedger, LicensePlugin};
pub use polyfill::PolyfillPlugin;
pub use replace_module::ReplaceModulePlugin;
pub use replace_text::ReplaceTextPlugin;
pub use umd::{UMD_BANNER, UmdWrapPlugin};
pub use visualize::VisualizePlugin;
pub use warnings::WarnEscalatePlugin;

use crate::Result;
use crate::runtime::Runtime;

/// Prefix of module ids served from memory rather than disk.
pub const VIRTUAL_PREFIX: &str = "\0bale:";

/// Where a specifier resolves to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolution {
    /// A module id; virtual ids are served by a plugin's `load` hook.
    Module(String),
    /// Left unbundled and imported under this specifier.
    External(String),
}

/// A file produced next to the artifact (license manifest, reports).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SideOutput {
    pub path: PathBuf,
    pub contents: String,
}

/// What a finished bundler pass reports to `build_end` hooks.
#[derive(Debug, Clone, Copy)]
pub struct BuildReport<'a> {
    /// Output path relative to the distribution root.
    pub output: &'a str,
    pub warnings: &'a [BundlerDiagnostic],
    /// Ids of every module in the artifact.
    pub modules: &'a [String],
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PluginKind {
    Evaluate,
    ReplaceModule,
    Polyfill,
    ReplaceText,
    License,
    Visualize,
    WarnEscalate,
    UmdWrap,
}

#[derive(Debug, Clone)]
pub enum PipelinePlugin {
    Evaluate(EvaluatePlugin),
    ReplaceModule(ReplaceModulePlugin),
    Polyfill(PolyfillPlugin),
    ReplaceText(ReplaceTextPlugin),
    License(LicensePlugin),
    Visualize(VisualizePlugin),
    WarnEscalate(WarnEscalatePlugin),
    UmdWrap(UmdWrapPlugin),
}

impl PipelinePlugin {
    pub fn kind(&self) -> PluginKind {
        match self {
            PipelinePlugin::Evaluate(_) => PluginKind::Evaluate,
            PipelinePlugin::ReplaceModule(_) => PluginKind::ReplaceModule,
            PipelinePlugin::Polyfill(_) => PluginKind::Polyfill,
            PipelinePlugin::ReplaceText(_) => PluginKind::ReplaceText,
            PipelinePlugin::License(_) => PluginKind::License,
            PipelinePlugin::Visualize(_) => PluginKind::Visualize,
            PipelinePlugin::WarnEscalate(_) => PluginKind::WarnEscalate,
            PipelinePlugin::UmdWrap(_) => PluginKind::UmdWrap,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind() {
            PluginKind::Evaluate => "bale:evaluate",
            PluginKind::ReplaceModule => "bale:replace-module",
            PluginKind::Polyfill => "bale:polyfill",
            PluginKind::ReplaceText => "bale:replace-text",
            PluginKind::License => "bale:license",
            PluginKind::Visualize => "bale:visualize",
            PluginKind::WarnEscalate => "bale:warn-escalate",
            PluginKind::UmdWrap => "bale:umd-wrap",
        }
    }

    pub fn resolve_id(&self, specifier: &str, importer: Option<&str>) -> Option<Resolution> {
        match self {
            PipelinePlugin::ReplaceModule(plugin) => plugin.resolve_id(specifier, importer),
            PipelinePlugin::Polyfill(plugin) => plugin.resolve_id(specifier),
            _ => None,
        }
    }

    pub async fn load(&self, id: &str, runtime: &dyn Runtime) -> Result<Option<String>> {
        match self {
            PipelinePlugin::Evaluate(plugin) => plugin.load(id, runtime).await,
            PipelinePlugin::ReplaceModule(plugin) => Ok(plugin.load(id)),
            PipelinePlugin::Polyfill(plugin) => Ok(plugin.load(id)),
            _ => Ok(None),
        }
    }

    pub fn transform(&self, id: &str, code: &str) -> Result<Option<String>> {
        match self {
            PipelinePlugin::ReplaceText(plugin) => plugin.transform(id, code),
            PipelinePlugin::Visualize(plugin) => {
                plugin.observe(id, code);
                Ok(None)
            }
            _ => Ok(None),
        }
    }

    pub fn render_chunk(&self, code: &str) -> Option<String> {
        match self {
            PipelinePlugin::UmdWrap(plugin) => Some(plugin.wrap(code)),
            _ => None,
        }
    }

    pub async fn build_end(
        &self,
        report: &BuildReport<'_>,
        runtime: &dyn Runtime,
        licenses: &LicenseLedger,
    ) -> Result<Vec<SideOutput>> {
        match self {
            PipelinePlugin::WarnEscalate(plugin) => {
                plugin.check(report)?;
                Ok(Vec::new())
            }
            PipelinePlugin::License(plugin) => {
                Ok(vec![plugin.manifest(report, runtime, licenses).await?])
            }
            PipelinePlugin::Visualize(plugin) => Ok(plugin.reports(report)),
            _ => Ok(Vec::new()),
        }
    }
}

/// Forward-slash form of a module id for suffix matching.
pub(crate) fn normalize_id(id: &str) -> String {
    id.replace('\\', "/")
}

/// Whether `path` is inside a `node_modules` package, and which one.
pub(crate) fn package_root(id: &str) -> Option<PathBuf> {
    let id = normalize_id(id);
    let index = id.rfind("/node_modules/")?;
    let base = &id[..index + "/node_modules/".len()];
    let mut segments = id[base.len()..].split('/');
    let first = segments.next()?;
    let package = if first.starts_with('@') {
        format!("{}/{}", first, segments.next()?)
    } else {
        first.to_string()
    };
    Some(Path::new(base).join(package))
}

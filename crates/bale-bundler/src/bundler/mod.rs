//! The bundler seam.
//!
//! The executor describes each pass as a [`BundleRequest`] and gets back the
//! emitted code. Nothing here writes to disk.

mod adapter;
mod backend;

use std::path::PathBuf;

use async_trait::async_trait;
use bale_config::Target;

pub use adapter::PipelinePluginAdapter;
pub use backend::RolldownBundler;

use crate::Result;
use crate::diagnostics::BundlerDiagnostic;
use crate::plugins::PipelinePlugin;
use crate::variant::{DefineMap, Format};

/// One bundler pass.
#[derive(Debug, Clone)]
pub struct BundleRequest {
    pub entry: PathBuf,
    pub cwd: PathBuf,
    /// Never [`Format::Umd`]; wrapping happens in `render_chunk`.
    pub format: Format,
    pub platform: Target,
    pub minify: bool,
    pub external: Vec<String>,
    /// Constant injection, applied by the bundler to identifiers and member
    /// expressions only.
    pub define: DefineMap,
    /// Syntax lowering target for the emitted code; empty leaves it modern.
    pub runtime_target: Vec<String>,
    pub plugins: Vec<PipelinePlugin>,
}

/// Result of one bundler pass, before chunk hooks run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BundleArtifact {
    pub code: String,
    /// Ids of the modules in the chunk.
    pub modules: Vec<String>,
    pub warnings: Vec<BundlerDiagnostic>,
}

#[async_trait]
pub trait Bundler: Send + Sync + std::fmt::Debug {
    async fn bundle(&self, request: &BundleRequest) -> Result<BundleArtifact>;
}

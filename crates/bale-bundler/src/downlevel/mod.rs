//! Legacy-syntax downlevel pass.
//!
//! [`DownlevelConfig`] is derived from a descriptor by
//! [`DownlevelConfig::for_descriptor`]; a [`DownlevelTransform`] applies it to
//! the primary-pass output of a variant.

mod config;
mod oxc;
mod spread;

use std::path::Path;

pub use config::{DownlevelConfig, ObjectSpread, SourceKind};
pub use oxc::OxcDownlevel;

use crate::Result;

/// Syntax-lowering transform applied between the primary build and the rewrap.
///
/// Implementations are CPU-bound and synchronous; the executor calls them
/// between two filesystem operations.
pub trait DownlevelTransform: Send + Sync + std::fmt::Debug {
    /// Lower `source` (the content of `path`) according to `config`.
    fn transform(&self, source: &str, path: &Path, config: &DownlevelConfig) -> Result<String>;
}

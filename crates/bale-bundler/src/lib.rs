#![cfg_attr(docsrs, feature(doc_cfg))]

//! # bale-bundler
//!
//! The bundle-variant build pipeline: turns one [`BundleDescriptor`] plus the
//! invocation's [`GlobalBuildOptions`] into physical artifacts.
//!
//! The flow is descriptor → [`variant::resolve`] → [`plugins::compose`] →
//! [`executor::BuildExecutor`] → [`Pipeline::build`], which hands the caller a
//! lazy stream of [`BuildEvent`]s.
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use bale_bundler::{BuildEvent, Pipeline};
//! use bale_config::{GlobalBuildOptions, Project};
//! use tokio_stream::StreamExt;
//!
//! # #[tokio::main]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let project = Arc::new(Project::load(".")?);
//! let pipeline = Pipeline::new(project.clone());
//! let options = GlobalBuildOptions::default();
//!
//! for descriptor in project.bundles() {
//!     let events = pipeline.build(descriptor, &options);
//!     tokio::pin!(events);
//!     while let Some(event) = events.next().await {
//!         if let BuildEvent::Completed { absolute_path, .. } = event? {
//!             println!("wrote {}", absolute_path.display());
//!         }
//!     }
//! }
//! # Ok(()) }
//! ```

pub mod bundler;
pub mod diagnostics;
pub mod downlevel;
pub mod executor;
pub mod plugins;
pub mod runtime;
pub mod stream;
pub mod variant;

// Logging utilities (optional, enabled with "logging" feature)
#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub mod logging;

#[cfg(feature = "logging")]
#[cfg_attr(docsrs, doc(cfg(feature = "logging")))]
pub use logging::{LogLevel, init_logging, init_logging_from_env};

// Test utilities (unit tests, and integration tests through the `test-utils` feature)
#[cfg(any(test, feature = "test-utils"))]
pub mod test_utils;

pub use bale_config::{BundleDescriptor, GlobalBuildOptions, Project, Target};
pub use bundler::{BundleArtifact, BundleRequest, Bundler, RolldownBundler};
pub use diagnostics::{BundlerDiagnostic, DiagnosticSeverity};
pub use downlevel::{DownlevelConfig, DownlevelTransform, OxcDownlevel};
pub use executor::{BuildExecutor, BuiltArtifact};
pub use plugins::{BuildReport, PipelinePlugin, PluginKind, Resolution, SideOutput};
pub use runtime::{NativeRuntime, Runtime, RuntimeError, RuntimeResult};
pub use stream::{BuildEvent, Pipeline};
pub use variant::{DefineMap, Format, VariantConfig, Variants};

/// Error types for bale-bundler operations.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Descriptor or manifest problem, caught before any bundler invocation.
    #[error("Configuration error: {0}")]
    Config(#[from] bale_config::ConfigError),

    /// Error from the bundling backend.
    #[error("Bundler error: {}", format_messages(.0))]
    Bundler(Vec<BundlerDiagnostic>),

    /// The bundler reported warnings; every warning fails the build.
    #[error("Build of {output} produced {} warning(s): {}", .warnings.len(), format_messages(.warnings))]
    EscalatedWarnings {
        output: String,
        warnings: Vec<BundlerDiagnostic>,
    },

    /// The legacy-syntax transform rejected the primary output.
    #[error("Downlevel transform failed for {path}: {message}")]
    Downlevel { path: String, message: String },

    /// I/O error with context message.
    #[error("{message}")]
    IoError {
        message: String,
        #[source]
        source: RuntimeError,
    },

    /// Error raised inside a pipeline plugin hook.
    #[error("Plugin {plugin} failed: {message}")]
    Plugin {
        plugin: &'static str,
        message: String,
    },

    /// Invalid output path (e.g., directory traversal attempt).
    #[error("Invalid output path: {0}")]
    InvalidOutputPath(String),
}

/// Result type alias for bale-bundler operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a bundler error from a rolldown error batch.
    pub fn from_rolldown_batch(batch: &rolldown_error::BatchedBuildDiagnostic) -> Self {
        Error::Bundler(diagnostics::extract_from_rolldown(batch.iter()))
    }

    pub(crate) fn plugin(plugin: &'static str, message: impl Into<String>) -> Self {
        Error::Plugin {
            plugin,
            message: message.into(),
        }
    }

    pub(crate) fn io(context: impl Into<String>, source: RuntimeError) -> Self {
        Error::IoError {
            message: context.into(),
            source,
        }
    }
}

fn format_messages(diagnostics: &[BundlerDiagnostic]) -> String {
    match diagnostics {
        [] => "Unknown bundler error".to_string(),
        [single] => single.to_string(),
        many => many
            .iter()
            .map(ToString::to_string)
            .collect::<Vec<_>>()
            .join("; "),
    }
}

fn first_help(diagnostics: &[BundlerDiagnostic]) -> Option<&str> {
    diagnostics.iter().find_map(|d| d.help.as_deref())
}

impl miette::Diagnostic for Error {
    fn code(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        Some(Box::new(match self {
            Error::Config(_) => "CONFIG_ERROR",
            Error::Bundler(_) => "BUNDLER_ERROR",
            Error::EscalatedWarnings { .. } => "ESCALATED_WARNINGS",
            Error::Downlevel { .. } => "DOWNLEVEL_ERROR",
            Error::IoError { .. } => "IO_ERROR",
            Error::Plugin { .. } => "PLUGIN_ERROR",
            Error::InvalidOutputPath(_) => "INVALID_OUTPUT_PATH",
        }))
    }

    fn severity(&self) -> Option<miette::Severity> {
        Some(miette::Severity::Error)
    }

    fn help(&self) -> Option<Box<dyn std::fmt::Display + '_>> {
        match self {
            Error::Config(_) => Some(Box::new(
                "Check bale.toml / bale.json and package.json. Nothing was built.",
            )),
            Error::Bundler(diagnostics) => first_help(diagnostics)
                .map(|help| Box::new(help) as Box<dyn std::fmt::Display + '_>),
            Error::EscalatedWarnings { warnings, .. } => Some(match first_help(warnings) {
                Some(help) => Box::new(help),
                None => Box::new(
                    "Warnings are fatal. Fix the reported issue or mark the module as external.",
                ),
            }),
            Error::Downlevel { path, .. } => Some(Box::new(format!(
                "The untransformed primary output was left at {path}; it is not a finished artifact.",
            ))),
            Error::InvalidOutputPath(path) => Some(Box::new(format!(
                "The output path '{path}' is invalid. Ensure it stays inside the distribution root.",
            ))),
            Error::IoError { .. } => Some(Box::new(
                "Failed to read or write a build file. Check disk space and permissions.",
            )),
            _ => None,
        }
    }
}

//! Configuration types for bale.
//!
//! This crate owns everything the build pipeline reads but never mutates:
//! bundle descriptors loaded from the project manifest, the per-invocation
//! [`GlobalBuildOptions`], and the project's package metadata. All of it is
//! materialized once into a [`Project`] value that callers pass explicitly to
//! the bundler; nothing here is cached process-wide.

pub mod descriptor;
pub mod error;
pub mod manifest;
pub mod metadata;
pub mod options;
pub mod project;
pub mod validation;

pub use descriptor::{BundleDescriptor, ModuleReplacement, SyntaxPlugin, Target, TextReplaceRule};
pub use error::{ConfigError, Result};
pub use manifest::{Manifest, ManifestDiscovery};
pub use metadata::PackageMetadata;
pub use options::{GlobalBuildOptions, ReportFormat};
pub use project::Project;
pub use validation::{validate_descriptor, validate_manifest};

//! Command implementations.
//!
//! - [`build`] - Build every bundle in the manifest
//! - [`list`] - Print the variants a build would produce

pub mod build;
pub mod list;
pub(crate) mod utils;

pub use build::execute as build_execute;
pub use list::execute as list_execute;

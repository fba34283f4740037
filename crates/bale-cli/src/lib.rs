//! # bale-cli
//!
//! The `bale` binary. It loads the project once, layers the build options and
//! drives [`bale_bundler::Pipeline::build`] for each bundle in the manifest,
//! printing one line per build event.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;
pub mod logger;
pub mod ui;

pub use error::{CliError, Result};

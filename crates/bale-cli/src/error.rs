//! Error handling for the bale CLI.
//!
//! [`CliError`] is what every command returns. Library errors convert into it
//! through `#[from]`; `main` hands it to [`cli_error_to_miette`] for the final
//! report.

use std::path::PathBuf;

use thiserror::Error;

mod miette;

pub use self::miette::cli_error_to_miette;

/// Top-level CLI error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Manifest, descriptor or package metadata problems
    #[error("Configuration error: {0}")]
    Config(#[from] bale_config::ConfigError),

    /// A variant build failed; the stream stopped at this error
    #[error("Build error: {0}")]
    Build(#[from] bale_bundler::Error),

    /// Flags or `BALE_*` variables that could not be layered into options
    #[error("Invalid option: {0}")]
    InvalidOption(String),

    /// File or directory not found
    #[error("File not found: {}", .0.display())]
    FileNotFound(PathBuf),

    /// I/O errors from file system operations
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

//! Error types for manifest loading and descriptor validation.

use std::path::PathBuf;

use thiserror::Error;

pub type Result<T> = std::result::Result<T, ConfigError>;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no bale.toml or bale.json found in {}", .0.display())]
    NotFound(PathBuf),

    #[error("unsupported manifest format: {}", .0.display())]
    UnsupportedFormat(PathBuf),

    #[error("invalid config value for '{field}'{}", hint_suffix(.hint))]
    InvalidValue { field: String, hint: Option<String> },

    // Descriptor-level problems found before any bundler invocation
    #[error("bundle '{bundle}': {message}")]
    InvalidDescriptor { bundle: String, message: String },

    #[error("bundle '{bundle}': unknown syntax plugin '{plugin}'")]
    UnknownSyntaxPlugin { bundle: String, plugin: String },

    #[error("duplicate bundle output '{0}'")]
    DuplicateOutput(String),

    #[error("package metadata: {0}")]
    Metadata(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl ConfigError {
    pub(crate) fn descriptor(bundle: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            bundle: bundle.into(),
            message: message.into(),
        }
    }
}

fn hint_suffix(hint: &Option<String>) -> String {
    hint.as_ref().map(|h| format!(": {h}")).unwrap_or_default()
}

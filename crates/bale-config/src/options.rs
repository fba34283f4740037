//! Process-scope build options supplied once per invocation.

use std::collections::BTreeSet;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Bundle-composition report formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportFormat {
    Json,
    Html,
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Json => "json",
            ReportFormat::Html => "html",
        }
    }
}

impl std::str::FromStr for ReportFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "json" => Ok(ReportFormat::Json),
            "html" => Ok(ReportFormat::Html),
            other => Err(format!("Invalid report format: {other}. Expected: json, html")),
        }
    }
}

/// Options shared by every descriptor built in one invocation.
///
/// Read-only for the duration of a build; no component mutates it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GlobalBuildOptions {
    /// Overrides every descriptor's minification setting when present.
    #[serde(default)]
    pub minify: Option<bool>,

    /// Run the legacy-syntax downlevel pass.
    #[serde(default = "default_true")]
    pub downlevel: bool,

    /// Only build these outputs (paths relative to the distribution root).
    #[serde(default)]
    pub files: Option<BTreeSet<String>>,

    /// Only build UMD outputs.
    #[serde(default)]
    pub playground: bool,

    /// Rename the single output of the build.
    #[serde(default)]
    pub save_as: Option<String>,

    /// Where the license manifest is written; disables license extraction when unset.
    #[serde(default)]
    pub license_sink: Option<PathBuf>,

    /// Bundle-composition reports to produce.
    #[serde(default)]
    pub reports: Vec<ReportFormat>,
}

fn default_true() -> bool {
    true
}

impl Default for GlobalBuildOptions {
    fn default() -> Self {
        Self {
            minify: None,
            downlevel: true,
            files: None,
            playground: false,
            save_as: None,
            license_sink: None,
            reports: Vec::new(),
        }
    }
}

impl GlobalBuildOptions {
    /// Whether the restricting file set (if any) selects `output`.
    pub fn selects_file(&self, output: &str) -> bool {
        match &self.files {
            Some(files) => files.contains(output),
            None => true,
        }
    }

    pub fn with_files<I, S>(mut self, files: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.files = Some(files.into_iter().map(Into::into).collect());
        self
    }
}

//! Structured diagnostics extracted from rolldown.
//!
//! Bundler errors and warnings are reduced to [`BundlerDiagnostic`] right at
//! the backend boundary, so nothing past it depends on rolldown's error types.

use std::fmt;

use rolldown_error::{BuildDiagnostic, Severity};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DiagnosticSeverity {
    Error,
    Warning,
}

/// One bundler error or warning.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BundlerDiagnostic {
    /// Event kind as rolldown names it, e.g. `PARSE_ERROR` or `EVAL`.
    pub kind: String,
    pub severity: DiagnosticSeverity,
    pub message: String,
    pub file: Option<String>,
    /// 1-based.
    pub line: Option<usize>,
    /// 1-based.
    pub column: Option<usize>,
    pub help: Option<String>,
}

impl BundlerDiagnostic {
    pub fn error(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Error, kind, message)
    }

    pub fn warning(kind: impl Into<String>, message: impl Into<String>) -> Self {
        Self::with_severity(DiagnosticSeverity::Warning, kind, message)
    }

    fn with_severity(
        severity: DiagnosticSeverity,
        kind: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind: kind.into(),
            severity,
            message: message.into(),
            file: None,
            line: None,
            column: None,
            help: None,
        }
    }

    pub fn with_help(mut self, help: impl Into<String>) -> Self {
        self.help = Some(help.into());
        self
    }

    /// Extract kind, message, location and help from a rolldown diagnostic.
    pub fn from_rolldown(diagnostic: &BuildDiagnostic) -> Self {
        let rendered = diagnostic.to_diagnostic();
        let location = rendered.get_primary_location();

        Self {
            kind: diagnostic.kind().to_string(),
            severity: match diagnostic.severity() {
                Severity::Error => DiagnosticSeverity::Error,
                Severity::Warning => DiagnosticSeverity::Warning,
            },
            message: diagnostic.to_string(),
            file: location
                .as_ref()
                .map(|(file, ..)| file.clone())
                .or_else(|| diagnostic.id()),
            line: location.as_ref().map(|(_, line, ..)| *line),
            column: location.as_ref().map(|(_, _, column, _)| column + 1),
            help: extract_help(&rendered.convert_to_string(false)),
        }
    }
}

impl fmt::Display for BundlerDiagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.kind, self.message)?;
        match (&self.file, self.line, self.column) {
            (Some(file), Some(line), Some(column)) => write!(f, " ({file}:{line}:{column})"),
            (Some(file), Some(line), None) => write!(f, " ({file}:{line})"),
            (Some(file), None, _) => write!(f, " ({file})"),
            (None, ..) => Ok(()),
        }
    }
}

/// Convert every diagnostic in a rolldown batch.
pub fn extract_from_rolldown<'a>(
    diagnostics: impl IntoIterator<Item = &'a BuildDiagnostic>,
) -> Vec<BundlerDiagnostic> {
    diagnostics
        .into_iter()
        .map(BundlerDiagnostic::from_rolldown)
        .collect()
}

/// Help text from a rendered report (`Help: ...` line).
fn extract_help(rendered: &str) -> Option<String> {
    rendered.lines().find_map(|line| {
        let (_, help) = line.split_once("Help:")?;
        let help = help.trim();
        (!help.is_empty()).then(|| help.to_string())
    })
}

//! Warning escalation: any bundler warning fails the build.

use tracing::error;

use super::BuildReport;
use crate::{Error, Result};

#[derive(Debug, Clone, Default)]
pub struct WarnEscalatePlugin;

impl WarnEscalatePlugin {
    pub fn new() -> Self {
        Self
    }

    pub fn check(&self, report: &BuildReport<'_>) -> Result<()> {
        if report.warnings.is_empty() {
            return Ok(());
        }

        for warning in report.warnings {
            error!(output = report.output, "{warning}");
        }
        Err(Error::EscalatedWarnings {
            output: report.output.to_string(),
            warnings: report.warnings.to_vec(),
        })
    }
}

//! Miette diagnostic conversion for CLI errors.

use miette::Report;

use crate::error::CliError;

/// Convert a [`CliError`] into a miette report.
///
/// Bundler errors already carry codes and help text, so they are reported
/// as diagnostics rather than flattened into a message.
pub fn cli_error_to_miette(err: CliError) -> Report {
    match err {
        CliError::Build(e) => Report::new(e),
        CliError::Config(bale_config::ConfigError::NotFound(dir)) => miette::miette!(
            help = "Run bale from the package root, or pass --cwd / --config",
            "Configuration error: no bale.toml or bale.json found in {}",
            dir.display()
        ),
        CliError::Config(e) => miette::miette!(
            help = "Check bale.toml / bale.json and package.json. Nothing was built.",
            "Configuration error: {}",
            e
        ),
        CliError::FileNotFound(path) => miette::miette!(
            help = "Pass --cwd or --config to point at the project",
            "File not found: {}",
            path.display()
        ),
        _ => miette::miette!("{}", err),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_error_keeps_diagnostic_code() {
        let err = CliError::Build(bale_bundler::Error::InvalidOutputPath("../x.js".to_string()));
        let report = cli_error_to_miette(err);
        assert_eq!(
            report.code().map(|code| code.to_string()).as_deref(),
            Some("INVALID_OUTPUT_PATH")
        );
    }

    #[test]
    fn test_config_error_has_help() {
        let err = CliError::Config(bale_config::ConfigError::DuplicateOutput("a.js".to_string()));
        let report = cli_error_to_miette(err);
        assert!(report.to_string().contains("duplicate bundle output 'a.js'"));
        assert!(report.help().is_some());
    }
}

//! Layered build options.
//!
//! Priority: command-line flags > `BALE_*` environment variables > defaults.
//! Environment keys are the option names, e.g. `BALE_DOWNLEVEL=false`,
//! `BALE_SAVE_AS=bale.js` or `BALE_REPORTS=[json,html]`.

use std::collections::BTreeSet;
use std::path::PathBuf;

use bale_config::{GlobalBuildOptions, ReportFormat};
use figment::{
    Figment,
    providers::{Env, Serialized},
};
use serde::Serialize;

use crate::cli::OptionArgs;
use crate::error::{CliError, Result};

/// Only the flags that were actually given, so absent flags never mask the
/// environment.
#[derive(Debug, Default, Serialize)]
struct FlagOverrides {
    #[serde(skip_serializing_if = "Option::is_none")]
    minify: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    downlevel: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    files: Option<BTreeSet<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    playground: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    save_as: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    license_sink: Option<PathBuf>,
    #[serde(skip_serializing_if = "Option::is_none")]
    reports: Option<Vec<ReportFormat>>,
}

impl From<&OptionArgs> for FlagOverrides {
    fn from(args: &OptionArgs) -> Self {
        Self {
            minify: args.minify_override(),
            downlevel: args.no_downlevel.then_some(false),
            files: (!args.file.is_empty()).then(|| args.file.iter().cloned().collect()),
            playground: args.playground.then_some(true),
            save_as: args.save_as.clone(),
            license_sink: args.license_sink.clone(),
            reports: (!args.report.is_empty()).then(|| args.report.clone()),
        }
    }
}

/// Resolve the [`GlobalBuildOptions`] for this invocation.
pub fn load_options(args: &OptionArgs) -> Result<GlobalBuildOptions> {
    let options: GlobalBuildOptions = Figment::new()
        .merge(Serialized::defaults(GlobalBuildOptions::default()))
        .merge(Env::prefixed("BALE_"))
        .merge(Serialized::defaults(FlagOverrides::from(args)))
        .extract()
        .map_err(|e| CliError::InvalidOption(e.to_string()))?;

    tracing::debug!(?options, "resolved build options");
    Ok(options)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serial_test::serial;

    fn clear_env() {
        unsafe {
            for key in [
                "BALE_MINIFY",
                "BALE_DOWNLEVEL",
                "BALE_PLAYGROUND",
                "BALE_SAVE_AS",
                "BALE_REPORTS",
            ] {
                std::env::remove_var(key);
            }
        }
    }

    #[test]
    #[serial]
    fn test_defaults_without_flags_or_env() {
        clear_env();
        let options = load_options(&OptionArgs::default()).unwrap();
        assert_eq!(options, GlobalBuildOptions::default());
    }

    #[test]
    #[serial]
    fn test_env_overrides_defaults() {
        clear_env();
        unsafe {
            std::env::set_var("BALE_DOWNLEVEL", "false");
            std::env::set_var("BALE_SAVE_AS", "bale.js");
            std::env::set_var("BALE_REPORTS", "[json, html]");
        }

        let options = load_options(&OptionArgs::default()).unwrap();
        assert!(!options.downlevel);
        assert_eq!(options.save_as.as_deref(), Some("bale.js"));
        assert_eq!(options.reports, vec![ReportFormat::Json, ReportFormat::Html]);
        clear_env();
    }

    #[test]
    #[serial]
    fn test_flags_override_env() {
        clear_env();
        unsafe {
            std::env::set_var("BALE_MINIFY", "true");
            std::env::set_var("BALE_PLAYGROUND", "true");
        }
        let args = OptionArgs {
            no_minify: true,
            file: vec!["index.js".to_string()],
            ..Default::default()
        };

        let options = load_options(&args).unwrap();
        assert_eq!(options.minify, Some(false));
        assert!(options.playground);
        assert!(options.selects_file("index.js"));
        assert!(!options.selects_file("doc.js"));
        clear_env();
    }

    #[test]
    #[serial]
    fn test_invalid_env_value_is_reported() {
        clear_env();
        unsafe {
            std::env::set_var("BALE_DOWNLEVEL", "sometimes");
        }
        let err = load_options(&OptionArgs::default()).unwrap_err();
        assert!(matches!(err, CliError::InvalidOption(_)));
        clear_env();
    }
}

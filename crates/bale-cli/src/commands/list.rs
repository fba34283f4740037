//! `bale list`: resolve variants without building them.

use std::io::Write;

use bale_bundler::variant;

use crate::cli::ListArgs;
use crate::commands::utils;
use crate::config;
use crate::error::Result;

/// Print one line per variant to stdout: name, format, minification, and
/// whether the current options would skip it.
pub fn execute(args: ListArgs) -> Result<()> {
    let project = utils::load_project(&args.project)?;
    let options = config::load_options(&args.options)?;

    let mut out = std::io::stdout().lock();
    for descriptor in project.bundles() {
        for variant in variant::resolve(&project, descriptor, &options)? {
            let status = if variant.is_selected(&options) {
                ""
            } else {
                "  (skipped)"
            };
            let renamed = if variant.relative_output != variant.name {
                format!(" -> {}", variant.relative_output)
            } else {
                String::new()
            };
            writeln!(
                out,
                "{:<32} {:<4} minify={}{}{}",
                variant.name, variant.format, variant.minify, renamed, status
            )?;
        }
    }
    Ok(())
}

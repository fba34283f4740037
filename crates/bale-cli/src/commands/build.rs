//! `bale build`: drive the result stream for every descriptor.

use std::collections::BTreeSet;
use std::sync::Arc;
use std::time::Instant;

use bale_bundler::{BuildEvent, GlobalBuildOptions, Pipeline};
use tokio_stream::StreamExt;

use crate::cli::BuildArgs;
use crate::commands::utils;
use crate::config;
use crate::error::Result;
use crate::ui::{self, Spinner};

/// Counts reported in the closing summary line.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct BuildSummary {
    pub built: usize,
    pub skipped: usize,
    /// Every variant name the stream reported, built or not.
    pub seen: BTreeSet<String>,
}

impl BuildSummary {
    fn record(&mut self, event: &BuildEvent) {
        match event {
            BuildEvent::Skipped { .. } => self.skipped += 1,
            BuildEvent::Completed { .. } => self.built += 1,
            BuildEvent::Started { .. } => {}
        }
        self.seen.insert(event.name().to_string());
    }

    /// `--file` entries that no variant answered to.
    pub fn unmatched_files(&self, options: &GlobalBuildOptions) -> Vec<String> {
        options
            .files
            .iter()
            .flatten()
            .filter(|file| !self.seen.contains(*file))
            .cloned()
            .collect()
    }
}

/// Execute the build command.
///
/// 1. Load the project (manifest + package.json) once
/// 2. Layer the build options (flags > `BALE_*` env > defaults)
/// 3. Build each descriptor in manifest order, one variant at a time
///
/// The first failing variant ends the command; artifacts already written
/// stay on disk.
pub async fn execute(args: BuildArgs, quiet: bool) -> Result<BuildSummary> {
    let start = Instant::now();

    let project = Arc::new(utils::load_project(&args.project)?);
    let options = config::load_options(&args.options)?;
    let pipeline = Pipeline::new(Arc::clone(&project));
    let show_spinner = ui::use_spinner(quiet);

    if !quiet {
        ui::info(&format!(
            "Building {} bundle(s) into {}",
            project.bundles().len(),
            project.dist_dir().display()
        ));
    }

    let mut summary = BuildSummary::default();
    for descriptor in project.bundles() {
        let events = pipeline.build(descriptor, &options);
        tokio::pin!(events);

        let mut spinner: Option<Spinner> = None;
        while let Some(event) = events.next().await {
            let event = match event {
                Ok(event) => event,
                Err(err) => {
                    if let Some(spinner) = spinner.take() {
                        spinner.clear();
                    }
                    return Err(err.into());
                }
            };
            summary.record(&event);

            match event {
                BuildEvent::Skipped { name } => {
                    if !quiet {
                        ui::skipped(&format!("Skipped {name}"));
                    }
                }
                BuildEvent::Started { name } => {
                    let message = format!("Building {name}");
                    if !show_spinner && !quiet {
                        ui::info(&message);
                    }
                    spinner = Some(Spinner::new(&message, show_spinner));
                }
                BuildEvent::Completed {
                    name,
                    relative_path,
                    ..
                } => {
                    let message = if name == relative_path {
                        format!("Built {name}")
                    } else {
                        format!("Built {name} as {relative_path}")
                    };
                    match spinner.take() {
                        Some(spinner) if !spinner.is_hidden() => spinner.finish(&message),
                        _ if !quiet => ui::success(&message),
                        _ => {}
                    }
                }
            }
        }
    }

    if !quiet {
        for file in summary.unmatched_files(&options) {
            ui::warning(&format!("--file {file} did not match any variant"));
        }
        ui::success(&format!(
            "Built {} file(s), skipped {} in {:.2?}",
            summary.built,
            summary.skipped,
            start.elapsed()
        ));
    }

    Ok(summary)
}

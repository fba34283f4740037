use std::path::PathBuf;

use bale_config::ReportFormat;
use clap::{Args, Subcommand};

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build every bundle in the manifest
    ///
    /// Bundles are built in manifest order, one variant at a time. The first
    /// failure stops the build.
    Build(BuildArgs),

    /// List the variants a build would produce, without building
    List(ListArgs),
}

/// Where the project lives and which manifest describes it.
#[derive(Args, Debug, Clone, Default)]
pub struct ProjectArgs {
    /// Project root (defaults to the current directory)
    #[arg(long, value_name = "DIR")]
    pub cwd: Option<PathBuf>,

    /// Manifest to read instead of discovering bale.toml / bale.json
    #[arg(short, long, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

/// Flags that layer over `BALE_*` environment variables.
#[derive(Args, Debug, Clone, Default)]
pub struct OptionArgs {
    /// Only build this output (relative to the distribution root)
    ///
    /// May be given several times. Variants not named are reported as
    /// skipped.
    ///
    /// Examples:
    ///   bale build --file index.js
    ///   bale build --file standalone.js --file esm/standalone.mjs
    #[arg(long, value_name = "OUTPUT")]
    pub file: Vec<String>,

    /// Skip the legacy-syntax downlevel pass
    #[arg(long)]
    pub no_downlevel: bool,

    /// Minify every variant
    #[arg(long, conflicts_with = "no_minify")]
    pub minify: bool,

    /// Never minify
    #[arg(long)]
    pub no_minify: bool,

    /// Only build UMD outputs
    #[arg(long)]
    pub playground: bool,

    /// Rename the output of the build
    #[arg(long, value_name = "NAME")]
    pub save_as: Option<String>,

    /// Write a bundle-composition report (json or html)
    #[arg(long, value_name = "FORMAT")]
    pub report: Vec<ReportFormat>,

    /// Write the third-party license manifest to this path (relative to the
    /// project root)
    #[arg(long, value_name = "PATH")]
    pub license_sink: Option<PathBuf>,
}

impl OptionArgs {
    /// `Some` only when one of `--minify` / `--no-minify` was given.
    pub fn minify_override(&self) -> Option<bool> {
        match (self.minify, self.no_minify) {
            (true, _) => Some(true),
            (_, true) => Some(false),
            _ => None,
        }
    }
}

/// Arguments for the build command
#[derive(Args, Debug, Clone, Default)]
pub struct BuildArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub options: OptionArgs,
}

/// Arguments for the list command
#[derive(Args, Debug, Clone, Default)]
pub struct ListArgs {
    #[command(flatten)]
    pub project: ProjectArgs,

    #[command(flatten)]
    pub options: OptionArgs,
}

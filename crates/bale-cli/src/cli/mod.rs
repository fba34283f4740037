//! Command-line interface definition for bale.
//!
//! # Command Structure
//!
//! - `bale build` - Build every bundle in the manifest
//! - `bale list` - Show the variants a build would produce

mod commands;

use clap::Parser;

pub use commands::{BuildArgs, Command, ListArgs, OptionArgs, ProjectArgs};

/// Bale - bundle-variant builder for JavaScript packages
#[derive(Parser, Debug)]
#[command(
    name = "bale",
    version,
    about = "Build the distributable bundles of a JavaScript package",
    long_about = "Bale reads the bundle manifest (bale.toml or bale.json) and package.json,\n\
                  expands every bundle into its output variants (CommonJS, UMD, ESM) and\n\
                  builds them one after another."
)]
pub struct Cli {
    /// Enable verbose logging (debug level)
    ///
    /// Shows variant resolution and the phases of each build.
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress all output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

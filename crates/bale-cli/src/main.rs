use bale_cli::{cli, commands, error, logger, ui};
use clap::Parser;
use miette::Result;

#[tokio::main]
async fn main() -> Result<()> {
    let args = cli::Cli::parse();

    logger::init_logger(args.verbose, args.quiet, args.no_color);
    ui::init_colors(args.no_color);

    let result = match args.command {
        cli::Command::Build(build_args) => commands::build_execute(build_args, args.quiet)
            .await
            .map(|_| ()),
        cli::Command::List(list_args) => commands::list_execute(list_args),
    };

    result.map_err(error::cli_error_to_miette)
}

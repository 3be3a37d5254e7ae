//! Keystretch CLI - memory-hard key stretching with live progress
//!
//! Embeds a keystretch-core dispatcher in-process: the CLI sends it control
//! messages, polls its status to drive a progress bar and prints the result.

mod cli;
mod commands;
mod config;
mod constants;
mod errors;
mod logging;
mod output;
mod progress;

use clap::Parser;

use crate::cli::{Cli, Commands, ConfigSubcommand};
use crate::commands::{config as config_cmd, derive, misc};
use crate::errors::CliError;

fn main() {
    let cli = Cli::parse();
    logging::init_logging(cli.verbose);

    if let Err(err) = run(&cli) {
        let code = err
            .downcast_ref::<CliError>()
            .map(CliError::exit_code)
            .unwrap_or(1);
        eprintln!("Error: {:#}", err);
        std::process::exit(code);
    }
}

fn run(cli: &Cli) -> anyhow::Result<()> {
    match &cli.command {
        Commands::Derive(args) => derive::handle_derive(cli, args),
        Commands::Config(ConfigSubcommand::Init(args)) => config_cmd::handle_config_init(cli, args),
        Commands::Config(ConfigSubcommand::Show) => config_cmd::handle_config_show(cli),
        Commands::Completions(args) => misc::handle_completions(args.shell),
    }
}

//! `sslcert` command-line entry point.
use anyhow::Result;
use clap::Parser;
use std::sync::Arc;

use sslcert_cli::cli::{Cli, Command};
use sslcert_cli::{commands, logging};

fn main() -> Result<()> {
    let _ = enable_ansi_support::enable_ansi_support();
    let args = Cli::parse();

    if matches!(args.command, Command::Version) {
        commands::version::run();
        return Ok(());
    }

    let command = args.command.log_name();
    logging::init_subscriber(
        args.verbose,
        command,
        matches!(args.command, Command::Plan(_)),
    );
    let log = Arc::new(logging::Logger::new(command));
    log.debug(&format!("sslcert {}", commands::version::VERSION));

    match &args.command {
        Command::Plan(opts) => commands::plan::run(&args.global, opts, &log),
        Command::Apply(opts) => commands::apply::run(&args.global, opts, &log),
        Command::Remove(opts) => commands::remove::run(&args.global, opts, &log),
        Command::Version => Ok(()),
    }
}

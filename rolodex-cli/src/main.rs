//! Rolodex CLI - Command-line interface for Rolodex address books.

use clap::Parser;

use rolodex_cli::cli::{Cli, Command};
use rolodex_cli::commands::{self, Context};
use rolodex_cli::error::CliResult;
use rolodex_cli::output;

fn main() {
    let cli = Cli::parse();
    let pretty = cli.pretty;

    if let Err(e) = run(cli) {
        output::print_error(&e, pretty);
        output::error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> CliResult<()> {
    // Commands that do not touch the database
    match cli.command {
        Command::Version => return commands::version::run(),
        Command::Init(ref args) => return commands::init::run(args, &cli),
        _ => {}
    }

    let context = Context::from_cli(&cli)?;

    match cli.command {
        Command::Import(args) => commands::import::run(&context, args),
        Command::Find(args) => commands::find::run(&context, args),
        Command::Get(args) => commands::get::run(&context, args),
        Command::Remove(args) => commands::remove::run(&context, args),
        Command::Persons(args) => commands::persons::run(&context, args),
        Command::Books(args) => commands::books::run(&context, args),
        Command::Init(_) | Command::Version => Ok(()),
    }
}

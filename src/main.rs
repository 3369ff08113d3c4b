mod cli;

use clap::{Parser, Subcommand};

use cli::check::{cmd_check, CheckArgs};
use cli::run::{cmd_run, RunArgs};

#[derive(Parser)]
#[command(
    name = "fission-opt",
    version,
    about = "Overhauled fission reactor layout search"
)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Search for the best layout under a settings file
    Run(RunArgs),
    /// Validate a settings file and list its cell types
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();

    match cli.command {
        Command::Run(args) => cmd_run(args),
        Command::Check(args) => cmd_check(args),
    }
}

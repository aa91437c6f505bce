//! Genesis CLI - submit test definitions and follow their runs

use std::io::IsTerminal;

use clap::Parser;
use genesis::common::{config::Config, logging};
use genesis::{cli, commands::Commands};

#[derive(Parser)]
#[command(name = "genesis", about = "Run tests on the Genesis test execution platform")]
#[command(version, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e}");
            std::process::exit(1);
        }
    };

    logging::init_cli(&config.verbosity);

    if !std::io::stdout().is_terminal() {
        colored::control::set_override(false);
    }

    if let Err(e) = cli::dispatch(cli.command, &config).await {
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

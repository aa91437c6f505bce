//! CLI command handling
//!
//! Dispatches parsed CLI commands to their implementations.

use crate::commands::Commands;
use crate::common::config::Config;
use crate::common::Result;
use crate::run;

/// Dispatch a CLI command
pub async fn dispatch(command: Commands, config: &Config) -> Result<()> {
    match command {
        Commands::Run(args) => run::run(config, args.into()).await,
    }
}

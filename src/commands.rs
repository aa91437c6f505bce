//! CLI command definitions
//!
//! Defines the clap commands for the genesis CLI.

use clap::{Args, Subcommand};
use std::path::PathBuf;

use crate::api::RunMeta;
use crate::run::RunOptions;

#[derive(Subcommand)]
pub enum Commands {
    /// Run the tests in a definition file
    ///
    /// The first time, pass the organization to deploy to. Later runs reuse
    /// it until another one is given.
    Run(RunArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Path to the test definition file
    pub file: PathBuf,

    /// Organization to deploy to (remembered for later runs)
    pub org: Option<String>,

    /// Don't assign DNS names to the deployment
    #[arg(long, short = 'd')]
    pub no_dns: bool,

    /// Deploy from a docker compose file
    #[arg(long, short = 'c')]
    pub docker_compose: bool,

    /// Don't wait for completion, exit right after submitting
    #[arg(long, short = 'a')]
    pub no_await: bool,

    /// Keep failed deployments around longer for inspection
    #[arg(long)]
    pub debug_mode: bool,

    /// Username for a private docker registry
    #[arg(long, short = 'u')]
    pub docker_username: Option<String>,

    /// Password for a private docker registry
    #[arg(long, short = 'p')]
    pub docker_password: Option<String>,

    /// Token for a private docker registry
    #[arg(long)]
    pub docker_token: Option<String>,

    /// DNS name for the first test (random by default)
    #[arg(long, hide = true)]
    pub first_dns_name: Option<String>,
}

impl From<RunArgs> for RunOptions {
    fn from(args: RunArgs) -> Self {
        RunOptions {
            file: args.file,
            org: args.org,
            no_dns: args.no_dns,
            docker_compose: args.docker_compose,
            no_await: args.no_await,
            first_dns_name: args.first_dns_name,
            meta: RunMeta {
                debug_mode: args.debug_mode,
                docker_username: args.docker_username,
                docker_password: args.docker_password,
                docker_token: args.docker_token,
            },
        }
    }
}

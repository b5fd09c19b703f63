use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use armapimanagement::{ClientFactory, ClientOptions};
use armkit_identity::EnvironmentCredential;
use clap::{Parser, Subcommand};

mod backend;
mod common;
mod gateway;
mod logging;
mod operation;
mod report;

/// Inspect and manage Azure API Management resources
#[derive(Parser)]
#[command(name = "apim")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// YAML file with client options, layered under `APIM_*` variables
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Subscription that owns the resources
    #[arg(long, env = "AZURE_SUBSCRIPTION_ID", global = true)]
    subscription: Option<String>,

    /// Log verbosity when `RUST_LOG` is unset (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit logs as JSON lines instead of compact text
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Backends of a service
    #[command(subcommand)]
    Backend(backend::BackendCommand),
    /// Standalone gateways
    #[command(subcommand)]
    Gateway(gateway::GatewayCommand),
    /// Operations of an API
    #[command(subcommand)]
    Operation(operation::OperationCommand),
    /// Usage reports
    Report(report::ReportArgs),
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init(cli.verbose, cli.json_logs);

    let options = ClientOptions::load(cli.config.as_deref()).context("loading client options")?;
    let subscription = cli
        .subscription
        .context("no subscription: pass --subscription or set AZURE_SUBSCRIPTION_ID")?;
    let credential =
        EnvironmentCredential::from_env().context("reading AZURE_* credential variables")?;
    let factory = ClientFactory::new(subscription, Arc::new(credential), &options)
        .context("building the Resource Manager pipeline")?;

    match cli.command {
        Commands::Backend(command) => command.run(&factory).await,
        Commands::Gateway(command) => command.run(&factory).await,
        Commands::Operation(command) => command.run(&factory).await,
        Commands::Report(args) => args.run(&factory).await,
    }
}

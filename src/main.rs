//! PERF operator CLI entry point.

use clap::Parser;

use perf_operator::cli::commands::{check, reconcile};
use perf_operator::cli::{handle_error, Cli, Commands};
use perf_operator::infrastructure::config::ConfigLoader;
use perf_operator::infrastructure::logging::LoggerImpl;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match ConfigLoader::load(cli.config.as_deref()) {
        Ok(config) => config,
        Err(err) => handle_error(&err, cli.json),
    };

    let logger = match LoggerImpl::init(&config.logging) {
        Ok(logger) => logger,
        Err(err) => handle_error(&err, cli.json),
    };

    let result = match cli.command {
        Commands::Reconcile(args) => reconcile::execute(args, &config, cli.json).await,
        Commands::Check(args) => check::execute(args, &config, cli.json).await,
    };

    if let Err(err) = result {
        // flush file logs before exiting
        drop(logger);
        handle_error(&err, cli.json);
    }
}

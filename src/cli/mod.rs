//! Command-line interface
//!
//! `reconcile` converges every resource of a manifest file once; `check`
//! probes a single PerfServer.

pub mod commands;
pub mod output;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

use commands::check::CheckArgs;
use commands::reconcile::ReconcileArgs;

/// Command-line interface.
#[derive(Parser)]
#[command(name = "perf-operator")]
#[command(about = "Reconciles PERF servers and data sources", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Configuration file merged over perf-operator.yaml
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

/// Subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Reconcile every PerfServer and PerfDataSource of a manifest file
    Reconcile(ReconcileArgs),

    /// Check connectivity of one PerfServer
    Check(CheckArgs),
}

/// Print the error the way the selected output mode expects and exit.
pub fn handle_error(err: &anyhow::Error, json_mode: bool) -> ! {
    if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1)
}

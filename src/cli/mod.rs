//! Command-line interface.

pub mod commands;

use clap::{Args, Parser, Subcommand};

/// Top-level CLI definition.
#[derive(Parser)]
#[command(name = "fuzzloop")]
#[command(about = "Adaptive API fuzz prober with a learned mutation policy", long_about = None)]
#[command(version)]
pub struct Cli {
    /// The subcommand to run.
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Path to a config file (defaults to .fuzzloop/config.yaml merging)
    #[arg(short, long, global = true)]
    pub config: Option<std::path::PathBuf>,
}

/// Available subcommands.
#[derive(Subcommand)]
pub enum Commands {
    /// Probe an endpoint once with the learned mutation policy
    Probe(ProbeArgs),

    /// Inspect or reset the learned policy table
    #[command(subcommand)]
    Policy(PolicyCommands),
}

/// Arguments for `fuzzloop probe`.
#[derive(Args)]
pub struct ProbeArgs {
    /// API endpoint path to probe (e.g. /api/users)
    pub endpoint: String,

    /// Path to the runnable test artifact targeting this endpoint
    #[arg(short, long)]
    pub artifact: std::path::PathBuf,

    /// Payload fields as name:type pairs (e.g. -f name:string -f age:number)
    #[arg(short = 'f', long = "field")]
    pub fields: Vec<String>,
}

/// Subcommands for `fuzzloop policy`.
#[derive(Subcommand)]
pub enum PolicyCommands {
    /// Print learned Q-values, optionally for a single endpoint
    Show {
        /// Limit output to one endpoint path
        #[arg(short, long)]
        endpoint: Option<String>,
    },

    /// Forget learned values for one endpoint, or the whole table
    Reset {
        /// Endpoint path to reset; omit to reset everything
        #[arg(short, long)]
        endpoint: Option<String>,
    },
}

/// Render a top-level error and exit non-zero.
pub fn handle_error(err: anyhow::Error, json: bool) {
    if json {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        eprintln!("{body}");
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}

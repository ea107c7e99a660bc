//! Fuzzloop CLI entry point.

use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use fuzzloop::cli::{Cli, Commands};
use fuzzloop::infrastructure::ConfigLoader;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match cli
        .config
        .as_ref()
        .map_or_else(ConfigLoader::load, ConfigLoader::load_from_file)
    {
        Ok(config) => config,
        Err(err) => {
            fuzzloop::cli::handle_error(err, cli.json);
            return;
        }
    };

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.logging.level.clone()));
    if config.logging.format == "json" {
        tracing_subscriber::registry()
            .with(filter)
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .init();
    }

    let result = match cli.command {
        Commands::Probe(args) => {
            fuzzloop::cli::commands::probe::execute(args, config, cli.json).await
        }
        Commands::Policy(command) => {
            fuzzloop::cli::commands::policy::execute(command, config, cli.json).await
        }
    };

    if let Err(err) = result {
        fuzzloop::cli::handle_error(err, cli.json);
    }
}

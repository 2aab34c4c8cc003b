use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use tl_cli::commands::clusters::ClusterQuery;
use tl_cli::commands::{clusters, replay, stats};
use tl_cli::{Cli, Commands, Config};

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing with verbose flag support
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env()
    };
    // Use try_init to avoid panic if tracing is already initialized (e.g., in tests)
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();

    let config = Config::load_from(cli.config.as_deref()).context("failed to load configuration")?;
    config.validate().context("invalid configuration")?;
    tracing::debug!(?config, "loaded configuration");

    let stdout = std::io::stdout();
    let mut out = stdout.lock();

    match &cli.command {
        Some(Commands::Stats { trace, json }) => {
            stats::run(&mut out, trace, &config, *json)?;
        }
        Some(Commands::Clusters {
            trace,
            zoom,
            from,
            to,
            json,
        }) => {
            let query = ClusterQuery {
                zoom: *zoom,
                from: *from,
                to: *to,
            };
            clusters::run(&mut out, trace, &config, query, *json)?;
        }
        Some(Commands::Replay { trace, script }) => {
            replay::run(&mut out, trace, script, &config)?;
        }
        None => {
            // No subcommand, show help
            use clap::CommandFactory;
            Cli::command().print_help()?;
            println!();
        }
    }

    Ok(())
}

use anyhow::Result;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

use questfolio::config::Config;

mod cli;

#[derive(Parser)]
#[command(name = "questfolio")]
#[command(about = "Questfolio - progression engine of a gamified developer portfolio")]
#[command(version)]
struct Cli {
    /// Path to the config file (defaults to ~/.questfolio/config.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the achievements of the active catalog
    Catalog,

    /// Replay screen actions against a fresh progression store
    ///
    /// Actions: grant:<n>, project:<id>, skill:<id>, experience,
    /// claim:<project>:<reward>, checkin[:<YYYY-MM-DD>]
    Simulate {
        /// Actions to replay, in order
        #[arg(required = true)]
        actions: Vec<String>,

        /// Print the report as JSON
        #[arg(long)]
        json: bool,
    },

    /// Initialize a new config file
    Init {
        /// Overwrite existing config file
        #[arg(long)]
        force: bool,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Catalog => {
            let config = Config::load(cli.config.as_deref())?;
            cli::catalog::catalog_command(&config)?;
        }
        Commands::Simulate { actions, json } => {
            let config = Config::load(cli.config.as_deref())?;
            cli::simulate::simulate_command(&config, &actions, json)?;
        }
        Commands::Init { force } => {
            cli::init::init_command(cli.config, force)?;
        }
    }

    Ok(())
}

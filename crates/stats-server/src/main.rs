use anyhow::Result;
use clap::{Parser, Subcommand};
use stats_core::QueryParams;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod server;

use commands::*;
use config::Config;

#[derive(Parser)]
#[command(name = "stats-server")]
#[command(author, version, about = "Cached statistics over sensor time series", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (JSON)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the HTTP server
    Serve {
        /// Address to listen on
        #[arg(short, long)]
        listen: Option<String>,

        /// Readings CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,

        /// Maximum number of cached results
        #[arg(long)]
        cache_size: Option<usize>,

        /// Report HIT only while a result is resident
        #[arg(long)]
        no_seen_tracking: bool,
    },

    /// Run a single query and print the result
    Query {
        /// Readings CSV file
        #[arg(short, long)]
        data: Option<PathBuf>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        sensor: Option<String>,

        #[arg(long)]
        start_date: Option<String>,

        #[arg(long)]
        end_date: Option<String>,

        /// Run the query this many times against the same cache
        #[arg(short, long, default_value = "1")]
        repeat: usize,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize logging
    init_logging(cli.verbose)?;

    // Load configuration
    let mut config = if let Some(config_path) = cli.config {
        Config::from_file(&config_path)?
    } else {
        Config::default()
    };

    match cli.command {
        Some(Commands::Serve {
            listen,
            data,
            cache_size,
            no_seen_tracking,
        }) => {
            if let Some(listen) = listen {
                config.listen_addr = listen;
            }
            if let Some(data) = data {
                config.data_path = data;
            }
            if let Some(size) = cache_size {
                config.cache.max_entries = size;
            }
            if no_seen_tracking {
                config.cache.track_seen_keys = false;
            }
            start_server(config).await?;
        }
        Some(Commands::Query {
            data,
            location,
            sensor,
            start_date,
            end_date,
            repeat,
        }) => {
            let params = QueryParams {
                location,
                sensor,
                start_date,
                end_date,
            };
            let data = data.unwrap_or(config.data_path);
            run_query(&data, &params, repeat, config.cache)?;
        }
        None => {
            // Default: serve with the configured settings
            start_server(config).await?;
        }
    }

    Ok(())
}

fn init_logging(verbose: bool) -> Result<()> {
    let filter = if verbose {
        "stats_server=debug,stats_engine=debug,stats_cache=debug,stats_storage=debug"
    } else {
        "stats_server=info,stats_storage=info"
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    Ok(())
}

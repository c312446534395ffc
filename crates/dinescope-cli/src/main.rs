mod search;
mod sources;

use clap::{Parser, Subcommand};
use dinescope_core::Environment;
use tracing_subscriber::EnvFilter;

use crate::search::SearchArgs;

#[derive(Debug, Parser)]
#[command(name = "dinescope")]
#[command(about = "Geospatial restaurant discovery")]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Find restaurants around a point, widening the radius as needed
    Search(SearchArgs),
    /// Inspect the configured data sources
    Sources {
        #[command(subcommand)]
        command: SourcesCommands,
    },
    /// Database utilities
    Db {
        #[command(subcommand)]
        command: DbCommands,
    },
}

#[derive(Debug, Subcommand)]
enum SourcesCommands {
    /// Print the source chain in execution order
    List,
}

#[derive(Debug, Subcommand)]
enum DbCommands {
    /// Check that the restaurant database is reachable
    Ping,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = dinescope_core::load_app_config()?;
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_ansi(config.env == Environment::Development)
        .init();
    tracing::debug!(
        env = %config.env,
        sources_path = %config.sources_path.display(),
        "config loaded"
    );

    match cli.command {
        Some(Commands::Search(args)) => search::run_search(&config, &args).await?,
        Some(Commands::Sources {
            command: SourcesCommands::List,
        }) => sources::run_sources_list(&config)?,
        Some(Commands::Db {
            command: DbCommands::Ping,
        }) => {
            let pool = dinescope_db::connect_pool_from_config(&config).await?;
            dinescope_db::health_check(&pool).await?;
            println!("database ok");
        }
        None => {
            println!("dinescope: run with --help to see available commands");
        }
    }

    Ok(())
}

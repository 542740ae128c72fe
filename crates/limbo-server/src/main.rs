//! Limbo server binary.
//!
//! # Usage
//!
//! ```bash
//! # In-memory board on the default port
//! limbo-server
//!
//! # Durable board with a config file
//! limbo-server --config config.toml --database limbo.redb
//! ```

use std::path::PathBuf;

use clap::Parser;
use limbo_server::{
    FileConfig, MemoryStorage, RedbStorage, RuntimeConfig, Server, ServerError, Storage,
};
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Limbo bulletin-board server
#[derive(Parser, Debug)]
#[command(name = "limbo-server")]
#[command(about = "Limbo bulletin-board server")]
#[command(version)]
struct Args {
    /// TOML configuration file
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Address to bind to (overrides the config file)
    #[arg(short, long)]
    bind: Option<String>,

    /// Database file (overrides the config file; omit for in-memory storage)
    #[arg(short, long)]
    database: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, default_value = "info")]
    log_level: String,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&args.log_level));

    tracing_subscriber::registry().with(fmt::layer()).with(filter).init();

    let mut config = match &args.config {
        Some(path) => RuntimeConfig::from_file(FileConfig::load(path)?),
        None => RuntimeConfig::default(),
    };
    if let Some(bind) = args.bind {
        config.bind_address = bind;
    }
    if let Some(database) = args.database {
        config.database = Some(database);
    }

    tracing::info!("Limbo server starting: {}", config.board.name);

    match config.database.clone() {
        Some(path) => {
            tracing::info!("Using database {}", path.display());
            serve(config, RedbStorage::open(&path)?).await?;
        },
        None => {
            tracing::warn!("No database configured - board contents are lost on exit");
            serve(config, MemoryStorage::new()).await?;
        },
    }

    Ok(())
}

async fn serve<S: Storage>(config: RuntimeConfig, storage: S) -> Result<(), ServerError> {
    tracing::info!("Binding to {}", config.bind_address);
    let server = Server::bind(config, storage).await?;
    server.run().await
}

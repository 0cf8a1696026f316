//! songlib-api - song catalog HTTP service
//!
//! `songlib-api [serve]` applies pending migrations and starts the server.
//! `songlib-api migrate up|down table|down database` manages the schema and exits.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use songlib_common::config::{ConfigOverrides, ServiceConfig};
use songlib_common::db::{
    connect_database, drop_database_files, init_database, rollback_songs_table, SqliteSongStore,
};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use songlib_api::services::provider_from_config;
use songlib_api::{build_router, AppState};

#[derive(Debug, Parser)]
#[command(name = "songlib-api", version, about = "Song catalog HTTP service")]
struct Cli {
    /// TOML config file
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// SQLite database file
    #[arg(long, global = true)]
    database: Option<PathBuf>,

    /// Listen address
    #[arg(long)]
    host: Option<String>,

    /// Listen port
    #[arg(long)]
    port: Option<u16>,

    /// Song details lookup endpoint (unset: fixed fallback details)
    #[arg(long)]
    external_api_url: Option<String>,

    /// Default log filter, e.g. "info" or "songlib_api=debug"
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Apply migrations and serve HTTP (default)
    Serve,
    /// Run schema migrations and exit
    Migrate {
        #[command(subcommand)]
        direction: MigrateDirection,
    },
}

#[derive(Debug, Subcommand)]
enum MigrateDirection {
    /// Create or upgrade the schema
    Up,
    /// Drop the songs table or the whole database
    Down {
        #[arg(value_enum)]
        target: DownTarget,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum DownTarget {
    Table,
    Database,
}

impl Cli {
    fn overrides(&self) -> ConfigOverrides {
        ConfigOverrides {
            config_path: self.config.clone(),
            database_path: self.database.clone(),
            host: self.host.clone(),
            port: self.port,
            external_api_url: self.external_api_url.clone(),
            log_level: self.log_level.clone(),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = ServiceConfig::resolve(&cli.overrides()).context("Failed to load configuration")?;

    // RUST_LOG wins over the configured level
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(&config.log_level)),
        )
        .init();

    info!(
        "Starting songlib-api v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    match cli.command {
        None | Some(Command::Serve) => serve(&config).await,
        Some(Command::Migrate { direction }) => migrate(&config, direction).await,
    }
}

async fn migrate(config: &ServiceConfig, direction: MigrateDirection) -> Result<()> {
    let db_path = &config.database_path;

    match direction {
        MigrateDirection::Up => {
            let pool = init_database(db_path).await?;
            pool.close().await;
            info!("Migrations 'up' applied to {}", db_path.display());
        }
        MigrateDirection::Down {
            target: DownTarget::Table,
        } => {
            let pool = connect_database(db_path).await?;
            rollback_songs_table(&pool).await?;
            pool.close().await;
            info!("Migration 'down' for table applied to {}", db_path.display());
        }
        MigrateDirection::Down {
            target: DownTarget::Database,
        } => {
            if drop_database_files(db_path)? {
                info!("Database {} removed", db_path.display());
            } else {
                info!("Database {} does not exist", db_path.display());
            }
        }
    }

    Ok(())
}

async fn serve(config: &ServiceConfig) -> Result<()> {
    info!("Database path: {}", config.database_path.display());
    let pool = init_database(&config.database_path)
        .await
        .context("Failed to open database")?;
    info!("✓ Database ready");

    let provider = provider_from_config(config).context("Failed to create song details client")?;
    let state = AppState::new(Arc::new(SqliteSongStore::new(pool)), provider);
    let app = build_router(state);

    let address = config.bind_address();
    let listener = tokio::net::TcpListener::bind(&address)
        .await
        .with_context(|| format!("Failed to bind {}", address))?;
    info!("songlib-api listening on http://{}", address);
    info!("Health check: http://{}/health", address);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("songlib-api stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Shutdown signal received");
}

mod cli;
mod config;
mod db;
mod errors;
mod extraction;
mod ingest;
mod inspect;
mod llm_client;
mod matching;
mod models;
mod pipeline;
mod routes;
mod scheduler;
mod shortlist;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use clap::Parser;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::cli::{Cli, Command};
use crate::config::Config;
use crate::db::create_pool;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load configuration first so the log level can come from it
    let config = Arc::new(Config::load(&cli.config)?);

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Screener v{}", env!("CARGO_PKG_VERSION"));

    let db = create_pool(&config.database_path).await?;

    match cli.command {
        Command::Serve { port } => serve(db, config, port).await,
        command => cli::execute(command, db, config).await,
    }
}

async fn serve(db: sqlx::SqlitePool, config: Arc<Config>, port: Option<u16>) -> Result<()> {
    let port = port.unwrap_or(config.port);
    let state = AppState { db, config };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{port}").parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

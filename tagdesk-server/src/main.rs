//! tagdesk-server - dataset labeling and LLM output review service
//!
//! Serves the JSON API over a single SQLite database file.

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tagdesk_common::config::{
    RootFolderInitializer, RootFolderResolver, DEFAULT_HOST, DEFAULT_PORT,
};
use tagdesk_common::db::init_database;
use tagdesk_server::{build_router, AppState};

/// Command-line arguments for tagdesk-server
#[derive(Parser, Debug)]
#[command(name = "tagdesk-server")]
#[command(about = "Dataset labeling and LLM output review service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "TAGDESK_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(long, env = "TAGDESK_HOST")]
    host: Option<String>,

    /// Folder holding the database (TAGDESK_ROOT_FOLDER is read by the resolver)
    #[arg(short, long)]
    root_folder: Option<PathBuf>,

    /// Explicit database file, overriding the root folder
    #[arg(short, long, env = "TAGDESK_DATABASE")]
    database: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "tagdesk_server=info,tagdesk_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!(
        "Starting tagdesk-server v{} [{}] built {} ({})",
        env!("CARGO_PKG_VERSION"),
        env!("GIT_HASH"),
        env!("BUILD_TIMESTAMP"),
        env!("BUILD_PROFILE")
    );

    let args = Args::parse();

    let resolver = RootFolderResolver::new("tagdesk-server").with_cli_arg(args.root_folder);
    let db_path = match args.database {
        Some(path) => path,
        None => {
            let initializer = RootFolderInitializer::new(resolver.resolve());
            initializer.ensure_directory_exists()?;
            info!("Root folder: {}", initializer.root_folder().display());
            initializer.database_path()
        }
    };
    info!("Database path: {}", db_path.display());

    let pool = match init_database(&db_path).await {
        Ok(pool) => {
            info!("✓ Database ready");
            pool
        }
        Err(e) => {
            error!("Failed to open database: {}", e);
            return Err(e.into());
        }
    };

    let config = resolver.config();
    let host = args
        .host
        .or_else(|| config.and_then(|c| c.host.clone()))
        .unwrap_or_else(|| DEFAULT_HOST.to_string());
    let port = args
        .port
        .or_else(|| config.and_then(|c| c.port))
        .unwrap_or(DEFAULT_PORT);

    let addr: SocketAddr = format!("{}:{}", host, port)
        .parse()
        .with_context(|| format!("Invalid bind address {}:{}", host, port))?;

    let app = build_router(AppState::new(pool.clone()));

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .context("Failed to bind to address")?;
    info!("tagdesk-server listening on http://{}", addr);
    info!("Health check: http://{}/health", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .context("Server error")?;

    pool.close().await;
    info!("Server shutdown complete");
    Ok(())
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("Received Ctrl+C, shutting down");
        },
        _ = terminate => {
            info!("Received terminate signal, shutting down");
        },
    }
}

//! Wayfare - tours and travel booking backend

use anyhow::Result;
use clap::Parser;
use metrics_exporter_prometheus::PrometheusBuilder;
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::info;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

mod config;

use config::Config;
use wayfare_api::{AppState, MetricsHandle, create_router};
use wayfare_auth::TokenIssuer;
use wayfare_db::{Database, NewUser, UserRole};
use wayfare_storage::LocalStorage;

/// Wayfare - REST backend for the tours and travel booking platform
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config/default.toml")]
    config: String,

    /// Bind address
    #[arg(long, env = "WAYFARE_BIND")]
    bind: Option<String>,

    /// Port
    #[arg(short, long, env = "WAYFARE_PORT")]
    port: Option<u16>,
}

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Load configuration
    let config = Config::load(&args.config)?;

    // Initialize logging
    init_logging(&config.logging.level);

    info!("Starting Wayfare v{}", env!("CARGO_PKG_VERSION"));

    // Create data directories
    if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
        tokio::fs::create_dir_all(parent).await?;
    }

    // Initialize database
    let db_url = format!("sqlite:{}?mode=rwc", config.database.path);
    let db = Database::new(&db_url).await?;

    // Create default super admin if no users exist
    if !db.has_users().await? {
        info!("Creating default super admin user");
        let password_hash = wayfare_auth::hash_password("admin")?;
        db.insert_user(NewUser {
            name: "Administrator".to_string(),
            email: "admin@wayfare.local".to_string(),
            phone: "0000000000".to_string(),
            country: "IN".to_string(),
            password_hash,
            role: UserRole::SuperAdmin,
        })
        .await?;
        info!("Default super admin created (email: admin@wayfare.local, password: admin)");
    }

    // Initialize upload storage
    let uploads_dir = PathBuf::from(&config.storage.uploads_path);
    let storage = Arc::new(LocalStorage::new(&uploads_dir, "/uploads").await?);

    // Initialize token issuer
    let tokens = Arc::new(TokenIssuer::new(
        &config.auth.access_secret,
        &config.auth.refresh_secret,
        &config.auth.access_expiry,
        &config.auth.refresh_expiry,
    )?);

    // Install Prometheus metrics recorder
    let metrics_handle = PrometheusBuilder::new()
        .install_recorder()
        .map(|handle| Arc::new(MetricsHandle::new(handle)))
        .ok();

    // Create application state
    let state = AppState::new(db, tokens, storage, uploads_dir);

    // Create router
    let app = create_router(state, metrics_handle).layer(TraceLayer::new_for_http());

    // Determine bind address
    let bind_addr = args.bind.unwrap_or(config.server.bind_address);
    let port = args.port.unwrap_or(config.server.port);
    let addr: SocketAddr = format!("{}:{}", bind_addr, port).parse()?;

    info!("Listening on {}", addr);

    // Start server
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server stopped");
    Ok(())
}

/// Initialize logging
fn init_logging(level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(filter)
        .init();
}

/// Wait for shutdown signal
async fn shutdown_signal() {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C handler");
    info!("Shutdown signal received");
}

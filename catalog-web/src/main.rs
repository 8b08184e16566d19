//! catalog-web - Composer catalog web service entry point

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use catalog_common::config::{CatalogConfig, ConfigOverrides};
use catalog_common::db::init_database;
use catalog_common::CatalogService;
use catalog_web::api::BuildInfo;
use catalog_web::fetcher::HttpTitleFetcher;
use catalog_web::{build_router, AppState};
use clap::Parser;
use tokio::signal;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Command-line arguments for catalog-web
#[derive(Parser, Debug)]
#[command(name = "catalog-web")]
#[command(about = "Composer catalog web service")]
#[command(version)]
struct Args {
    /// Port to listen on
    #[arg(short, long, env = "CATALOG_PORT")]
    port: Option<u16>,

    /// Address to bind
    #[arg(short, long, env = "CATALOG_BIND")]
    bind: Option<String>,

    /// SQLite database file
    #[arg(short, long, env = "CATALOG_DATABASE")]
    database: Option<PathBuf>,

    /// Token required on the JSON edit/delete endpoints
    #[arg(long, env = "CATALOG_API_TOKEN", hide_env_values = true)]
    api_token: Option<String>,

    /// TOML config file (defaults to the platform config directory)
    #[arg(short, long, env = "CATALOG_CONFIG")]
    config: Option<PathBuf>,
}

impl From<Args> for ConfigOverrides {
    fn from(args: Args) -> Self {
        Self {
            bind_addr: args.bind,
            port: args.port,
            database_path: args.database,
            api_token: args.api_token,
            config_file: args.config,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "catalog_web=info,catalog_common=info,tower_http=info".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Build identification first so startup problems can be tied to a build
    let build = BuildInfo::current();
    info!(
        "Starting composer catalog (catalog-web) v{} [{}] built {} ({})",
        build.version, build.git_hash, build.build_timestamp, build.build_profile
    );

    let overrides = ConfigOverrides::from(Args::parse());
    let config = CatalogConfig::resolve(&overrides).context("Failed to load configuration")?;
    info!("Database path: {}", config.database_path.display());

    let pool = init_database(&config.database_path)
        .await
        .context("Failed to initialize database")?;

    let fetcher = HttpTitleFetcher::new(
        Duration::from_secs(config.fetch_timeout_secs),
        &config.user_agent,
    )
    .context("Failed to create title fetcher")?;

    if config.api_token.is_some() {
        info!("API token required on edit/delete endpoints");
    } else {
        info!("API token not configured, edit/delete endpoints are open");
    }

    let state = AppState::new(CatalogService::new(pool.clone()), Arc::new(fetcher))
        .with_api_token(config.api_token.clone());
    let app = build_router(state);

    let addr = config.listen_address();
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind to {}", addr))?;
    info!("catalog-web listening on http://{}", addr);
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

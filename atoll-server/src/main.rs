//! atoll-server binary

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tokio::net::TcpListener;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use atoll_server::config::{Config, ConfigOverrides};
use atoll_server::{build_router, db, AppState};

#[derive(Parser, Debug)]
#[command(
    name = "atoll-server",
    about = "Island workspace ingestion and export service"
)]
struct Args {
    /// Path to the TOML configuration file
    #[arg(long, env = "ATOLL_CONFIG", default_value = "atoll.toml")]
    config: PathBuf,

    /// Listen port (overrides the configuration file)
    #[arg(long, env = "ATOLL_PORT")]
    port: Option<u16>,

    /// SQLite database path (overrides the configuration file)
    #[arg(long, env = "ATOLL_DATABASE")]
    database: Option<PathBuf>,

    /// Upload root directory (overrides the configuration file)
    #[arg(long, env = "ATOLL_UPLOAD_ROOT")]
    upload_root: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    // Config comes first so the log level can be applied from it
    let overrides = ConfigOverrides {
        database_path: args.database,
        port: args.port,
        upload_root: args.upload_root,
    };
    let config = Config::load(&args.config, overrides).await?;

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            format!("atoll_server={},tower_http=info", config.log_level).into()
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("atoll-server v{} starting", env!("CARGO_PKG_VERSION"));
    info!(
        database = %config.database_path.display(),
        upload_root = %config.upload_root.display(),
        port = config.port,
        "configuration loaded"
    );

    std::fs::create_dir_all(&config.upload_root).with_context(|| {
        format!(
            "failed to create upload root {}",
            config.upload_root.display()
        )
    })?;

    let pool = db::init_database_pool(&config.database_path).await?;
    let state = AppState::new(pool, config.upload_root.clone());
    let app = build_router(state);

    let addr = format!("0.0.0.0:{}", config.port);
    let listener = TcpListener::bind(&addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("listening on {}", addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("atoll-server stopped");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => info!("received Ctrl+C, shutting down"),
        _ = terminate => info!("received terminate signal, shutting down"),
    }
}

mod access_log;
mod exposition;
mod handlers;
mod state;

use std::net::SocketAddr;
use std::path::PathBuf;
use std::process;
use std::sync::Arc;

use axum::Router;
use axum::routing::get;
use clap::Parser;
use tower_http::compression::CompressionLayer;
use tracing::{Level, error, info, warn};
use tracing_subscriber::EnvFilter;

use eapi_exporter_core::collector::Collector;
use eapi_exporter_core::config::Config;

use state::{AppState, SharedState};

// ============================================================
// CLI
// ============================================================

/// Prometheus exporter for Arista switches over eAPI.
#[derive(Parser)]
#[command(name = "eapi-exporter", version = eapi_exporter_core::VERSION)]
struct Args {
    /// Path to the YAML configuration file.
    #[arg(short, long, default_value = "config.yml", env = "EAPI_EXPORTER_CONFIG")]
    config: PathBuf,

    /// Listen address. Overrides `listen_addr` from the config file.
    #[arg(long, env = "EAPI_EXPORTER_LISTEN_ADDR")]
    listen_addr: Option<String>,

    /// Listen port. Overrides `listen_port` from the config file.
    #[arg(long, env = "EAPI_EXPORTER_LISTEN_PORT")]
    listen_port: Option<u16>,

    /// Increase logging verbosity (-v for debug, -vv for trace).
    /// Overrides `loglevel` from the config file.
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Quiet mode - only show errors.
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(verbose: u8, quiet: bool, configured: Option<Level>) {
    let level = if quiet {
        Level::ERROR
    } else {
        match verbose {
            0 => configured.unwrap_or(Level::INFO),
            1 => Level::DEBUG,
            _ => Level::TRACE,
        }
    };
    let level = level.as_str().to_ascii_lowercase();

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!("eapi_exporter={level},eapi_exporter_core={level}"))
    });

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

// ============================================================
// Server
// ============================================================

pub(crate) fn router(state: SharedState) -> Router {
    Router::new()
        .route("/arista", get(handlers::handle_scrape))
        .route("/health", get(handlers::handle_health))
        .with_state(state)
        .layer(axum::middleware::from_fn(access_log::access_log))
        .layer(CompressionLayer::new())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("Failed to listen for Ctrl-C: {}", e);
        std::future::pending::<()>().await;
    }
    info!("Received shutdown signal");
}

async fn serve(addr: String, port: u16, state: SharedState) -> Result<(), String> {
    let listener = tokio::net::TcpListener::bind((addr.as_str(), port))
        .await
        .map_err(|e| format!("couldn't start server on {}:{}: {}", addr, port, e))?;
    info!(%addr, port, "Starting Arista eAPI exporter");

    let app = router(state).into_make_service_with_connect_info::<SocketAddr>();
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| format!("server error: {}", e))
}

fn main() {
    let args = Args::parse();

    let config = match Config::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(args.verbose, args.quiet, None);
            error!(path = %args.config.display(), "{}", e);
            process::exit(1);
        }
    };
    init_logging(args.verbose, args.quiet, config.log_level());

    let settings = config.device_settings();
    if settings.accept_invalid_certs {
        warn!("device certificate validation is disabled");
    }
    let collector = Arc::new(Collector::with_http(settings));
    let state = Arc::new(AppState {
        collector: collector.clone(),
        default_modules: config.module_names.clone(),
    });

    let addr = args.listen_addr.unwrap_or(config.listen_addr);
    let port = args.listen_port.unwrap_or(config.listen_port);

    let runtime = match tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
    {
        Ok(runtime) => runtime,
        Err(e) => {
            error!("failed to build tokio runtime: {}", e);
            process::exit(1);
        }
    };
    let result = runtime.block_on(serve(addr, port, state));
    drop(runtime);

    // Sessions own blocking HTTP clients; release them outside the runtime.
    drop(collector);

    match result {
        Ok(()) => info!("Stopping Arista eAPI exporter"),
        Err(e) => {
            error!("{}", e);
            process::exit(1);
        }
    }
}

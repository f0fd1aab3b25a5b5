mod args;
mod config;

use std::io;
use std::net::SocketAddr;

use app_api::AppContext;
use http_api::HttpState;
use ledger_app::AppState;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

const DEFAULT_LOG_FILTER: &str =
    "billiard_ledger=info,ledger_app=info,http_api=info,tower_http=info";

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_tracing();

    let args = args::parse_args().map_err(|err| {
        eprintln!("{err}");
        args::print_help();
        io::Error::new(io::ErrorKind::InvalidInput, "invalid arguments")
    })?;

    let loaded = config::load(args.config.as_deref(), |key| std::env::var(key).ok())
        .map_err(io::Error::other)?;
    let mut warnings = loaded.warnings;
    let mut server = loaded.config;
    if let Some(raw) = args.port.as_deref() {
        server.port = config::resolve_port(raw, &mut warnings);
    }
    for warning in &warnings {
        warn!("{warning}");
    }
    if let Some(file) = &loaded.file {
        info!(config = %file.display(), "loaded config file");
    }

    let app_state = AppState::open(server.app_config()).map_err(|err| {
        io::Error::other(format!("failed to initialize database: {}", err))
    })?;

    let state = HttpState::new(AppContext::new(app_state.clone()))
        .with_api_token(server.api_token.clone())
        .with_allowed_origins(server.allowed_origins.clone());
    let router = http_api::router(state);

    let addr = SocketAddr::from(([0, 0, 0, 0], server.port));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(
        %addr,
        tables = server.table_count,
        tolerance_minutes = server.tolerance_minutes,
        record_day = ?server.record_day,
        token_gate = server.api_token.is_some(),
        "billiard ledger listening"
    );

    let served = axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await;
    app_state.shutdown();
    served?;

    Ok(())
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| std::env::var("LOG_LEVEL").map(EnvFilter::new))
        .unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        let _ = tokio::signal::ctrl_c().await;
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                warn!(error = %err, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };
    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    info!("shutdown signal received");
}

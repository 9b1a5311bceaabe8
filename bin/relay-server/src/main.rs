//! relay-server: HTTP relay between a chat UI and the Gemini API.
//!
//! Reads `.env` and the process environment, warms the default model, then
//! serves until Ctrl-C or SIGTERM.

mod config;
mod error;
mod middleware;
mod provider;
mod relay;
mod routes;
mod state;

use std::net::SocketAddr;
use std::sync::Arc;

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use crate::config::Config;
use crate::provider::GeminiProvider;
use crate::relay::RelayService;
use crate::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let dotenv = dotenvy::dotenv();
    let cfg = Config::from_env();
    init_tracing(&cfg);

    info!(version = env!("CARGO_PKG_VERSION"), "relay-server starting");
    match dotenv {
        Ok(path) => info!(path = %path.display(), "loaded environment file"),
        Err(e) if e.not_found() => {}
        Err(e) => warn!(error = %e, "failed to read environment file"),
    }
    if cfg.api_key.is_none() {
        warn!("GOOGLE_API_KEY is not set; chat and model listing will report unavailable");
    }

    let provider = Arc::new(GeminiProvider::from_config(&cfg)?);
    let relay = RelayService::from_config(&cfg, provider);
    relay.warm_up().await;
    info!(
        default_model = %cfg.default_model,
        supported = ?cfg.supported_models,
        "relay ready"
    );

    let addr: SocketAddr = cfg.bind_address.parse()?;
    let app = routes::build(Arc::new(AppState::new(cfg, relay)));
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(wait_for_shutdown())
        .await?;
    info!("relay-server stopped");
    Ok(())
}

/// `RUST_LOG` wins over `RELAY_LOG`; an unparsable filter degrades to `info`.
fn init_tracing(cfg: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&cfg.log_level))
        .unwrap_or_else(|e| {
            eprintln!("invalid log filter {:?} ({e}); using info", cfg.log_level);
            EnvFilter::new("info")
        });

    let fmt = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_thread_ids(true);
    if cfg.log_json {
        fmt.json().flatten_event(true).init();
    } else {
        fmt.init();
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
async fn wait_for_shutdown() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                tokio::select! {
                    res = tokio::signal::ctrl_c() => {
                        if let Err(e) = res {
                            warn!(error = %e, "ctrl-c handler failed");
                        }
                    }
                    _ = term.recv() => {}
                }
            }
            Err(e) => {
                warn!(error = %e, "SIGTERM handler unavailable; waiting for ctrl-c only");
                let _ = tokio::signal::ctrl_c().await;
            }
        }
    }
    #[cfg(not(unix))]
    {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(error = %e, "ctrl-c handler failed");
        }
    }

    info!("shutting down");
}

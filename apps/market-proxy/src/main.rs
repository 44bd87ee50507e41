//! Market Proxy Binary
//!
//! Starts the public API and the health server.
//!
//! # Usage
//!
//! ```bash
//! cargo run --bin market-proxy
//! ```
//!
//! # Environment Variables
//!
//! ## Upstream keys (each feature answers 500 without its key)
//! - `FINNHUB_API_KEY`: Quote, profile and search provider
//! - `GEMINI_API_KEY` | `OPENAI_API_KEY` | `ANTHROPIC_API_KEY`: Per `AI_PROVIDER`
//!
//! ## Optional
//! - `MARKET_PROXY_HTTP_PORT`: Public API port (default: 3000)
//! - `MARKET_PROXY_HEALTH_PORT`: Health and metrics port (default: 8083)
//! - `QUOTE_RATE_LIMIT_PER_MINUTE`: Upstream quote budget (default: 30)
//! - `AI_PROVIDER`: gemini | openai | anthropic (default: gemini)
//! - `OTEL_ENABLED`: Export spans over OTLP (default: false)
//! - `RUST_LOG`: Log filter (default: info)

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Context;
use market_proxy::infrastructure::llm::TokioSleeper;
use market_proxy::{
    AppState, HealthServer, HealthServerState, ProxyConfig, SystemClock, create_router,
    init_metrics, init_telemetry,
};
use tokio::net::TcpListener;
use tokio::signal;
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();

    let _telemetry_guard = init_telemetry();

    tracing::info!("Starting market proxy");

    let _metrics_handle = init_metrics();

    let config = ProxyConfig::from_env().context("invalid configuration")?;
    log_config(&config);

    let shutdown_token = CancellationToken::new();

    let state = AppState::from_config(&config, Arc::new(SystemClock), Arc::new(TokioSleeper))
        .context("failed to build upstream clients")?;

    let health_state = Arc::new(HealthServerState::new(
        env!("CARGO_PKG_VERSION").to_string(),
        Arc::clone(&state.quotes),
        Arc::clone(&state.advisor),
    ));
    let health_server = HealthServer::new(
        config.server.health_port,
        health_state,
        shutdown_token.clone(),
    );

    tokio::spawn(async move {
        if let Err(e) = health_server.run().await {
            tracing::error!(error = %e, "Health server error");
        }
    });

    let addr = SocketAddr::from(([0, 0, 0, 0], config.server.http_port));
    let listener = TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind to port {}", config.server.http_port))?;

    tracing::info!(%addr, "Market proxy listening");

    let api_shutdown = shutdown_token.clone();
    let server = tokio::spawn(async move {
        axum::serve(listener, create_router(state))
            .with_graceful_shutdown(api_shutdown.cancelled_owned())
            .await
    });

    await_shutdown(shutdown_token).await;

    server
        .await
        .context("API server task panicked")?
        .context("API server error")?;

    tracing::info!("Market proxy stopped");
    Ok(())
}

/// Log the parsed configuration. Keys are reported as present or absent only.
fn log_config(config: &ProxyConfig) {
    tracing::info!(
        http_port = config.server.http_port,
        health_port = config.server.health_port,
        rate_limit_per_minute = config.market.rate_limit_per_minute,
        ai_provider = config.ai.provider.as_str(),
        ai_model = %config.ai.model,
        "Configuration loaded"
    );
    if config.market.api_key.is_none() {
        tracing::warn!("FINNHUB_API_KEY is not set; quote endpoints will answer 500");
    }
    if config.ai.api_key.is_none() {
        tracing::warn!(
            env_var = config.ai.provider.key_env_var(),
            "AI key is not set; /ai will answer 500"
        );
    }
}

/// Load .env file from current directory or any ancestor directory.
fn load_dotenv() {
    if dotenvy::dotenv().is_ok() {
        return;
    }

    if let Ok(cwd) = std::env::current_dir() {
        let mut dir = cwd.as_path();
        while let Some(parent) = dir.parent() {
            let env_path = parent.join(".env");
            if env_path.exists() {
                let _ = dotenvy::from_path(&env_path);
                return;
            }
            dir = parent;
        }
    }
}

/// Wait for SIGTERM or SIGINT, then cancel every server.
async fn await_shutdown(shutdown_token: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Ctrl+C handler failed");
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
                tracing::error!(error = %e, "SIGTERM handler failed");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }

    shutdown_token.cancel();
}

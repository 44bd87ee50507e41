//! Portfolio Client Binary
//!
//! # Usage
//!
//! ```bash
//! # Poll PORTFOLIO_SYMBOLS and log prices after every cycle
//! cargo run --bin portfolio-client
//!
//! # Ask the advisor once
//! cargo run --bin portfolio-client -- advise "Analyse mon portefeuille"
//! ```
//!
//! # Environment Variables
//!
//! - `MARKET_PROXY_URL`: Proxy base URL (default: <http://localhost:3000>)
//! - `PORTFOLIO_SYMBOLS`: Comma-separated symbols
//! - `POLL_INTERVAL_SECS`: Cycle interval (default: 60)
//! - `POLL_BATCH_SIZE`: Symbols per cycle, 0 = all (default: 0)
//! - `POLL_TRADING_HOURS`: `HH:MM-HH:MM`, empty = always (default: 07:30-23:00)
//! - `RUST_LOG`: Log filter

use std::sync::Arc;

use anyhow::Context;
use portfolio_client::infrastructure::telemetry;
use portfolio_client::{AdvisorClient, ClientConfig, Extraction, HttpPriceFeed, PricePoller};
use tokio_util::sync::CancellationToken;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    load_dotenv();
    telemetry::init();

    let config = ClientConfig::from_env().context("invalid configuration")?;
    let args: Vec<String> = std::env::args().skip(1).collect();

    match args.split_first() {
        Some((command, prompt)) if command == "advise" => advise(&config, &prompt.join(" ")).await,
        _ => poll(config).await,
    }
}

async fn advise(config: &ClientConfig, prompt: &str) -> anyhow::Result<()> {
    let advisor = AdvisorClient::new(&config.proxy_url, config.request_timeout)?;
    let advice = advisor.analyze(prompt).await?;

    println!("{}", advice.text);
    match advice.structured {
        Extraction::Found(value) => {
            println!("\n{}", serde_json::to_string_pretty(&value)?);
        }
        Extraction::NotFound => tracing::info!("Answer carried no structured data"),
    }
    Ok(())
}

async fn poll(config: ClientConfig) -> anyhow::Result<()> {
    if config.symbols.is_empty() {
        anyhow::bail!("PORTFOLIO_SYMBOLS is empty, nothing to poll");
    }

    let feed = Arc::new(HttpPriceFeed::new(&config.proxy_url, config.request_timeout)?);
    let poller = Arc::new(PricePoller::new(feed, config.poller.clone()));
    poller.observe(config.symbols.as_slice());

    let cancel = CancellationToken::new();
    let runner = tokio::spawn(Arc::clone(&poller).run(cancel.clone()));

    let mut updates = poller.subscribe();
    loop {
        tokio::select! {
            changed = updates.changed() => {
                if changed.is_err() {
                    break;
                }
                log_prices(&poller);
            }
            result = tokio::signal::ctrl_c() => {
                result.context("failed to listen for Ctrl+C")?;
                tracing::info!("Received Ctrl+C, stopping");
                break;
            }
        }
    }

    cancel.cancel();
    runner.await.context("poller task panicked")?;
    Ok(())
}

fn log_prices(poller: &PricePoller) {
    let prices = poller.prices();
    for symbol in poller.symbols().as_slice() {
        match prices.get(symbol) {
            Some(quote) => tracing::info!(
                symbol = %symbol,
                price = quote.price,
                change_percent = quote.change_percent,
                cached = quote.cached,
                "Price"
            ),
            None => tracing::info!(symbol = %symbol, "No price yet"),
        }
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

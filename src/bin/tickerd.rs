//! `tickerd` — the standalone engine daemon.
//!
//! Expects the dashboard process to be listening on the control channel
//! address before startup; run with `RUST_LOG=ticker_engine=debug` for
//! cycle-level detail.

use ticker_engine::prelude::*;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = EngineConfig::from_env();
    tracing::info!(
        interval = config.update_interval.as_secs(),
        quote = %config.quote_currency,
        control = %config.control.url,
        store = %config.store_dir.display(),
        "starting ticker engine"
    );

    let store_dir = config.store_dir.clone();
    let api_url = config.api_url.clone();

    run_supervised(
        config,
        move || match JsonStore::open(&store_dir) {
            Ok(store) => store,
            Err(e) => {
                // Unusable storage location is not recoverable by retrying.
                tracing::error!(%e, "cannot open store directory");
                std::process::exit(1);
            }
        },
        move || CoinGecko::new(&api_url),
    )
    .await;
}

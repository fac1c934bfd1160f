//! The update cycle — one steady loop, no hidden states.
//!
//! Bootstrap runs once: connect the control channel, fetch the asset
//! catalog. Then forever: reload the watch set from storage, refresh every
//! coin's price, persist, announce, and wait out the update interval while
//! polling the control channel once per second.
//!
//! [`run_supervised`] wraps the whole thing in a restart-on-crash loop so a
//! fatal error (retry budget exhausted, storage failure, anything
//! unanticipated) degrades to "log, cool down, re-enter bootstrap" rather
//! than permanent death.

use crate::config::EngineConfig;
use crate::control::{ControlChannel, DashboardMsg};
use crate::domain::coin::state::WatchSet;
use crate::error::EngineError;
use crate::source::{with_retry, AssetCatalog, PriceSource};
use crate::store::CoinStore;
use chrono::Utc;
use std::time::Duration;

/// The background price-update engine.
pub struct Engine<S, P> {
    config: EngineConfig,
    store: S,
    source: P,
    channel: ControlChannel,
    watch: WatchSet,
    catalog: AssetCatalog,
    override_message: Option<String>,
}

impl<S: CoinStore, P: PriceSource> Engine<S, P> {
    /// Bootstrap: establish the control channel, then fetch the asset
    /// catalog through the retry wrapper. A transient upstream outage here
    /// delays bootstrap; only an exhausted retry budget aborts it.
    pub async fn bootstrap(
        config: EngineConfig,
        store: S,
        source: P,
    ) -> Result<Self, EngineError> {
        let channel = ControlChannel::connect(config.control.clone()).await?;

        let entries = with_retry(&config.backoff, &channel, || source.list_assets()).await?;
        let catalog = AssetCatalog::from_entries(entries);
        tracing::info!(assets = catalog.len(), "bootstrap complete");

        Ok(Self {
            config,
            store,
            source,
            channel,
            watch: WatchSet::new(),
            catalog,
            override_message: None,
        })
    }

    /// Run update cycles until the process is terminated externally.
    pub async fn run(&mut self) -> Result<(), EngineError> {
        loop {
            let message = self.run_cycle().await?;
            tracing::info!(%message, coins = self.watch.len(), "cycle complete");
            self.wait_for_next_cycle().await;
        }
    }

    /// One full cycle: reload → refresh → persist → announce. Returns the
    /// announcement message that was logged.
    pub async fn run_cycle(&mut self) -> Result<String, EngineError> {
        self.reload()?;
        self.refresh_all().await?;
        self.persist()?;
        self.announce()
    }

    /// Read the watch set from storage, reconciled in place so surviving
    /// coins keep their identity (adding and deleting coins is the
    /// dashboard's job; storage is ground truth).
    fn reload(&mut self) -> Result<(), EngineError> {
        let records = self.store.load_watch_set()?;
        self.watch.reconcile(records);
        Ok(())
    }

    /// Refresh every coin: resolve its symbol from the catalog if still
    /// unknown, then fetch its spot price through the retry wrapper.
    ///
    /// A pair missing upstream leaves that coin's price absent and moves
    /// on; only an exhausted retry budget stops the pass.
    async fn refresh_all(&mut self) -> Result<(), EngineError> {
        let Self {
            config,
            source,
            channel,
            watch,
            catalog,
            ..
        } = self;

        for coin in watch.iter_mut() {
            if coin.symbol().is_none() {
                if let Some(symbol) = catalog.symbol_for(coin.id()) {
                    coin.set_symbol(Some(symbol.to_string()));
                }
            }

            let price = with_retry(&config.backoff, &*channel, || {
                source.spot_price(coin.id(), &config.quote_currency)
            })
            .await?;

            if price.is_none() {
                tracing::debug!(id = %coin.id(), quote = %config.quote_currency, "pair not found upstream");
            }
            coin.apply_quote(price, Utc::now());
        }
        Ok(())
    }

    /// Write every coin's engine-owned fields back in one unit.
    fn persist(&mut self) -> Result<(), EngineError> {
        let updates: Vec<_> = self.watch.iter().map(|coin| coin.update_record()).collect();
        self.store.persist_watch_set(&updates)?;
        Ok(())
    }

    /// Compute this cycle's message — the pending override exactly once,
    /// otherwise derived from the watch set — and append it to the message
    /// log. Empty messages are logged too.
    fn announce(&mut self) -> Result<String, EngineError> {
        let message = match self.override_message.take() {
            Some(text) if !text.is_empty() => text,
            _ => self.watch.announcement(),
        };
        self.store.append_log_entry(Utc::now(), &message)?;
        Ok(message)
    }

    /// Sleep out the update interval, polling the control channel once per
    /// second. `RequestUpdate` cuts the wait short; an override payload
    /// does too, carrying its text into the next cycle's announce step.
    pub async fn wait_for_next_cycle(&mut self) {
        for _ in 0..self.config.update_interval.as_secs() {
            match self.channel.poll_message() {
                Some(DashboardMsg::RequestUpdate) => {
                    tracing::debug!("update requested by dashboard");
                    return;
                }
                Some(DashboardMsg::Override { override_text }) => {
                    tracing::debug!(%override_text, "announcement override received");
                    self.override_message = Some(override_text);
                    return;
                }
                None => {}
            }
            tokio::time::sleep(Duration::from_secs(1)).await;
        }
    }

    /// The current in-memory watch set.
    pub fn watch_set(&self) -> &WatchSet {
        &self.watch
    }

    /// Whether the control channel connection is currently open.
    pub fn channel_connected(&self) -> bool {
        self.channel.is_connected()
    }
}

/// Run the engine forever, re-entering bootstrap with fresh collaborators
/// after any fatal error.
///
/// The factories are invoked once per (re)start so a crashed invocation
/// never leaks a poisoned storage handle or HTTP client into the next one.
pub async fn run_supervised<S, P, MS, MP>(
    config: EngineConfig,
    mut store_factory: MS,
    mut source_factory: MP,
) where
    S: CoinStore,
    P: PriceSource,
    MS: FnMut() -> S,
    MP: FnMut() -> P,
{
    loop {
        let store = store_factory();
        let source = source_factory();

        let result = match Engine::bootstrap(config.clone(), store, source).await {
            Ok(mut engine) => engine.run().await,
            Err(e) => Err(e),
        };

        if let Err(error) = result {
            tracing::error!(%error, "engine crashed; restarting after cooldown");
        }
        tokio::time::sleep(config.restart_cooldown).await;
    }
}

//! Price Poller
//!
//! Keeps a price map for the observed symbols. Each cycle fetches either the
//! whole list or the next round-robin batch in parallel and merges only the
//! successful results, so a failing symbol keeps its previous price.
//!
//! Cycles are driven by [`PricePoller::run`]: a fixed interval, plus an
//! immediate cycle whenever the symbol list changes or a manual refresh is
//! requested.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use chrono::{DateTime, Local, NaiveTime, Utc};
use futures::future::join_all;
use parking_lot::Mutex;
use tokio::sync::{Notify, watch};
use tokio::time::{Instant, MissedTickBehavior};
use tokio_util::sync::CancellationToken;

use super::ports::PriceFeed;
use crate::domain::{BatchCursor, PriceQuote, SymbolSet, TradingWindow};

/// Default delay between cycles.
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_secs(60);

// =============================================================================
// Configuration
// =============================================================================

/// Poller tuning.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PollerConfig {
    /// Delay between timer-driven cycles.
    pub interval: Duration,
    /// Symbols per cycle; `0` fetches every symbol each cycle.
    pub batch_size: usize,
    /// Local-time window outside of which cycles are skipped.
    pub trading_window: Option<TradingWindow>,
}

impl Default for PollerConfig {
    fn default() -> Self {
        Self {
            interval: DEFAULT_POLL_INTERVAL,
            batch_size: 0,
            trading_window: None,
        }
    }
}

/// What a cycle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CycleOutcome {
    /// Outside the trading window; nothing fetched.
    OutsideTradingHours,
    /// No symbols observed.
    Idle,
    /// A batch was fetched.
    Completed {
        /// Symbols requested.
        requested: usize,
        /// Prices merged.
        updated: usize,
        /// Symbols that kept their previous price.
        failed: usize,
    },
}

// =============================================================================
// Poller
// =============================================================================

#[derive(Debug, Default)]
struct PollerState {
    symbols: SymbolSet,
    cursor: BatchCursor,
    prices: HashMap<String, PriceQuote>,
}

/// Batched, staggered price poller.
pub struct PricePoller {
    feed: Arc<dyn PriceFeed>,
    config: PollerConfig,
    state: Mutex<PollerState>,
    refresh: Notify,
    refreshing: AtomicBool,
    updates: watch::Sender<Option<DateTime<Utc>>>,
    local_time: fn() -> NaiveTime,
}

impl PricePoller {
    /// Create a poller with no symbols.
    #[must_use]
    pub fn new(feed: Arc<dyn PriceFeed>, config: PollerConfig) -> Self {
        Self {
            feed,
            config,
            state: Mutex::new(PollerState::default()),
            refresh: Notify::new(),
            refreshing: AtomicBool::new(false),
            updates: watch::Sender::new(None),
            local_time: || Local::now().time(),
        }
    }

    /// Replace the wall-clock source used by [`PricePoller::run`].
    #[must_use]
    pub fn with_local_time(mut self, local_time: fn() -> NaiveTime) -> Self {
        self.local_time = local_time;
        self
    }

    /// Track `symbols`.
    ///
    /// Returns `false` when the list is equivalent to the current one. A
    /// changed list resets the batch cursor, drops prices of symbols no
    /// longer tracked, and requests an immediate cycle.
    pub fn observe<I, S>(&self, symbols: I) -> bool
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let next = SymbolSet::new(symbols);
        {
            let mut state = self.state.lock();
            if state.symbols == next {
                return false;
            }
            state
                .prices
                .retain(|symbol, _| next.as_slice().binary_search(symbol).is_ok());
            state.symbols = next;
            state.cursor = BatchCursor::new();
        }
        tracing::info!("Symbol list changed, polling immediately");
        self.refresh.notify_one();
        true
    }

    /// Request an immediate cycle.
    pub fn refresh_now(&self) {
        self.refresh.notify_one();
    }

    /// Snapshot of every known price.
    #[must_use]
    pub fn prices(&self) -> HashMap<String, PriceQuote> {
        self.state.lock().prices.clone()
    }

    /// Latest known price for `symbol`.
    #[must_use]
    pub fn price(&self, symbol: &str) -> Option<PriceQuote> {
        self.state
            .lock()
            .prices
            .get(&symbol.trim().to_uppercase())
            .cloned()
    }

    /// Currently tracked symbols.
    #[must_use]
    pub fn symbols(&self) -> SymbolSet {
        self.state.lock().symbols.clone()
    }

    /// When the last cycle completed.
    #[must_use]
    pub fn last_updated(&self) -> Option<DateTime<Utc>> {
        *self.updates.borrow()
    }

    /// Whether a cycle is in flight.
    #[must_use]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing.load(Ordering::Acquire)
    }

    /// Receiver notified after every completed cycle.
    #[must_use]
    pub fn subscribe(&self) -> watch::Receiver<Option<DateTime<Utc>>> {
        self.updates.subscribe()
    }

    /// Run one cycle as if the local time were `now`. Never fails.
    pub async fn poll_at(&self, now: NaiveTime) -> CycleOutcome {
        if let Some(window) = self.config.trading_window
            && !window.contains(now)
        {
            tracing::debug!(%window, "Outside trading hours, skipping cycle");
            return CycleOutcome::OutsideTradingHours;
        }

        let batch = {
            let mut state = self.state.lock();
            let PollerState {
                symbols, cursor, ..
            } = &mut *state;
            cursor
                .next_batch(symbols.as_slice(), self.config.batch_size)
                .to_vec()
        };
        if batch.is_empty() {
            return CycleOutcome::Idle;
        }

        let _refreshing = RefreshingFlag::raise(&self.refreshing);
        let feed = &self.feed;
        let results = join_all(batch.iter().map(|symbol| async move {
            (symbol, feed.latest_price(symbol).await)
        }))
        .await;

        let mut updated = 0;
        let mut failed = 0;
        {
            let mut state = self.state.lock();
            for (symbol, result) in results {
                match result {
                    Ok(quote) => {
                        state.prices.insert(symbol.clone(), quote);
                        updated += 1;
                    }
                    Err(e) => {
                        tracing::debug!(symbol = %symbol, error = %e, "Price unavailable, keeping previous");
                        failed += 1;
                    }
                }
            }
        }
        self.updates.send_replace(Some(Utc::now()));

        tracing::info!(requested = batch.len(), updated, failed, "Poll cycle completed");
        CycleOutcome::Completed {
            requested: batch.len(),
            updated,
            failed,
        }
    }

    /// Poll until `cancel` fires.
    pub async fn run(self: Arc<Self>, cancel: CancellationToken) {
        let interval = self.config.interval;
        let mut ticker = tokio::time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        tracing::info!(
            interval_secs = interval.as_secs(),
            batch_size = self.config.batch_size,
            "Price poller started"
        );

        loop {
            tokio::select! {
                () = cancel.cancelled() => break,
                _ = ticker.tick() => {}
                () = self.refresh.notified() => ticker.reset(),
            }
            self.poll_at((self.local_time)()).await;
        }

        tracing::info!("Price poller stopped");
    }
}

/// Lowers the refreshing flag when the cycle ends, even if it is dropped.
struct RefreshingFlag<'a>(&'a AtomicBool);

impl<'a> RefreshingFlag<'a> {
    fn raise(flag: &'a AtomicBool) -> Self {
        flag.store(true, Ordering::Release);
        Self(flag)
    }
}

impl Drop for RefreshingFlag<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

// =============================================================================
// Tests
// =============================================================================

//! Quote Cache
//!
//! In-process key/value store for upstream payloads with a time-to-live
//! that depends on the key:
//!
//! | Key | TTL |
//! |-----|-----|
//! | `profile_<SYM>` | 24 h |
//! | `forex_<SYM>` | 2 min |
//! | `FX:...` / `OANDA:...` quote | 2 min |
//! | any other quote | 10 min |
//!
//! Entries are only purged when a read finds them stale. There is no
//! capacity bound: the map grows with the number of distinct keys seen.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::clock::{Clock, Millis};
use super::market::{FOREX_KEY_PREFIX, MarketPayload, PROFILE_KEY_PREFIX};

/// TTL for stock quotes.
pub const STOCK_QUOTE_TTL: Duration = Duration::from_secs(10 * 60);

/// TTL for forex quotes (prefixed symbols and synthesized rates).
pub const FOREX_QUOTE_TTL: Duration = Duration::from_secs(2 * 60);

/// TTL for company profiles.
pub const PROFILE_TTL: Duration = Duration::from_secs(24 * 60 * 60);

/// Storage for cached market payloads.
///
/// Lets a shared backing store replace the in-process map without
/// touching the quote service.
pub trait QuoteStore: Send + Sync {
    /// Look up a fresh payload. Stale entries count as misses.
    fn get(&self, key: &str) -> Option<MarketPayload>;

    /// Store a payload, stamping it with the current time.
    fn set(&self, key: &str, payload: MarketPayload);

    /// Number of entries currently held (fresh or not yet purged).
    fn len(&self) -> usize;

    /// Whether the store holds no entries.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Time-to-live for a cache key.
#[must_use]
pub fn ttl_for_key(key: &str) -> Duration {
    if key.starts_with(PROFILE_KEY_PREFIX) {
        PROFILE_TTL
    } else if key.starts_with(FOREX_KEY_PREFIX) || key.starts_with("FX:") || key.starts_with("OANDA:")
    {
        FOREX_QUOTE_TTL
    } else {
        STOCK_QUOTE_TTL
    }
}

#[derive(Debug, Clone)]
struct CacheEntry {
    data: MarketPayload,
    timestamp: Millis,
}

/// In-memory [`QuoteStore`].
pub struct QuoteCache {
    entries: Mutex<HashMap<String, CacheEntry>>,
    clock: Arc<dyn Clock>,
}

impl QuoteCache {
    /// Create an empty cache reading time from `clock`.
    #[must_use]
    pub fn new(clock: Arc<dyn Clock>) -> Self {
        Self {
            entries: Mutex::new(HashMap::new()),
            clock,
        }
    }
}

impl QuoteStore for QuoteCache {
    fn get(&self, key: &str) -> Option<MarketPayload> {
        let now = self.clock.now_millis();
        let ttl = i64::try_from(ttl_for_key(key).as_millis()).unwrap_or(i64::MAX);

        let mut entries = self.entries.lock();
        let entry = entries.get(key)?;
        if now.saturating_sub(entry.timestamp) >= ttl {
            entries.remove(key);
            tracing::debug!(key, "Purged stale cache entry");
            return None;
        }
        Some(entry.data.clone())
    }

    fn set(&self, key: &str, payload: MarketPayload) {
        let entry = CacheEntry {
            data: payload,
            timestamp: self.clock.now_millis(),
        };
        self.entries.lock().insert(key.to_string(), entry);
    }

    fn len(&self) -> usize {
        self.entries.lock().len()
    }
}

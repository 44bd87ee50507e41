//! Polling schedule: round-robin batches and the trading-hours window.

use std::fmt;
use std::str::FromStr;

use chrono::NaiveTime;

/// Default batch size when batching is enabled.
pub const DEFAULT_BATCH_SIZE: usize = 15;

// =============================================================================
// Batch Cursor
// =============================================================================

/// Round-robin position over a symbol list.
///
/// With a batch size `B` over `n` symbols, cycle `k` covers the slice
/// starting at `(k * B) % n`, and the cursor wraps after `ceil(n / B)`
/// cycles. A batch size of zero, or one at least `n`, covers every symbol
/// each cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchCursor {
    index: usize,
}

impl BatchCursor {
    /// Cursor at the first batch.
    #[must_use]
    pub const fn new() -> Self {
        Self { index: 0 }
    }

    /// Current batch index.
    #[must_use]
    pub const fn index(&self) -> usize {
        self.index
    }

    /// Take the next batch and advance.
    pub fn next_batch<'a>(&mut self, symbols: &'a [String], batch_size: usize) -> &'a [String] {
        let len = symbols.len();
        if batch_size == 0 || batch_size >= len {
            self.index = 0;
            return symbols;
        }

        let batches = len.div_ceil(batch_size);
        let index = self.index % batches;
        let start = (index * batch_size) % len;
        let end = (start + batch_size).min(len);
        self.index = (index + 1) % batches;
        &symbols[start..end]
    }
}

// =============================================================================
// Trading Window
// =============================================================================

/// Local-time window during which polling runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TradingWindow {
    start: NaiveTime,
    end: NaiveTime,
}

impl TradingWindow {
    /// Create a window. `start > end` spans midnight.
    #[must_use]
    pub const fn new(start: NaiveTime, end: NaiveTime) -> Self {
        Self { start, end }
    }

    /// Whether `time` falls inside the window, bounds included.
    #[must_use]
    pub fn contains(&self, time: NaiveTime) -> bool {
        if self.start <= self.end {
            self.start <= time && time <= self.end
        } else {
            time >= self.start || time <= self.end
        }
    }
}

impl Default for TradingWindow {
    fn default() -> Self {
        Self {
            start: NaiveTime::from_hms_opt(7, 30, 0).unwrap_or(NaiveTime::MIN),
            end: NaiveTime::from_hms_opt(23, 0, 0).unwrap_or(NaiveTime::MIN),
        }
    }
}

impl fmt::Display for TradingWindow {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.start.format("%H:%M"), self.end.format("%H:%M"))
    }
}

/// Error parsing a `HH:MM-HH:MM` window.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid trading window '{0}', expected HH:MM-HH:MM")]
pub struct TradingWindowParseError(String);

impl FromStr for TradingWindow {
    type Err = TradingWindowParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || TradingWindowParseError(s.to_string());
        let (start, end) = s.split_once('-').ok_or_else(err)?;
        let parse = |t: &str| NaiveTime::parse_from_str(t.trim(), "%H:%M").map_err(|_| err());
        Ok(Self::new(parse(start)?, parse(end)?))
    }
}

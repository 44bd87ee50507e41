//! Fixed-Window Rate Limiter
//!
//! Caps upstream quote calls at a budget per one-minute window. The window
//! resets lazily on the first check after it elapsed, so bursts straddling
//! a window boundary are accepted.

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use super::clock::{Clock, Millis};

/// Default number of upstream calls allowed per window.
pub const DEFAULT_BUDGET: u32 = 30;

/// Length of a rate window.
pub const WINDOW_LENGTH: Duration = Duration::from_secs(60);

/// Where a limited result came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LimitOrigin {
    /// Local fixed-window budget.
    Local,
    /// Provider throttled the call.
    Upstream,
}

impl LimitOrigin {
    /// Label for logs and metrics.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Upstream => "upstream",
        }
    }
}

/// Permission to spend one upstream request.
pub trait RequestBudget: Send + Sync {
    /// Take one slot from the current window. Returns `false` when the
    /// budget is exhausted; a refusal does not consume anything.
    fn try_acquire(&self) -> bool;

    /// Current window usage, for health reporting.
    fn snapshot(&self) -> RateWindowSnapshot;
}

/// Read-only view of the current window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
pub struct RateWindowSnapshot {
    /// Slots used in the current window.
    pub count: u32,
    /// Slots available per window.
    pub budget: u32,
    /// Window start (epoch milliseconds).
    pub window_start: Millis,
}

#[derive(Debug)]
struct RateWindow {
    count: u32,
    window_start: Millis,
}

/// In-memory [`RequestBudget`] over a fixed window.
pub struct FixedWindowRateLimiter {
    state: Mutex<RateWindow>,
    budget: u32,
    window_millis: Millis,
    clock: Arc<dyn Clock>,
}

impl FixedWindowRateLimiter {
    /// Create a limiter with `budget` slots per [`WINDOW_LENGTH`].
    #[must_use]
    pub fn new(budget: u32, clock: Arc<dyn Clock>) -> Self {
        Self::with_window(budget, WINDOW_LENGTH, clock)
    }

    /// Create a limiter with a custom window length.
    #[must_use]
    pub fn with_window(budget: u32, window: Duration, clock: Arc<dyn Clock>) -> Self {
        let window_start = clock.now_millis();
        Self {
            state: Mutex::new(RateWindow {
                count: 0,
                window_start,
            }),
            budget,
            window_millis: i64::try_from(window.as_millis()).unwrap_or(i64::MAX),
            clock,
        }
    }
}

impl RequestBudget for FixedWindowRateLimiter {
    fn try_acquire(&self) -> bool {
        let now = self.clock.now_millis();
        let mut window = self.state.lock();

        if now.saturating_sub(window.window_start) > self.window_millis {
            window.count = 0;
            window.window_start = now;
        }

        if window.count >= self.budget {
            return false;
        }
        window.count += 1;
        true
    }

    fn snapshot(&self) -> RateWindowSnapshot {
        let window = self.state.lock();
        RateWindowSnapshot {
            count: window.count,
            budget: self.budget,
            window_start: window.window_start,
        }
    }
}

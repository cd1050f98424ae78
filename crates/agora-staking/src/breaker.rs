//! Per-pool withdrawal circuit breaker.
//!
//! Bounds the maximum single-day drain from any one pool regardless of
//! how legitimate the individual claims are. The window rolls: once
//! `period_secs` have passed since the window opened, the counter resets
//! on the next touch.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One pool's rolling window
#[derive(Clone, Copy, Debug, Default, Serialize, Deserialize)]
struct Window {
    start: i64,
    withdrawn: u128,
}

/// A tripped breaker: the attempted payout would cross the cap
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BreakerTrip {
    pub pool_id: u64,
    pub attempted: u128,
    pub limit: u128,
}

/// Rolling-window withdrawal caps, one window per pool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct WithdrawalBreaker {
    period_secs: i64,
    default_limit: u128,
    limits: HashMap<u64, u128>,
    windows: HashMap<u64, Window>,
}

impl WithdrawalBreaker {
    /// Create a breaker with the given rolling period and default cap
    pub fn new(period_secs: i64, default_limit: u128) -> Self {
        Self {
            period_secs,
            default_limit,
            limits: HashMap::new(),
            windows: HashMap::new(),
        }
    }

    /// Effective cap for a pool
    pub fn limit_for(&self, pool_id: u64) -> u128 {
        self.limits.get(&pool_id).copied().unwrap_or(self.default_limit)
    }

    /// Override a pool's cap
    pub fn set_limit(&mut self, pool_id: u64, limit: u128) {
        self.limits.insert(pool_id, limit);
    }

    /// Amount withdrawn from a pool in the current window
    pub fn withdrawn_in_window(&self, pool_id: u64, now: i64) -> u128 {
        match self.windows.get(&pool_id) {
            Some(w) if now < w.start + self.period_secs => w.withdrawn,
            _ => 0,
        }
    }

    /// Would paying `amount` from `pool_id` cross the cap? Read-only:
    /// callers check first, run their own fallible settlement, then
    /// [`record`](Self::record).
    pub fn check(&self, pool_id: u64, amount: u128, now: i64) -> Result<(), BreakerTrip> {
        let already = self.withdrawn_in_window(pool_id, now);
        let attempted = already.saturating_add(amount);
        let limit = self.limit_for(pool_id);
        if attempted > limit {
            return Err(BreakerTrip {
                pool_id,
                attempted,
                limit,
            });
        }
        Ok(())
    }

    /// Record a completed payout, rolling the window if it lapsed
    pub fn record(&mut self, pool_id: u64, amount: u128, now: i64) {
        let period = self.period_secs;
        let window = self.windows.entry(pool_id).or_default();
        if now >= window.start + period {
            window.start = now;
            window.withdrawn = 0;
        }
        window.withdrawn = window.withdrawn.saturating_add(amount);
    }
}

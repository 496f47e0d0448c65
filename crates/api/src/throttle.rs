//! Per-scope request throttling with keyed GCRA limiters.

use std::collections::HashMap;
use std::net::IpAddr;
use std::time::Duration;

use common::UserId;
use domain::ThrottleScope;
use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter};

use crate::config::{Rate, ThrottleRates};
use crate::error::ApiError;

/// Whose allowance a request is charged to.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ThrottleKey {
    User(UserId),
    /// Anonymous callers are keyed by client address.
    Anonymous(IpAddr),
}

/// Tracked keys per scope before fully replenished entries are dropped.
const MAX_TRACKED_KEYS: usize = 10_000;

/// One keyed limiter per throttle scope.
pub struct Throttle {
    limiters: HashMap<ThrottleScope, DefaultKeyedRateLimiter<ThrottleKey>>,
    max_tracked_keys: usize,
}

impl Throttle {
    pub fn new(rates: &ThrottleRates) -> Self {
        Self::with_max_tracked_keys(rates, MAX_TRACKED_KEYS)
    }

    fn with_max_tracked_keys(rates: &ThrottleRates, max_tracked_keys: usize) -> Self {
        let limiters = ThrottleScope::ALL
            .into_iter()
            .map(|scope| (scope, RateLimiter::keyed(quota(rates.get(scope)))))
            .collect();

        Self {
            limiters,
            max_tracked_keys,
        }
    }

    /// Charges one request to `key` in `scope`.
    pub fn check(&self, scope: ThrottleScope, key: &ThrottleKey) -> Result<(), ApiError> {
        let Some(limiter) = self.limiters.get(&scope) else {
            return Ok(());
        };

        if limiter.len() > self.max_tracked_keys {
            limiter.retain_recent();
            limiter.shrink_to_fit();
        }

        limiter.check_key(key).map_err(|not_until| {
            let wait = not_until.wait_time_from(limiter.clock().now());
            metrics::counter!("requests_throttled_total", "scope" => scope.as_str()).increment(1);
            tracing::warn!(%scope, ?key, wait_secs = wait.as_secs_f64(), "request throttled");
            ApiError::Throttled { wait }
        })
    }
}

#[cfg(test)]
impl Throttle {
    fn tracked_keys(&self, scope: ThrottleScope) -> usize {
        self.limiters.get(&scope).map_or(0, |limiter| limiter.len())
    }
}

/// Spreads `limit` requests evenly over `period`, allowing the whole
/// allowance as a burst.
fn quota(rate: Rate) -> Quota {
    let interval = rate.period / rate.limit.get();
    Quota::with_period(interval.max(Duration::from_nanos(1)))
        .map(|quota| quota.allow_burst(rate.limit))
        .unwrap_or_else(|| Quota::per_second(rate.limit))
}

//! # Request Rate Limiting
//!
//! Per-client request budgets for the order and reservation endpoints.
//!
//! ## Budget Model
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  RateLimitSettings { max_requests: 60, window_secs: 60 }                │
//! │                                                                         │
//! │  client key ──► check() ──► ┌────────────────────────┐                  │
//! │  (IP / user id)             │ keyed GCRA limiter     │                  │
//! │                             │  burst  = max_requests │                  │
//! │                             │  refill = window / max │                  │
//! │                             └───────────┬────────────┘                  │
//! │                        ┌────────────────┴────────────────┐              │
//! │                        ▼                                 ▼              │
//! │                     Ok(())                   Err(RateLimited {          │
//! │                                                retry_after_secs })      │
//! │                                                                         │
//! │  retain_recent() drops keys whose budget has fully refilled.            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The limiter is an ordinary value. Build one per service and share it
//! with `Arc`.

use std::num::NonZeroU32;
use std::time::Duration;

use governor::clock::Clock;
use governor::{DefaultKeyedRateLimiter, Quota, RateLimiter as GovernorRateLimiter};
use tracing::{debug, warn};

use crate::config::RateLimitSettings;
use crate::error::{LiveError, LiveResult};

/// Keyed request limiter.
pub struct RateLimiter {
    limiter: DefaultKeyedRateLimiter<String>,
    settings: RateLimitSettings,
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("settings", &self.settings)
            .field("tracked_keys", &self.limiter.len())
            .finish()
    }
}

impl RateLimiter {
    pub fn new(settings: RateLimitSettings) -> LiveResult<Self> {
        let burst = NonZeroU32::new(settings.max_requests).ok_or_else(|| {
            LiveError::InvalidConfig("rate_limit.max_requests must be greater than 0".into())
        })?;

        if settings.window_secs == 0 {
            return Err(LiveError::InvalidConfig(
                "rate_limit.window_secs must be greater than 0".into(),
            ));
        }

        let period = Duration::from_secs(settings.window_secs) / settings.max_requests;
        let quota = Quota::with_period(period)
            .unwrap_or_else(|| Quota::per_second(burst))
            .allow_burst(burst);

        debug!(
            max_requests = settings.max_requests,
            window_secs = settings.window_secs,
            "Rate limiter created"
        );

        Ok(RateLimiter {
            limiter: GovernorRateLimiter::keyed(quota),
            settings,
        })
    }

    /// Records one request for `key`.
    pub fn check(&self, key: &str) -> LiveResult<()> {
        match self.limiter.check_key(&key.to_string()) {
            Ok(()) => Ok(()),
            Err(not_until) => {
                let wait = not_until.wait_time_from(self.limiter.clock().now());
                let retry_after_secs = retry_after_secs(wait);
                warn!(key, retry_after_secs, "Rate limit exceeded");
                Err(LiveError::RateLimited {
                    key: key.to_string(),
                    retry_after_secs,
                })
            }
        }
    }

    /// Forgets keys that are back to a full budget.
    pub fn retain_recent(&self) {
        self.limiter.retain_recent();
        self.limiter.shrink_to_fit();
    }

    /// Number of client keys currently held in memory.
    pub fn tracked_keys(&self) -> usize {
        self.limiter.len()
    }

    pub fn settings(&self) -> RateLimitSettings {
        self.settings
    }
}

/// Whole seconds to wait, rounded up, never zero.
fn retry_after_secs(wait: Duration) -> u64 {
    let secs = wait.as_secs() + u64::from(wait.subsec_nanos() > 0);
    secs.max(1)
}

//! Request pacing for provider endpoints.
//!
//! The upstream endpoints are free public APIs; pacing keeps a multi-symbol
//! fan-out from hammering them. There is deliberately no retry or backoff:
//! a request that fails stays failed and its key is dropped by the caller.

use std::num::NonZeroU32;

use governor::clock::DefaultClock;
use governor::state::direct::NotKeyed;
use governor::state::InMemoryState;
use governor::{Quota, RateLimiter};

type DirectRateLimiter = RateLimiter<NotKeyed, InMemoryState, DefaultClock>;

const DEFAULT_REQUESTS_PER_SECOND: u32 = 16;

/// Direct-quota limiter shared by all requests of one adapter.
pub struct RequestPacer {
    limiter: DirectRateLimiter,
}

impl RequestPacer {
    pub fn per_second(limit: u32) -> Self {
        let limit = NonZeroU32::new(limit.max(1)).expect("limit is clamped to at least 1");
        Self {
            limiter: RateLimiter::direct(Quota::per_second(limit)),
        }
    }

    /// Waits until the quota admits one more request.
    pub async fn acquire(&self) {
        self.limiter.until_ready().await;
    }

    /// Non-blocking probe, used where waiting is not an option.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

impl Default for RequestPacer {
    fn default() -> Self {
        Self::per_second(DEFAULT_REQUESTS_PER_SECOND)
    }
}

//! Per-provider request gate.
//!
//! Token bucket: a full second's worth of requests may go out in a burst,
//! then one slot refills every `1 / per_second` seconds. Callers wait for a
//! free slot instead of being rejected.

use std::num::NonZeroU32;
use std::sync::Arc;

use governor::{DefaultDirectRateLimiter, Quota, RateLimiter};
use tracing::debug;

#[derive(Clone)]
pub struct RateGate {
    limiter: Arc<DefaultDirectRateLimiter>,
}

impl RateGate {
    pub fn per_second(max_requests: u32) -> Self {
        let rate = NonZeroU32::new(max_requests).unwrap_or(NonZeroU32::MIN);
        Self {
            limiter: Arc::new(RateLimiter::direct(Quota::per_second(rate))),
        }
    }

    /// Wait until a request slot is free, then take it.
    pub async fn acquire(&self) {
        if self.try_acquire() {
            return;
        }
        debug!("rate gate full, waiting");
        self.limiter.until_ready().await;
    }

    /// Take a slot if one is free right now.
    pub fn try_acquire(&self) -> bool {
        self.limiter.check().is_ok()
    }
}

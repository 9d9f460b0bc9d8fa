//! Process-wide pacing for outbound geocoding requests.
//!
//! The public provider caps clients at one request per second. A single
//! [`RateLimiter`] is constructed at startup and shared (`Arc`) with every
//! component that issues provider requests, so independent flows funnel
//! through the same gate.

use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

/// Default gap between requests: the provider's 1000 ms floor plus headroom
/// for clock jitter.
pub const DEFAULT_MIN_INTERVAL: Duration = Duration::from_millis(1100);

/// Grants request slots no closer together than a minimum interval.
///
/// The only state is the instant of the most recently granted slot. There is
/// no reset; it lives as long as the limiter.
#[derive(Debug)]
pub struct RateLimiter {
    min_interval: Duration,
    last_slot: Mutex<Option<Instant>>,
}

impl RateLimiter {
    #[must_use]
    pub fn new(min_interval: Duration) -> Self {
        Self {
            min_interval,
            last_slot: Mutex::new(None),
        }
    }

    #[must_use]
    pub fn min_interval(&self) -> Duration {
        self.min_interval
    }

    /// Waits for the next slot using the configured interval and returns the
    /// instant it was granted at.
    pub async fn await_slot(&self) -> Instant {
        self.await_slot_with(self.min_interval).await
    }

    /// Waits for the next slot at least `interval` after the previous one.
    ///
    /// The slot is reserved before suspending, so concurrent callers queue at
    /// distinct instants instead of all observing the same stale timestamp.
    pub async fn await_slot_with(&self, interval: Duration) -> Instant {
        let slot = self.reserve(interval);
        let now = Instant::now();
        if slot > now {
            tracing::trace!(
                wait_ms = u64::try_from((slot - now).as_millis()).unwrap_or(u64::MAX),
                "waiting for geocoder request slot"
            );
            tokio::time::sleep_until(slot).await;
        }
        slot
    }

    /// Check-and-update of the last slot in one non-suspending step.
    fn reserve(&self, interval: Duration) -> Instant {
        let now = Instant::now();
        let mut last = self.last_slot.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = match *last {
            Some(previous) => previous
                .checked_add(interval)
                .map_or(now, |earliest| earliest.max(now)),
            None => now,
        };
        *last = Some(slot);
        slot
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        Self::new(DEFAULT_MIN_INTERVAL)
    }
}

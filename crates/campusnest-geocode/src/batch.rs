//! Sequential, paced resolution of many addresses.
//!
//! One failed lookup never aborts a batch: the address is simply left out of
//! the [`BatchResult`]. Requests are issued strictly in input order, one at a
//! time, each behind a slot from the shared [`RateLimiter`], so a batch of n
//! addresses takes at least `(n - 1) * interval` of wall-clock time.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;

use crate::geocoder::Geocoder;
use crate::rate_limit::RateLimiter;
use crate::types::{GeocodeQuery, GeocodeResult};

/// Resolved addresses keyed by the caller's original (untrimmed) string.
/// Absence of a key is the failure signal.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(transparent)]
pub struct BatchResult(HashMap<String, GeocodeResult>);

impl BatchResult {
    #[must_use]
    pub fn get(&self, address: &str) -> Option<&GeocodeResult> {
        self.0.get(address)
    }

    #[must_use]
    pub fn contains(&self, address: &str) -> bool {
        self.0.contains_key(address)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &GeocodeResult)> {
        self.0.iter()
    }

    #[must_use]
    pub fn into_inner(self) -> HashMap<String, GeocodeResult> {
        self.0
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum FailureReason {
    /// The provider returned zero candidates.
    NotFound,
    /// Rejected before sending (blank address).
    Invalid(String),
    /// Transport, status, or malformed-response failure.
    Failed(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BatchFailure {
    pub address: String,
    pub reason: FailureReason,
}

/// A [`BatchResult`] plus the reason each missing address was skipped.
#[derive(Debug, Clone, Default, Serialize)]
pub struct BatchReport {
    pub resolved: BatchResult,
    pub failures: Vec<BatchFailure>,
}

pub struct BatchResolver {
    geocoder: Arc<dyn Geocoder>,
    limiter: Arc<RateLimiter>,
}

impl BatchResolver {
    #[must_use]
    pub fn new(geocoder: Arc<dyn Geocoder>, limiter: Arc<RateLimiter>) -> Self {
        Self { geocoder, limiter }
    }

    /// Resolves `addresses` using the shared limiter's configured interval.
    pub async fn resolve_all<S: AsRef<str>>(&self, addresses: &[S]) -> BatchResult {
        self.resolve_all_with_interval(addresses, self.limiter.min_interval())
            .await
    }

    /// Resolves `addresses` with an explicit gap between requests.
    pub async fn resolve_all_with_interval<S: AsRef<str>>(
        &self,
        addresses: &[S],
        interval: Duration,
    ) -> BatchResult {
        self.resolve_all_detailed(addresses, interval).await.resolved
    }

    /// Like [`BatchResolver::resolve_all_with_interval`], but also reports why
    /// each unresolved address was skipped.
    ///
    /// Duplicate addresses are looked up independently; a later success
    /// overwrites an earlier one under the same key.
    pub async fn resolve_all_detailed<S: AsRef<str>>(
        &self,
        addresses: &[S],
        interval: Duration,
    ) -> BatchReport {
        let mut report = BatchReport::default();

        for address in addresses {
            let address = address.as_ref();
            let query = match GeocodeQuery::new(address) {
                Ok(query) => query,
                Err(e) => {
                    tracing::warn!(address, error = %e, "batch geocode: skipping invalid address");
                    report.failures.push(BatchFailure {
                        address: address.to_owned(),
                        reason: FailureReason::Invalid(e.to_string()),
                    });
                    continue;
                }
            };

            // On an idle limiter the first slot is immediate.
            self.limiter.await_slot_with(interval).await;

            match self.geocoder.search(&query).await {
                Ok(Some(result)) => {
                    report.resolved.0.insert(address.to_owned(), result);
                }
                Ok(None) => {
                    tracing::debug!(address, "batch geocode: no candidates");
                    report.failures.push(BatchFailure {
                        address: address.to_owned(),
                        reason: FailureReason::NotFound,
                    });
                }
                Err(e) => {
                    tracing::warn!(address, error = %e, "batch geocode: lookup failed");
                    report.failures.push(BatchFailure {
                        address: address.to_owned(),
                        reason: FailureReason::Failed(e.to_string()),
                    });
                }
            }
        }

        tracing::info!(
            requested = addresses.len(),
            resolved = report.resolved.len(),
            failed = report.failures.len(),
            "batch geocode complete"
        );
        report
    }
}

#[cfg(test)]
#[path = "batch_test.rs"]
mod tests;

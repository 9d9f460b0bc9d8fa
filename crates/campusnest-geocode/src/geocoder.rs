//! The lookup seam shared by the batch resolver and the location picker.

use async_trait::async_trait;

use crate::error::GeocodeError;
use crate::types::{GeocodeQuery, GeocodeResult, ReverseQuery};

/// A geocoding provider that resolves addresses to coordinates and back.
///
/// Implementations perform exactly one provider round trip per call and do
/// no pacing of their own; callers share a [`crate::RateLimiter`] for that.
#[async_trait]
pub trait Geocoder: Send + Sync {
    /// Forward lookup of the top-ranked candidate.
    ///
    /// # Errors
    ///
    /// Transport, status, and malformed-response failures. Zero candidates is
    /// `Ok(None)`, never an error.
    async fn search(&self, query: &GeocodeQuery) -> Result<Option<GeocodeResult>, GeocodeError>;

    /// Reverse lookup of a display name.
    ///
    /// # Errors
    ///
    /// Same failure classes as [`Geocoder::search`]; an unknown location is
    /// `Ok(None)`.
    async fn reverse(&self, query: &ReverseQuery) -> Result<Option<String>, GeocodeError>;

    /// Forward lookup that folds every failure into `None` after logging it.
    async fn geocode_address(&self, address: &str) -> Option<GeocodeResult> {
        let query = match GeocodeQuery::new(address) {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(address, error = %e, "geocode skipped: invalid input");
                return None;
            }
        };
        match self.search(&query).await {
            Ok(Some(result)) => Some(result),
            Ok(None) => {
                tracing::debug!(address, "geocode: no candidates");
                None
            }
            Err(e) => {
                tracing::warn!(address, error = %e, "geocode failed");
                None
            }
        }
    }

    /// Reverse lookup that folds every failure into `None` after logging it.
    async fn reverse_geocode(&self, latitude: f64, longitude: f64) -> Option<String> {
        let query = match ReverseQuery::new(latitude, longitude) {
            Ok(query) => query,
            Err(e) => {
                tracing::warn!(latitude, longitude, error = %e, "reverse geocode skipped: invalid input");
                return None;
            }
        };
        match self.reverse(&query).await {
            Ok(Some(name)) => Some(name),
            Ok(None) => {
                tracing::debug!(latitude, longitude, "reverse geocode: no address");
                None
            }
            Err(e) => {
                tracing::warn!(latitude, longitude, error = %e, "reverse geocode failed");
                None
            }
        }
    }
}

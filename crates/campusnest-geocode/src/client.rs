//! HTTP client for a Nominatim-compatible geocoding API.
//!
//! Wraps `reqwest` with provider-specific URL building, status handling, and
//! response decoding. All knowledge of the provider's JSON shape stays in this
//! module and [`crate::types`].

use std::time::Duration;

use async_trait::async_trait;
use campusnest_core::GeocoderSettings;
use reqwest::{Client, Url};
use serde::de::DeserializeOwned;

use crate::error::GeocodeError;
use crate::geocoder::Geocoder;
use crate::types::{GeocodeQuery, GeocodeResult, ReversePayload, ReverseQuery, SearchCandidate};

pub const DEFAULT_BASE_URL: &str = "https://nominatim.openstreetmap.org/";

/// Client for the provider's `/search` and `/reverse` endpoints.
///
/// Use [`NominatimClient::from_settings`] in production or
/// [`NominatimClient::with_base_url`] to point at a mock server in tests.
pub struct NominatimClient {
    client: Client,
    base_url: Url,
    email: Option<String>,
}

impl NominatimClient {
    /// Creates a client pointed at the public provider.
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed.
    pub fn new(user_agent: &str, timeout_secs: u64) -> Result<Self, GeocodeError> {
        Self::with_base_url(user_agent, timeout_secs, DEFAULT_BASE_URL)
    }

    /// Creates a client from loaded application settings.
    ///
    /// # Errors
    ///
    /// Same as [`NominatimClient::with_base_url`].
    pub fn from_settings(settings: &GeocoderSettings) -> Result<Self, GeocodeError> {
        let mut client = Self::with_base_url(
            &settings.user_agent,
            settings.request_timeout_secs,
            &settings.base_url,
        )?;
        client.email.clone_from(&settings.email);
        Ok(client)
    }

    /// Creates a client with a custom base URL (for testing with wiremock).
    ///
    /// # Errors
    ///
    /// Returns [`GeocodeError::Http`] if the underlying `reqwest::Client`
    /// cannot be constructed, or [`GeocodeError::InvalidInput`] if `base_url`
    /// is not a valid URL or `user_agent` is blank.
    pub fn with_base_url(
        user_agent: &str,
        timeout_secs: u64,
        base_url: &str,
    ) -> Result<Self, GeocodeError> {
        if user_agent.trim().is_empty() {
            return Err(GeocodeError::InvalidInput(
                "a client-identifying User-Agent is required".to_owned(),
            ));
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .connect_timeout(Duration::from_secs(10))
            .user_agent(user_agent)
            .build()?;

        // Exactly one trailing slash so `join` appends to the base path
        // instead of replacing its last segment.
        let normalised = format!("{}/", base_url.trim_end_matches('/'));
        let base_url = Url::parse(&normalised).map_err(|e| {
            GeocodeError::InvalidInput(format!("invalid base URL '{base_url}': {e}"))
        })?;

        Ok(Self {
            client,
            base_url,
            email: None,
        })
    }

    /// Sets the contact address sent with every request.
    #[must_use]
    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }

    /// Builds an endpoint URL with percent-encoded query parameters.
    fn build_url(&self, endpoint: &str, params: &[(&str, &str)]) -> Result<Url, GeocodeError> {
        let mut url = self.base_url.join(endpoint).map_err(|e| {
            GeocodeError::InvalidInput(format!("cannot join endpoint '{endpoint}': {e}"))
        })?;
        {
            let mut pairs = url.query_pairs_mut();
            for (k, v) in params {
                pairs.append_pair(k, v);
            }
            pairs.append_pair("format", "json");
            if let Some(email) = &self.email {
                pairs.append_pair("email", email);
            }
        }
        Ok(url)
    }

    /// Sends a GET request, maps non-2xx statuses to typed errors, and decodes
    /// the body.
    async fn request_json<T: DeserializeOwned>(
        &self,
        url: Url,
        context: &str,
    ) -> Result<T, GeocodeError> {
        let response = self.client.get(url.clone()).send().await?;
        let status = response.status();

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            return Err(GeocodeError::RateLimited {
                url: url.to_string(),
            });
        }

        if !status.is_success() {
            return Err(GeocodeError::UnexpectedStatus {
                status: status.as_u16(),
                url: url.to_string(),
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| GeocodeError::Deserialize {
            context: context.to_owned(),
            source: e,
        })
    }
}

#[async_trait]
impl Geocoder for NominatimClient {
    async fn search(&self, query: &GeocodeQuery) -> Result<Option<GeocodeResult>, GeocodeError> {
        let url = self.build_url(
            "search",
            &[("q", query.text()), ("limit", "1"), ("addressdetails", "1")],
        )?;
        let context = format!("search(q={})", query.text());

        let candidates: Vec<SearchCandidate> = self.request_json(url, &context).await?;
        // limit=1, and the provider's ranking is taken as-is.
        let Some(top) = candidates.into_iter().next() else {
            return Ok(None);
        };

        let result = GeocodeResult::from_candidate(top, &context)?;
        tracing::debug!(
            query = query.text(),
            latitude = result.latitude,
            longitude = result.longitude,
            "forward geocode resolved"
        );
        Ok(Some(result))
    }

    async fn reverse(&self, query: &ReverseQuery) -> Result<Option<String>, GeocodeError> {
        let coords = query.coordinates();
        let lat = coords.latitude.to_string();
        let lon = coords.longitude.to_string();
        let url = self.build_url("reverse", &[("lat", &lat), ("lon", &lon)])?;
        let context = format!("reverse(lat={lat}, lon={lon})");

        let payload: ReversePayload = self.request_json(url, &context).await?;
        match (payload.display_name, payload.error) {
            (Some(name), _) => Ok(Some(name)),
            (None, Some(reason)) => {
                tracing::debug!(%lat, %lon, reason = %reason, "reverse geocode: provider has no address");
                Ok(None)
            }
            (None, None) => Err(GeocodeError::Malformed {
                context,
                reason: "response has neither display_name nor error".to_owned(),
            }),
        }
    }
}

#[cfg(test)]
#[path = "client_test.rs"]
mod tests;

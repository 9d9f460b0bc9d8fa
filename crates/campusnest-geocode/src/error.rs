use thiserror::Error;

/// Errors raised while talking to the geocoding provider.
///
/// "Nothing found" is deliberately not a variant: lookups report it as
/// `Ok(None)` so callers never have to treat a missing address as a failure.
#[derive(Debug, Error)]
pub enum GeocodeError {
    /// Network, TLS, or timeout failure from the underlying HTTP client.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("rate limited by geocoding provider at {url}")]
    RateLimited { url: String },

    #[error("unexpected HTTP status {status} from {url}")]
    UnexpectedStatus { status: u16, url: String },

    /// The response body is not valid JSON for the expected shape.
    #[error("JSON deserialization error for {context}: {source}")]
    Deserialize {
        context: String,
        #[source]
        source: serde_json::Error,
    },

    /// The body parsed but carried unusable values (e.g. a latitude of `"abc"`).
    #[error("malformed response for {context}: {reason}")]
    Malformed { context: String, reason: String },

    /// Rejected locally before any request was sent.
    #[error("invalid input: {0}")]
    InvalidInput(String),
}

/// Errors returned by [`crate::LocationPicker`] operations.
#[derive(Debug, Error)]
pub enum PickerError {
    /// The session already reached `Committed` or `Cancelled`.
    #[error("location picker is closed")]
    Closed,

    /// Confirm was requested before any coordinates were selected.
    #[error("no location selected")]
    NoSelection,

    #[error(transparent)]
    InvalidInput(#[from] GeocodeError),
}

impl GeocodeError {
    /// Returns `true` for environmental failures (network, status codes) as
    /// opposed to bad payloads or bad input.
    #[must_use]
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            GeocodeError::Http(_)
                | GeocodeError::RateLimited { .. }
                | GeocodeError::UnexpectedStatus { .. }
        )
    }
}

//! Domain values for lookups plus the provider's JSON shapes.
//!
//! Wire types are kept `pub(crate)` so nothing outside the client depends on
//! the provider's field names.

use campusnest_core::Coordinates;
use serde::{Deserialize, Serialize};

use crate::error::GeocodeError;

/// Input to a forward lookup: a non-blank free-text address.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeocodeQuery {
    text: String,
}

impl GeocodeQuery {
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidInput`] if `address` is empty or only
    /// whitespace.
    pub fn new(address: &str) -> Result<Self, GeocodeError> {
        let trimmed = address.trim();
        if trimmed.is_empty() {
            return Err(GeocodeError::InvalidInput(
                "address must not be empty".to_owned(),
            ));
        }
        Ok(Self {
            text: trimmed.to_owned(),
        })
    }

    /// The trimmed text sent to the provider.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Input to a reverse lookup.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReverseQuery {
    coordinates: Coordinates,
}

impl ReverseQuery {
    /// # Errors
    ///
    /// Returns [`GeocodeError::InvalidInput`] if the pair is out of range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeocodeError> {
        let coordinates = Coordinates::new(latitude, longitude)
            .map_err(|e| GeocodeError::InvalidInput(e.to_string()))?;
        Ok(Self { coordinates })
    }

    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        self.coordinates
    }
}

impl From<Coordinates> for ReverseQuery {
    fn from(coordinates: Coordinates) -> Self {
        Self { coordinates }
    }
}

/// A resolved location. Only ever built from a provider candidate whose
/// coordinates parsed to finite, in-range values.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeocodeResult {
    pub latitude: f64,
    pub longitude: f64,
    pub display_name: String,
}

impl GeocodeResult {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }

    /// Converts the provider's string-typed candidate into a result.
    pub(crate) fn from_candidate(
        candidate: SearchCandidate,
        context: &str,
    ) -> Result<Self, GeocodeError> {
        let latitude = parse_degrees(&candidate.lat, "lat", context)?;
        let longitude = parse_degrees(&candidate.lon, "lon", context)?;
        let coordinates =
            Coordinates::new(latitude, longitude).map_err(|e| GeocodeError::Malformed {
                context: context.to_owned(),
                reason: e.to_string(),
            })?;
        Ok(Self {
            latitude: coordinates.latitude,
            longitude: coordinates.longitude,
            display_name: candidate.display_name,
        })
    }
}

fn parse_degrees(raw: &str, field: &str, context: &str) -> Result<f64, GeocodeError> {
    let value = raw
        .trim()
        .parse::<f64>()
        .map_err(|e| GeocodeError::Malformed {
            context: context.to_owned(),
            reason: format!("{field} \"{raw}\" is not a number: {e}"),
        })?;
    if value.is_nan() {
        return Err(GeocodeError::Malformed {
            context: context.to_owned(),
            reason: format!("{field} is NaN"),
        });
    }
    Ok(value)
}

/// One element of the forward-lookup response array. Only the fields this
/// crate reads are declared; the rest are ignored.
#[derive(Debug, Deserialize)]
pub(crate) struct SearchCandidate {
    pub lat: String,
    pub lon: String,
    pub display_name: String,
}

/// Reverse-lookup response. The provider answers "no address here" with
/// HTTP 200 and an `error` field instead of `display_name`.
#[derive(Debug, Deserialize)]
pub(crate) struct ReversePayload {
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub error: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn candidate(lat: &str, lon: &str) -> SearchCandidate {
        SearchCandidate {
            lat: lat.to_owned(),
            lon: lon.to_owned(),
            display_name: "123 Main St, Edmonton, AB".to_owned(),
        }
    }

    #[test]
    fn query_trims_surrounding_whitespace() {
        let q = GeocodeQuery::new("  123 Main St, Edmonton \n").unwrap();
        assert_eq!(q.text(), "123 Main St, Edmonton");
    }

    #[test]
    fn query_rejects_blank_address() {
        assert!(matches!(
            GeocodeQuery::new("   "),
            Err(GeocodeError::InvalidInput(_))
        ));
        assert!(GeocodeQuery::new("").is_err());
    }

    #[test]
    fn reverse_query_rejects_out_of_range() {
        assert!(matches!(
            ReverseQuery::new(91.0, 0.0),
            Err(GeocodeError::InvalidInput(_))
        ));
        assert!(ReverseQuery::new(53.5, -113.5).is_ok());
    }

    #[test]
    fn candidate_with_numeric_strings_converts() {
        let result = GeocodeResult::from_candidate(candidate("53.5461", "-113.4938"), "t").unwrap();
        assert!((result.latitude - 53.5461).abs() < 1e-9);
        assert!((result.longitude + 113.4938).abs() < 1e-9);
        assert_eq!(result.display_name, "123 Main St, Edmonton, AB");
    }

    #[test]
    fn candidate_with_non_numeric_latitude_is_malformed() {
        let err = GeocodeResult::from_candidate(candidate("north", "-113.4938"), "t").unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[test]
    fn candidate_with_nan_is_malformed() {
        let err = GeocodeResult::from_candidate(candidate("NaN", "-113.4938"), "t").unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[test]
    fn candidate_out_of_range_is_malformed() {
        let err = GeocodeResult::from_candidate(candidate("153.0", "-113.4938"), "t").unwrap_err();
        assert!(matches!(err, GeocodeError::Malformed { .. }));
    }

    #[test]
    fn reverse_payload_accepts_error_shape() {
        let payload: ReversePayload =
            serde_json::from_str(r#"{"error":"Unable to geocode"}"#).unwrap();
        assert!(payload.display_name.is_none());
        assert_eq!(payload.error.as_deref(), Some("Unable to geocode"));
    }
}

//! WGS-84 coordinate pair shared by every location-handling crate.

use serde::{Deserialize, Serialize};

use crate::CoreError;

/// A validated latitude/longitude pair in decimal degrees.
///
/// [`Coordinates::new`], [`FromStr`](std::str::FromStr) and deserialization
/// all reject values that are not finite or fall outside `[-90, 90]` for
/// latitude and `[-180, 180]` for longitude. The fields stay public for
/// reading; code that builds the struct literally owns the range check.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "RawCoordinates")]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Deserialize)]
struct RawCoordinates {
    latitude: f64,
    longitude: f64,
}

impl TryFrom<RawCoordinates> for Coordinates {
    type Error = CoreError;

    fn try_from(raw: RawCoordinates) -> Result<Self, Self::Error> {
        Self::new(raw.latitude, raw.longitude)
    }
}

impl Coordinates {
    /// # Errors
    ///
    /// Returns [`CoreError::InvalidCoordinates`] if either value is NaN,
    /// infinite, or outside its valid range.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoreError> {
        if is_valid_latitude(latitude) && is_valid_longitude(longitude) {
            Ok(Self {
                latitude,
                longitude,
            })
        } else {
            Err(CoreError::InvalidCoordinates {
                latitude,
                longitude,
            })
        }
    }
}

impl std::fmt::Display for Coordinates {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl std::str::FromStr for Coordinates {
    type Err = String;

    /// Parses `"lat,lon"` (whitespace around either value is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| format!("expected \"lat,lon\", got \"{s}\""))?;
        let latitude = lat
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid latitude \"{}\": {e}", lat.trim()))?;
        let longitude = lon
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid longitude \"{}\": {e}", lon.trim()))?;
        Self::new(latitude, longitude).map_err(|e| e.to_string())
    }
}

#[must_use]
pub fn is_valid_latitude(value: f64) -> bool {
    value.is_finite() && (-90.0..=90.0).contains(&value)
}

#[must_use]
pub fn is_valid_longitude(value: f64) -> bool {
    value.is_finite() && (-180.0..=180.0).contains(&value)
}

use std::time::Duration;

use crate::Coordinates;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Environment {
    Development,
    Test,
    Production,
}

impl std::fmt::Display for Environment {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Environment::Development => write!(f, "development"),
            Environment::Test => write!(f, "test"),
            Environment::Production => write!(f, "production"),
        }
    }
}

/// Everything needed to construct a geocoding client and its request pacer.
#[derive(Clone)]
pub struct GeocoderSettings {
    pub base_url: String,
    pub user_agent: String,
    /// Contact address forwarded to the provider; optional under its usage policy.
    pub email: Option<String>,
    pub request_timeout_secs: u64,
    pub min_interval_ms: u64,
}

impl GeocoderSettings {
    #[must_use]
    pub fn min_interval(&self) -> Duration {
        Duration::from_millis(self.min_interval_ms)
    }
}

impl std::fmt::Debug for GeocoderSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GeocoderSettings")
            .field("base_url", &self.base_url)
            .field("user_agent", &self.user_agent)
            .field("email", &self.email.as_ref().map(|_| "[redacted]"))
            .field("request_timeout_secs", &self.request_timeout_secs)
            .field("min_interval_ms", &self.min_interval_ms)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct AppConfig {
    pub env: Environment,
    pub log_level: String,
    pub geocoder: GeocoderSettings,
    /// Fixed position reported by the CLI's device-location stand-in.
    pub device_location: Option<Coordinates>,
}

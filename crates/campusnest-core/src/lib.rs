pub mod app_config;
pub mod config;
pub mod geo;

pub use app_config::{AppConfig, Environment, GeocoderSettings};
pub use config::{check_min_interval, load_app_config, load_app_config_from_env};
pub use geo::Coordinates;

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for {var}: {reason}")]
    InvalidEnvVar { var: String, reason: String },
}

#[derive(Debug, Error, PartialEq)]
pub enum CoreError {
    #[error("coordinates out of range: ({latitude}, {longitude})")]
    InvalidCoordinates { latitude: f64, longitude: f64 },
}

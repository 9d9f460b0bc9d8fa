use crate::app_config::{AppConfig, Environment, GeocoderSettings};
use crate::{ConfigError, Coordinates};

pub const DEFAULT_GEOCODER_BASE_URL: &str = "https://nominatim.openstreetmap.org";
pub const DEFAULT_GEOCODER_USER_AGENT: &str = "campusnest/0.1 (student-housing)";

/// The provider enforces one request per second; anything tighter is only
/// allowed when talking to a mock server.
const PROVIDER_MIN_INTERVAL_FLOOR_MS: u64 = 1000;

/// Rejects request spacing below the provider's floor unless `env` is
/// [`Environment::Test`]. `source` names the setting in the error.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` naming `source` when the interval is
/// too tight.
pub fn check_min_interval(
    env: Environment,
    source: &str,
    min_interval_ms: u64,
) -> Result<(), ConfigError> {
    if min_interval_ms < PROVIDER_MIN_INTERVAL_FLOOR_MS && env != Environment::Test {
        return Err(ConfigError::InvalidEnvVar {
            var: source.to_string(),
            reason: format!(
                "{min_interval_ms} ms is below the provider's {PROVIDER_MIN_INTERVAL_FLOOR_MS} ms floor"
            ),
        });
    }
    Ok(())
}

/// Load application configuration from environment variables.
///
/// Calls `dotenvy::dotenv().ok()` to load `.env` files before reading env vars.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config() -> Result<AppConfig, ConfigError> {
    dotenvy::dotenv().ok();
    load_app_config_from_env()
}

/// Load application configuration from environment variables already in the process.
///
/// Unlike [`load_app_config`], this does NOT load `.env` files.
///
/// # Errors
///
/// Returns `ConfigError` if a value is present but invalid.
pub fn load_app_config_from_env() -> Result<AppConfig, ConfigError> {
    build_app_config(|key| std::env::var(key))
}

/// Build application configuration using the provided env-var lookup function.
///
/// Decoupled from the process environment so tests can drive it with a
/// plain `HashMap`.
fn build_app_config<F>(lookup: F) -> Result<AppConfig, ConfigError>
where
    F: Fn(&str) -> Result<String, std::env::VarError>,
{
    let or_default = |var: &str, default: &str| -> String {
        lookup(var).unwrap_or_else(|_| default.to_string())
    };

    let parse_u64 = |var: &str, default: &str| -> Result<u64, ConfigError> {
        let raw = or_default(var, default);
        raw.parse::<u64>().map_err(|e| ConfigError::InvalidEnvVar {
            var: var.to_string(),
            reason: e.to_string(),
        })
    };

    let env = parse_environment(&or_default("CAMPUSNEST_ENV", "development"))?;
    let log_level = or_default("CAMPUSNEST_LOG_LEVEL", "info");

    let base_url = or_default("CAMPUSNEST_GEOCODER_BASE_URL", DEFAULT_GEOCODER_BASE_URL);
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAMPUSNEST_GEOCODER_BASE_URL".to_string(),
            reason: format!("\"{base_url}\" is not an http(s) URL"),
        });
    }

    let user_agent = or_default("CAMPUSNEST_GEOCODER_USER_AGENT", DEFAULT_GEOCODER_USER_AGENT);
    if user_agent.trim().is_empty() {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAMPUSNEST_GEOCODER_USER_AGENT".to_string(),
            reason: "the provider rejects requests without a client identifier".to_string(),
        });
    }

    let email = lookup("CAMPUSNEST_GEOCODER_EMAIL")
        .ok()
        .filter(|v| !v.trim().is_empty());

    let request_timeout_secs = parse_u64("CAMPUSNEST_GEOCODER_TIMEOUT_SECS", "10")?;
    if request_timeout_secs == 0 {
        return Err(ConfigError::InvalidEnvVar {
            var: "CAMPUSNEST_GEOCODER_TIMEOUT_SECS".to_string(),
            reason: "timeout must be at least 1 second".to_string(),
        });
    }

    let min_interval_ms = parse_u64("CAMPUSNEST_GEOCODER_MIN_INTERVAL_MS", "1100")?;
    check_min_interval(env, "CAMPUSNEST_GEOCODER_MIN_INTERVAL_MS", min_interval_ms)?;

    let device_location = match lookup("CAMPUSNEST_DEVICE_LOCATION") {
        Ok(raw) => Some(raw.parse::<Coordinates>().map_err(|reason| {
            ConfigError::InvalidEnvVar {
                var: "CAMPUSNEST_DEVICE_LOCATION".to_string(),
                reason,
            }
        })?),
        Err(_) => None,
    };

    Ok(AppConfig {
        env,
        log_level,
        geocoder: GeocoderSettings {
            base_url,
            user_agent,
            email,
            request_timeout_secs,
            min_interval_ms,
        },
        device_location,
    })
}

/// Parse a string into an `Environment` variant.
///
/// # Errors
///
/// Returns `ConfigError::InvalidEnvVar` for anything other than
/// `development`, `test`, or `production`.
fn parse_environment(s: &str) -> Result<Environment, ConfigError> {
    match s {
        "development" => Ok(Environment::Development),
        "test" => Ok(Environment::Test),
        "production" => Ok(Environment::Production),
        other => Err(ConfigError::InvalidEnvVar {
            var: "CAMPUSNEST_ENV".to_string(),
            reason: format!("unknown environment \"{other}\""),
        }),
    }
}

#[cfg(test)]
#[path = "config_test.rs"]
mod tests;

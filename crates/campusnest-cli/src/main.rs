mod lookup;
mod pick;

use std::path::PathBuf;
use std::sync::Arc;

use campusnest_geocode::{NominatimClient, RateLimiter};
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

#[derive(Debug, Parser)]
#[command(name = "campusnest")]
#[command(about = "CampusNest location resolution tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Resolve one address to coordinates
    Geocode { address: String },
    /// Resolve coordinates to a display name
    Reverse {
        #[arg(long, allow_negative_numbers = true)]
        lat: f64,
        #[arg(long, allow_negative_numbers = true)]
        lon: f64,
    },
    /// Resolve many addresses, paced by the provider's rate limit
    Batch {
        /// File with one address per line (blank lines and `#` comments skipped)
        #[arg(long)]
        file: Option<PathBuf>,
        /// Override the gap between requests
        #[arg(long)]
        interval_ms: Option<u64>,
        addresses: Vec<String>,
    },
    /// Interactive location picker driven by stdin commands
    Pick {
        #[arg(long, allow_negative_numbers = true, requires = "lon")]
        lat: Option<f64>,
        #[arg(long, allow_negative_numbers = true, requires = "lat")]
        lon: Option<f64>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = campusnest_core::load_app_config()?;

    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(config.log_level.clone()))?;
    tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .init();

    tracing::debug!(?config, "configuration loaded");

    let client = Arc::new(NominatimClient::from_settings(&config.geocoder)?);
    let limiter = Arc::new(RateLimiter::new(config.geocoder.min_interval()));

    match cli.command {
        Commands::Geocode { address } => lookup::run_geocode(&*client, &address).await,
        Commands::Reverse { lat, lon } => lookup::run_reverse(&*client, lat, lon).await,
        Commands::Batch {
            file,
            interval_ms,
            addresses,
        } => {
            lookup::run_batch(
                client,
                limiter,
                config.env,
                file.as_deref(),
                interval_ms,
                addresses,
            )
            .await
        }
        Commands::Pick { lat, lon } => {
            let initial = match (lat, lon) {
                (Some(lat), Some(lon)) => Some(campusnest_core::Coordinates::new(lat, lon)?),
                _ => None,
            };
            pick::run_pick(client, limiter, config.device_location, initial).await
        }
    }
}

//! One-shot `geocode`, `reverse`, and `batch` subcommands.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Context;
use campusnest_core::Environment;
use campusnest_geocode::{BatchResolver, GeocodeQuery, Geocoder, RateLimiter, ReverseQuery};

pub(crate) async fn run_geocode(geocoder: &dyn Geocoder, address: &str) -> anyhow::Result<()> {
    let query = GeocodeQuery::new(address)?;
    match geocoder.search(&query).await? {
        Some(result) => {
            println!("{}", serde_json::to_string_pretty(&result)?);
            Ok(())
        }
        None => anyhow::bail!("no match for \"{address}\""),
    }
}

pub(crate) async fn run_reverse(
    geocoder: &dyn Geocoder,
    latitude: f64,
    longitude: f64,
) -> anyhow::Result<()> {
    let query = ReverseQuery::new(latitude, longitude)?;
    match geocoder.reverse(&query).await? {
        Some(name) => {
            println!("{name}");
            Ok(())
        }
        None => anyhow::bail!("no address known at ({latitude}, {longitude})"),
    }
}

pub(crate) async fn run_batch(
    geocoder: Arc<dyn Geocoder>,
    limiter: Arc<RateLimiter>,
    env: Environment,
    file: Option<&Path>,
    interval_ms: Option<u64>,
    mut addresses: Vec<String>,
) -> anyhow::Result<()> {
    let interval = batch_interval(env, interval_ms, &limiter)?;
    if let Some(path) = file {
        let content = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("failed to read address file {}", path.display()))?;
        addresses.extend(parse_address_lines(&content));
    }
    if addresses.is_empty() {
        anyhow::bail!("no addresses given; pass them as arguments or with --file");
    }

    tracing::info!(
        count = addresses.len(),
        interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX),
        "starting batch geocode"
    );

    let report = BatchResolver::new(geocoder, limiter)
        .resolve_all_detailed(addresses.as_slice(), interval)
        .await;
    println!("{}", serde_json::to_string_pretty(&report)?);
    Ok(())
}

/// `--interval-ms` is held to the same provider floor as the configured
/// interval; without it the limiter's own interval applies.
fn batch_interval(
    env: Environment,
    interval_ms: Option<u64>,
    limiter: &RateLimiter,
) -> anyhow::Result<Duration> {
    match interval_ms {
        Some(ms) => {
            campusnest_core::check_min_interval(env, "--interval-ms", ms)?;
            Ok(Duration::from_millis(ms))
        }
        None => Ok(limiter.min_interval()),
    }
}

/// One address per line; blank lines and `#` comments are skipped. Lines are
/// kept verbatim so batch keys match the file exactly.
fn parse_address_lines(content: &str) -> Vec<String> {
    content
        .lines()
        .filter(|line| {
            let trimmed = line.trim();
            !trimmed.is_empty() && !trimmed.starts_with('#')
        })
        .map(str::to_owned)
        .collect()
}

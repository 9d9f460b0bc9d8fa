//! Terminal front end for the location picker.
//!
//! Reads one command per line from stdin and prints the picker state as JSON
//! after each step. The session ends on `confirm`, `cancel`, or end of input.

use std::sync::Arc;

use campusnest_core::Coordinates;
use campusnest_geocode::{
    DeviceLocation, FixedDeviceLocation, Geocoder, LocationPicker, NoDeviceLocation, PickerError,
    RateLimiter,
};
use tokio::io::{AsyncBufReadExt, BufReader};

const HELP: &str = "commands: tap LAT LON | search TEXT | here | show | confirm | cancel | help";

#[derive(Debug, PartialEq)]
enum PickCommand {
    Tap { latitude: f64, longitude: f64 },
    Search(String),
    Here,
    Show,
    Confirm,
    Cancel,
    Help,
}

fn parse_command(line: &str) -> Result<PickCommand, String> {
    let line = line.trim();
    let (verb, rest) = line.split_once(char::is_whitespace).unwrap_or((line, ""));
    let rest = rest.trim();
    match verb {
        "tap" => {
            let mut parts = rest.split_whitespace();
            let (Some(lat), Some(lon), None) = (parts.next(), parts.next(), parts.next()) else {
                return Err("usage: tap LAT LON".to_owned());
            };
            let latitude = lat
                .parse::<f64>()
                .map_err(|e| format!("invalid latitude \"{lat}\": {e}"))?;
            let longitude = lon
                .parse::<f64>()
                .map_err(|e| format!("invalid longitude \"{lon}\": {e}"))?;
            Ok(PickCommand::Tap {
                latitude,
                longitude,
            })
        }
        "search" if !rest.is_empty() => Ok(PickCommand::Search(rest.to_owned())),
        "search" => Err("usage: search TEXT".to_owned()),
        "here" => Ok(PickCommand::Here),
        "show" => Ok(PickCommand::Show),
        "confirm" => Ok(PickCommand::Confirm),
        "cancel" => Ok(PickCommand::Cancel),
        "help" | "?" => Ok(PickCommand::Help),
        other => Err(format!("unknown command \"{other}\"; {HELP}")),
    }
}

pub(crate) async fn run_pick(
    geocoder: Arc<dyn Geocoder>,
    limiter: Arc<RateLimiter>,
    device_location: Option<Coordinates>,
    initial: Option<Coordinates>,
) -> anyhow::Result<()> {
    let device: Arc<dyn DeviceLocation> = match device_location {
        Some(position) => Arc::new(FixedDeviceLocation(position)),
        None => Arc::new(NoDeviceLocation),
    };
    let (picker, handle) = LocationPicker::open(geocoder, limiter, device, initial);
    eprintln!("{HELP}");

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }
        let command = match parse_command(&line) {
            Ok(command) => command,
            Err(message) => {
                eprintln!("{message}");
                continue;
            }
        };

        let finished = match step(&picker, command).await {
            Ok(finished) => finished,
            Err(PickerError::Closed) => true,
            Err(e) => {
                eprintln!("{e}");
                false
            }
        };
        if let Some(notice) = picker.take_notice() {
            eprintln!("notice: {notice:?}");
        }
        if finished {
            break;
        }
        println!("{}", serde_json::to_string(&picker.snapshot())?);
    }

    drop(picker);
    let outcome = handle.outcome().await;
    println!("{}", serde_json::to_string_pretty(&outcome)?);
    Ok(())
}

/// Applies one command; returns `true` once the session has ended.
async fn step(picker: &LocationPicker, command: PickCommand) -> Result<bool, PickerError> {
    match command {
        PickCommand::Tap {
            latitude,
            longitude,
        } => {
            picker.tap(latitude, longitude).await?;
        }
        PickCommand::Search(text) => {
            picker.search(&text).await?;
        }
        PickCommand::Here => {
            if let Some(position) = picker.go_to_current_location().await? {
                eprintln!("view centred on {position}");
            }
        }
        PickCommand::Show => {}
        PickCommand::Confirm => {
            picker.confirm()?;
            return Ok(true);
        }
        PickCommand::Cancel => {
            picker.cancel()?;
            return Ok(true);
        }
        PickCommand::Help => eprintln!("{HELP}"),
    }
    Ok(false)
}

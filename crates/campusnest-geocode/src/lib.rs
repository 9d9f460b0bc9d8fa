//! Location resolution for CampusNest listings.
//!
//! - [`NominatimClient`]: one provider round trip per call behind the
//!   [`Geocoder`] trait.
//! - [`RateLimiter`]: the shared pacing gate every request passes through.
//! - [`BatchResolver`]: ordered, paced resolution of many addresses.
//! - [`LocationPicker`]: the tap / search / confirm selection flow.

pub mod batch;
pub mod client;
pub mod error;
pub mod geocoder;
pub mod picker;
pub mod rate_limit;
pub mod types;

#[cfg(test)]
mod testing;

pub use batch::{BatchFailure, BatchReport, BatchResolver, BatchResult, FailureReason};
pub use client::NominatimClient;
pub use error::{GeocodeError, PickerError};
pub use geocoder::Geocoder;
pub use picker::{
    DeviceLocation, DeviceLocationError, FixedDeviceLocation, LocationPicker, NoDeviceLocation,
    PermissionStatus, PickerHandle, PickerNotice, PickerOutcome, PickerPhase, PickerSnapshot,
    Resolution, SearchOutcome, SelectedLocation,
};
pub use rate_limit::{RateLimiter, DEFAULT_MIN_INTERVAL};
pub use types::{GeocodeQuery, GeocodeResult, ReverseQuery};

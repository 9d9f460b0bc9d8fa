//! Seam for the device's location service.

use async_trait::async_trait;
use campusnest_core::Coordinates;
use thiserror::Error;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    Granted,
    Denied,
    Undetermined,
}

#[derive(Debug, Error)]
pub enum DeviceLocationError {
    #[error("location permission denied")]
    PermissionDenied,

    #[error("location unavailable: {0}")]
    Unavailable(String),
}

/// Foreground permission prompt plus a single position fix.
#[async_trait]
pub trait DeviceLocation: Send + Sync {
    async fn request_foreground_permission(&self) -> PermissionStatus;

    /// # Errors
    ///
    /// [`DeviceLocationError`] when no fix can be obtained.
    async fn current_position(&self) -> Result<Coordinates, DeviceLocationError>;
}

/// Always grants permission and reports the same position.
#[derive(Debug, Clone, Copy)]
pub struct FixedDeviceLocation(pub Coordinates);

#[async_trait]
impl DeviceLocation for FixedDeviceLocation {
    async fn request_foreground_permission(&self) -> PermissionStatus {
        PermissionStatus::Granted
    }

    async fn current_position(&self) -> Result<Coordinates, DeviceLocationError> {
        Ok(self.0)
    }
}

/// A device with no location service; permission is always denied.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoDeviceLocation;

#[async_trait]
impl DeviceLocation for NoDeviceLocation {
    async fn request_foreground_permission(&self) -> PermissionStatus {
        PermissionStatus::Denied
    }

    async fn current_position(&self) -> Result<Coordinates, DeviceLocationError> {
        Err(DeviceLocationError::PermissionDenied)
    }
}

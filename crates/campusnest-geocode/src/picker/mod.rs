//! Interactive map-based location selection.
//!
//! A [`LocationPicker`] drives one session: map taps trigger reverse lookups,
//! text searches trigger forward lookups, and confirming hands the selection
//! back through the [`PickerHandle`] returned by [`LocationPicker::open`].
//!
//! Every state-establishing action takes a ticket from a monotonically
//! increasing counter. A lookup result is applied only if no newer action has
//! established state since it was issued, so a slow response can never
//! overwrite a newer selection.

mod device;

use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use campusnest_core::Coordinates;
use serde::Serialize;
use tokio::sync::oneshot;

use crate::error::PickerError;
use crate::geocoder::Geocoder;
use crate::rate_limit::RateLimiter;
use crate::types::{GeocodeQuery, GeocodeResult, ReverseQuery};

pub use device::{
    DeviceLocation, DeviceLocationError, FixedDeviceLocation, NoDeviceLocation, PermissionStatus,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerPhase {
    Idle,
    /// Coordinates set, address lookup in flight.
    Selecting,
    Resolved,
    Committed,
    Cancelled,
}

impl PickerPhase {
    #[must_use]
    pub fn is_terminal(self) -> bool {
        matches!(self, PickerPhase::Committed | PickerPhase::Cancelled)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SelectedLocation {
    pub latitude: f64,
    pub longitude: f64,
    pub address: Option<String>,
}

impl SelectedLocation {
    #[must_use]
    pub fn coordinates(&self) -> Coordinates {
        Coordinates {
            latitude: self.latitude,
            longitude: self.longitude,
        }
    }
}

/// Transient messages for the UI layer. None of them alter the selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PickerNotice {
    NotFound,
    TryAgain,
    PermissionDenied,
    LocationUnavailable,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PickerSnapshot {
    pub phase: PickerPhase,
    pub selection: Option<SelectedLocation>,
    pub view_center: Option<Coordinates>,
    pub address_loading: bool,
    pub notice: Option<PickerNotice>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "location", rename_all = "snake_case")]
pub enum PickerOutcome {
    Confirmed(SelectedLocation),
    Cancelled,
}

/// Whether a tap's reverse lookup was applied or discarded as stale.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolution {
    Applied,
    Superseded,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SearchOutcome {
    Found(GeocodeResult),
    NotFound,
    Failed,
    /// Resolved, but a newer tap or search had already replaced the selection.
    Superseded,
}

/// Receives the outcome of exactly one picker session.
#[derive(Debug)]
pub struct PickerHandle {
    rx: oneshot::Receiver<PickerOutcome>,
}

impl PickerHandle {
    /// Waits for the session to end. A picker dropped without confirming
    /// counts as cancelled.
    pub async fn outcome(self) -> PickerOutcome {
        self.rx.await.unwrap_or(PickerOutcome::Cancelled)
    }
}

struct Session {
    phase: PickerPhase,
    selection: Option<SelectedLocation>,
    view_center: Option<Coordinates>,
    address_loading: bool,
    notice: Option<PickerNotice>,
    last_ticket: u64,
    /// Ticket of the action that established the current selection.
    selection_ticket: u64,
    outcome_tx: Option<oneshot::Sender<PickerOutcome>>,
}

impl Session {
    fn ensure_open(&self) -> Result<(), PickerError> {
        if self.phase.is_terminal() {
            Err(PickerError::Closed)
        } else {
            Ok(())
        }
    }

    fn next_ticket(&mut self) -> u64 {
        self.last_ticket += 1;
        self.last_ticket
    }

    fn finish(&mut self, phase: PickerPhase, outcome: PickerOutcome) {
        self.phase = phase;
        self.address_loading = false;
        if let Some(tx) = self.outcome_tx.take() {
            // The caller may have stopped listening; nothing else to do.
            let _ = tx.send(outcome);
        }
    }
}

pub struct LocationPicker {
    geocoder: Arc<dyn Geocoder>,
    limiter: Arc<RateLimiter>,
    device: Arc<dyn DeviceLocation>,
    session: Mutex<Session>,
}

impl LocationPicker {
    /// Starts a session, optionally seeded with caller-supplied coordinates.
    ///
    /// A seeded session starts `Resolved` (no address) with the view centred
    /// on the seed.
    #[must_use]
    pub fn open(
        geocoder: Arc<dyn Geocoder>,
        limiter: Arc<RateLimiter>,
        device: Arc<dyn DeviceLocation>,
        initial: Option<Coordinates>,
    ) -> (Self, PickerHandle) {
        let (tx, rx) = oneshot::channel();
        let selection = initial.map(|c| SelectedLocation {
            latitude: c.latitude,
            longitude: c.longitude,
            address: None,
        });
        let phase = if selection.is_some() {
            PickerPhase::Resolved
        } else {
            PickerPhase::Idle
        };
        let picker = Self {
            geocoder,
            limiter,
            device,
            session: Mutex::new(Session {
                phase,
                selection,
                view_center: initial,
                address_loading: false,
                notice: None,
                last_ticket: 0,
                selection_ticket: 0,
                outcome_tx: Some(tx),
            }),
        };
        (picker, PickerHandle { rx })
    }

    fn session(&self) -> MutexGuard<'_, Session> {
        self.session.lock().unwrap_or_else(PoisonError::into_inner)
    }

    #[must_use]
    pub fn snapshot(&self) -> PickerSnapshot {
        let s = self.session();
        PickerSnapshot {
            phase: s.phase,
            selection: s.selection.clone(),
            view_center: s.view_center,
            address_loading: s.address_loading,
            notice: s.notice,
        }
    }

    /// Returns and clears the pending notice.
    pub fn take_notice(&self) -> Option<PickerNotice> {
        self.session().notice.take()
    }

    /// Places the pin at the tapped point and back-fills its address.
    ///
    /// The coordinates are set immediately; the address is filled in when the
    /// reverse lookup completes, unless a newer action superseded this tap.
    ///
    /// # Errors
    ///
    /// [`PickerError::InvalidInput`] for out-of-range coordinates and
    /// [`PickerError::Closed`] once the session has ended.
    pub async fn tap(&self, latitude: f64, longitude: f64) -> Result<Resolution, PickerError> {
        let (ticket, query) = {
            let mut s = self.session();
            s.ensure_open()?;
            let query = ReverseQuery::new(latitude, longitude)?;
            let ticket = s.next_ticket();
            s.selection_ticket = ticket;
            s.selection = Some(SelectedLocation {
                latitude,
                longitude,
                address: None,
            });
            s.phase = PickerPhase::Selecting;
            s.address_loading = true;
            (ticket, query)
        };

        self.limiter.await_slot().await;
        {
            let s = self.session();
            s.ensure_open()?;
            if s.selection_ticket != ticket {
                tracing::debug!(ticket, current = s.selection_ticket, "skipping reverse geocode for replaced tap");
                return Ok(Resolution::Superseded);
            }
        }
        let looked_up = self.geocoder.reverse(&query).await;

        let mut s = self.session();
        s.ensure_open()?;
        if s.selection_ticket != ticket {
            tracing::debug!(ticket, current = s.selection_ticket, "discarding stale reverse geocode");
            return Ok(Resolution::Superseded);
        }

        let address = match looked_up {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!(latitude, longitude, error = %e, "reverse geocode for map tap failed");
                s.notice = Some(PickerNotice::TryAgain);
                None
            }
        };
        if let Some(selection) = s.selection.as_mut() {
            selection.address = address;
        }
        s.address_loading = false;
        s.phase = PickerPhase::Resolved;
        Ok(Resolution::Applied)
    }

    /// Looks up `text` and, on success, replaces the selection and recentres
    /// the view. A miss or failure leaves the current selection untouched and
    /// only raises a notice when no newer action was issued in the meantime.
    ///
    /// # Errors
    ///
    /// [`PickerError::InvalidInput`] for blank text and
    /// [`PickerError::Closed`] once the session has ended.
    pub async fn search(&self, text: &str) -> Result<SearchOutcome, PickerError> {
        let (ticket, query) = {
            let mut s = self.session();
            s.ensure_open()?;
            let query = GeocodeQuery::new(text)?;
            (s.next_ticket(), query)
        };

        self.limiter.await_slot().await;
        {
            let s = self.session();
            s.ensure_open()?;
            if ticket < s.selection_ticket {
                tracing::debug!(ticket, current = s.selection_ticket, "skipping search overtaken by a newer selection");
                return Ok(SearchOutcome::Superseded);
            }
        }
        let looked_up = self.geocoder.search(&query).await;

        let mut s = self.session();
        s.ensure_open()?;
        match looked_up {
            Ok(Some(result)) => {
                if ticket < s.selection_ticket {
                    tracing::debug!(ticket, current = s.selection_ticket, "discarding stale search result");
                    return Ok(SearchOutcome::Superseded);
                }
                s.selection_ticket = ticket;
                s.selection = Some(SelectedLocation {
                    latitude: result.latitude,
                    longitude: result.longitude,
                    address: Some(result.display_name.clone()),
                });
                s.view_center = Some(result.coordinates());
                s.address_loading = false;
                s.phase = PickerPhase::Resolved;
                Ok(SearchOutcome::Found(result))
            }
            Ok(None) => {
                tracing::debug!(query = query.text(), "location search: not found");
                if s.last_ticket == ticket {
                    s.notice = Some(PickerNotice::NotFound);
                }
                Ok(SearchOutcome::NotFound)
            }
            Err(e) => {
                tracing::warn!(query = query.text(), error = %e, "location search failed");
                if s.last_ticket == ticket {
                    s.notice = Some(PickerNotice::TryAgain);
                }
                Ok(SearchOutcome::Failed)
            }
        }
    }

    /// Recentres the view on the device's current position without touching
    /// the selection; the user still has to tap or confirm.
    ///
    /// # Errors
    ///
    /// [`PickerError::Closed`] once the session has ended.
    pub async fn go_to_current_location(&self) -> Result<Option<Coordinates>, PickerError> {
        self.session().ensure_open()?;

        let permission = self.device.request_foreground_permission().await;
        if permission != PermissionStatus::Granted {
            tracing::info!(?permission, "device location permission not granted");
            let mut s = self.session();
            s.ensure_open()?;
            s.notice = Some(PickerNotice::PermissionDenied);
            return Ok(None);
        }

        let position = self.device.current_position().await;
        let mut s = self.session();
        s.ensure_open()?;
        match position {
            Ok(coordinates) => {
                s.view_center = Some(coordinates);
                Ok(Some(coordinates))
            }
            Err(e) => {
                tracing::warn!(error = %e, "could not read device location");
                s.notice = Some(PickerNotice::LocationUnavailable);
                Ok(None)
            }
        }
    }

    /// Ends the session and hands the selection to the [`PickerHandle`].
    ///
    /// # Errors
    ///
    /// [`PickerError::NoSelection`] if no coordinates are set (the session
    /// stays open) and [`PickerError::Closed`] once the session has ended.
    pub fn confirm(&self) -> Result<(), PickerError> {
        let mut s = self.session();
        s.ensure_open()?;
        let Some(selection) = s.selection.clone() else {
            return Err(PickerError::NoSelection);
        };
        tracing::info!(
            latitude = selection.latitude,
            longitude = selection.longitude,
            has_address = selection.address.is_some(),
            "location confirmed"
        );
        s.finish(PickerPhase::Committed, PickerOutcome::Confirmed(selection));
        Ok(())
    }

    /// Ends the session and discards the selection.
    ///
    /// # Errors
    ///
    /// [`PickerError::Closed`] once the session has ended.
    pub fn cancel(&self) -> Result<(), PickerError> {
        let mut s = self.session();
        s.ensure_open()?;
        s.selection = None;
        s.finish(PickerPhase::Cancelled, PickerOutcome::Cancelled);
        Ok(())
    }
}

#[cfg(test)]
#[path = "../picker_test.rs"]
mod tests;

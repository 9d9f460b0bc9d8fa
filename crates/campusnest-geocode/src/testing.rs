//! Scripted in-memory geocoder for unit tests.

use std::collections::{HashMap, VecDeque};
use std::sync::Mutex;
use std::time::Duration;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::GeocodeError;
use crate::geocoder::Geocoder;
use crate::types::{GeocodeQuery, GeocodeResult, ReverseQuery};

#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Found(GeocodeResult),
    Named(String),
    Empty,
    Fail,
}

#[derive(Debug, Clone)]
struct Scripted {
    delay: Duration,
    reply: Reply,
}

/// Replies are queued per key and consumed in order; an unscripted key
/// answers `Ok(None)` immediately.
#[derive(Default)]
pub(crate) struct ScriptedGeocoder {
    replies: Mutex<HashMap<String, VecDeque<Scripted>>>,
    calls: Mutex<Vec<(String, Instant)>>,
}

pub(crate) fn reverse_key(latitude: f64, longitude: f64) -> String {
    format!("{latitude},{longitude}")
}

pub(crate) fn found(latitude: f64, longitude: f64, name: &str) -> Reply {
    Reply::Found(GeocodeResult {
        latitude,
        longitude,
        display_name: name.to_owned(),
    })
}

impl ScriptedGeocoder {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn on(self, key: &str, reply: Reply) -> Self {
        self.on_after(key, Duration::ZERO, reply)
    }

    pub(crate) fn on_after(self, key: &str, delay: Duration, reply: Reply) -> Self {
        self.replies
            .lock()
            .unwrap()
            .entry(key.to_owned())
            .or_default()
            .push_back(Scripted { delay, reply });
        self
    }

    pub(crate) fn calls(&self) -> Vec<(String, Instant)> {
        self.calls.lock().unwrap().clone()
    }

    async fn answer(&self, key: String) -> Reply {
        self.calls
            .lock()
            .unwrap()
            .push((key.clone(), Instant::now()));
        let scripted = self
            .replies
            .lock()
            .unwrap()
            .get_mut(&key)
            .and_then(VecDeque::pop_front);
        match scripted {
            Some(Scripted { delay, reply }) => {
                tokio::time::sleep(delay).await;
                reply
            }
            None => Reply::Empty,
        }
    }
}

fn failure() -> GeocodeError {
    GeocodeError::UnexpectedStatus {
        status: 503,
        url: "https://nominatim.test/".to_owned(),
    }
}

#[async_trait]
impl Geocoder for ScriptedGeocoder {
    async fn search(&self, query: &GeocodeQuery) -> Result<Option<GeocodeResult>, GeocodeError> {
        match self.answer(query.text().to_owned()).await {
            Reply::Found(result) => Ok(Some(result)),
            Reply::Named(_) | Reply::Empty => Ok(None),
            Reply::Fail => Err(failure()),
        }
    }

    async fn reverse(&self, query: &ReverseQuery) -> Result<Option<String>, GeocodeError> {
        let c = query.coordinates();
        match self.answer(reverse_key(c.latitude, c.longitude)).await {
            Reply::Named(name) => Ok(Some(name)),
            Reply::Found(result) => Ok(Some(result.display_name)),
            Reply::Empty => Ok(None),
            Reply::Fail => Err(failure()),
        }
    }
}

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use serde::Deserialize;

use crate::device::{FixedPosition, LocationProvider, TrackReplay, Unavailable};
use crate::error::{Error, Result};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default = "default_socket_url")]
    pub socket_url: String,

    #[serde(default = "default_maps_api_url")]
    pub maps_api_url: String,

    pub maps_api_key: String,

    #[serde(default = "default_report_interval_secs")]
    pub report_interval_secs: u64,

    // Port of the local control API
    #[serde(default = "default_port")]
    pub port: u16,

    // CSV track replayed as the device position, takes precedence over the fixed position
    pub device_track: Option<PathBuf>,

    pub device_latitude: Option<f64>,
    pub device_longitude: Option<f64>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        envy::from_env::<Config>()?.validated()
    }

    fn validated(self) -> Result<Self> {
        if self.report_interval_secs == 0 {
            return Err(Error::InvalidInterval);
        }
        Ok(self)
    }

    pub fn report_interval(&self) -> Duration {
        Duration::from_secs(self.report_interval_secs)
    }

    pub fn location_provider(&self) -> Result<Arc<dyn LocationProvider>> {
        if let Some(path) = &self.device_track {
            return Ok(Arc::new(TrackReplay::from_path(path)?));
        }

        match (self.device_latitude, self.device_longitude) {
            (Some(latitude), Some(longitude)) => {
                Ok(Arc::new(FixedPosition(Coordinate::new(latitude, longitude))))
            }
            _ => {
                tracing::warn!("No device location configured, sharing will be refused");
                Ok(Arc::new(Unavailable))
            }
        }
    }
}

fn default_socket_url() -> String {
    "https://server-production-3f37.up.railway.app/".to_string()
}

fn default_maps_api_url() -> String {
    crate::maps::DEFAULT_MAPS_API_URL.to_string()
}

fn default_report_interval_secs() -> u64 {
    crate::reporter::DEFAULT_REPORT_INTERVAL.as_secs()
}

fn default_port() -> u16 {
    3030
}

//! Sources of the device's current position.

use std::io::Read;
use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::error::{Error, Result};
use crate::geo::Coordinate;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Permission {
    Granted,
    Denied,
}

#[async_trait]
pub trait LocationProvider: Send + Sync {
    async fn request_permission(&self) -> Permission;

    /// Suspends until a fix is available or acquisition fails.
    async fn current_position(&self) -> Result<Coordinate>;
}

/// A device that never moves.
#[derive(Debug, Clone)]
pub struct FixedPosition(pub Coordinate);

#[async_trait]
impl LocationProvider for FixedPosition {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinate> {
        Ok(self.0)
    }
}

/// Replays a recorded track, one position per fix, starting over at the end.
#[derive(Debug)]
pub struct TrackReplay {
    points: Vec<Coordinate>,
    cursor: AtomicUsize,
}

impl TrackReplay {
    /// Load a CSV file with a `latitude,longitude` header.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_path(path)?;
        Self::from_csv(reader)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .from_reader(reader);
        Self::from_csv(reader)
    }

    fn from_csv<R: Read>(mut reader: csv::Reader<R>) -> Result<Self> {
        let mut points = Vec::new();
        for result in reader.deserialize() {
            let point: Coordinate = result?;
            points.push(point);
        }
        if points.is_empty() {
            return Err(Error::EmptyTrack);
        }
        tracing::info!("Loaded track with {} positions", points.len());

        Ok(Self {
            points,
            cursor: AtomicUsize::new(0),
        })
    }
}

#[async_trait]
impl LocationProvider for TrackReplay {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinate> {
        let index = self.cursor.fetch_add(1, Ordering::Relaxed) % self.points.len();
        Ok(self.points[index])
    }
}

/// No positioning hardware configured. Permission is always refused.
#[derive(Debug, Clone, Copy, Default)]
pub struct Unavailable;

#[async_trait]
impl LocationProvider for Unavailable {
    async fn request_permission(&self) -> Permission {
        Permission::Denied
    }

    async fn current_position(&self) -> Result<Coordinate> {
        Err(Error::LocationUnavailable("no location source configured".into()))
    }
}

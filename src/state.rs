use std::sync::Arc;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::geo::{Coordinate, Route};
use crate::maps::PlaceCandidate;

/// Everything the client knows about the current sharing session.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SharingSession {
    pub device_position: Option<Coordinate>,
    /// Set by the first fix of a sharing run and held until the next run.
    pub start_point: Option<Coordinate>,
    pub stop_point: Option<Coordinate>,
    pub route: Route,
    pub sharing_active: bool,
    pub destination_query: String,
    pub suggestions: Vec<PlaceCandidate>,
}

/// Session state shared between the controller and the reporter.
///
/// The lock is never held across a fix, an HTTP call or a channel emit.
pub type SharedSession = Arc<Mutex<SharingSession>>;

//! The session controller: owns the sharing session and turns user actions
//! into place lookups, route resolutions and reporter start/stop.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use tokio::sync::Mutex;

use crate::channel::{Channel, RelayMessage};
use crate::device::{LocationProvider, Permission};
use crate::error::{Error, Result};
use crate::geo::{Coordinate, Route};
use crate::maps::places::is_searchable;
use crate::maps::{PlaceCandidate, PlaceResolver, RouteResolver};
use crate::reporter::{LocationReporter, ReporterHandle};
use crate::state::{SharedSession, SharingSession};

/// What happened to the session's route after a resolution request.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "outcome", content = "route", rename_all = "snake_case")]
pub enum RouteUpdate {
    /// The route was resolved and is now the session's route.
    Applied(Route),
    /// A newer request completed first; this result was discarded.
    Superseded,
    /// No start point yet, so nothing was resolved.
    NoStartPoint,
}

enum Reporting {
    Idle,
    // Waiting on the initial fix of this start attempt.
    Starting(u64),
    Active(ReporterHandle),
}

pub struct SessionController {
    session: SharedSession,
    location: Arc<dyn LocationProvider>,
    routes: Arc<dyn RouteResolver>,
    places: Arc<dyn PlaceResolver>,
    channel: Option<Arc<dyn Channel>>,
    reporter: LocationReporter,
    reporting: Mutex<Reporting>,
    start_attempts: AtomicU64,
    route_requests: AtomicU64,
    // Only read or written while the session lock is held.
    route_completed: AtomicU64,
}

impl SessionController {
    pub fn new(
        location: Arc<dyn LocationProvider>,
        routes: Arc<dyn RouteResolver>,
        places: Arc<dyn PlaceResolver>,
        channel: Option<Arc<dyn Channel>>,
        report_interval: Duration,
    ) -> Self {
        let session = SharedSession::default();
        let reporter = LocationReporter::new(
            session.clone(),
            location.clone(),
            channel.clone(),
            report_interval,
        );

        Self {
            session,
            location,
            routes,
            places,
            channel,
            reporter,
            reporting: Mutex::new(Reporting::Idle),
            start_attempts: AtomicU64::new(0),
            route_requests: AtomicU64::new(0),
            route_completed: AtomicU64::new(0),
        }
    }

    pub async fn snapshot(&self) -> SharingSession {
        self.session.lock().await.clone()
    }

    pub async fn is_sharing(&self) -> bool {
        matches!(*self.reporting.lock().await, Reporting::Active(_))
    }

    /// Take the initial fix, which becomes the start point, and begin
    /// reporting. A no-op while already sharing or starting.
    ///
    /// The fix is awaited without holding any lock, so a stop or shutdown
    /// arriving meanwhile is not blocked; the attempt then starts nothing.
    pub async fn start_sharing(&self) -> Result<()> {
        let attempt = self.start_attempts.fetch_add(1, Ordering::SeqCst) + 1;
        {
            let mut reporting = self.reporting.lock().await;
            if !matches!(*reporting, Reporting::Idle) {
                tracing::debug!("Already sharing location");
                return Ok(());
            }
            *reporting = Reporting::Starting(attempt);
        }

        let fix = self.initial_fix().await;

        let mut reporting = self.reporting.lock().await;
        let current = matches!(*reporting, Reporting::Starting(a) if a == attempt);
        let position = match fix {
            Ok(position) => position,
            Err(e) => {
                if current {
                    *reporting = Reporting::Idle;
                }
                return Err(e);
            }
        };
        if !current {
            tracing::debug!("Sharing was stopped during the initial fix, not starting");
            return Ok(());
        }

        {
            let mut session = self.session.lock().await;
            session.start_point = Some(position);
            session.device_position = Some(position);
            session.sharing_active = true;
        }
        tracing::info!("Initial location {:?}, starting to share", position);

        *reporting = Reporting::Active(self.reporter.start());
        Ok(())
    }

    async fn initial_fix(&self) -> Result<Coordinate> {
        if self.location.request_permission().await == Permission::Denied {
            tracing::warn!("Location permission denied");
            return Err(Error::PermissionDenied);
        }

        self.location.current_position().await.map_err(|e| {
            tracing::warn!("Initial location fix failed: {}", e);
            e
        })
    }

    /// Stop reporting, or abandon a start still waiting on its fix.
    /// Points, route and last position are kept.
    pub async fn stop_sharing(&self) {
        let previous = std::mem::replace(&mut *self.reporting.lock().await, Reporting::Idle);
        self.session.lock().await.sharing_active = false;

        if let Reporting::Active(handle) = previous {
            handle.stop();
            tracing::info!("Stopped sharing location");
        }
    }

    /// Mark a stop point picked on the map and route to it.
    pub async fn tap_map(&self, point: Coordinate) -> Result<RouteUpdate> {
        let start = {
            let mut session = self.session.lock().await;
            session.stop_point = Some(point);
            session.start_point
        };

        let Some(start) = start else {
            tracing::debug!("Stop point set to {:?}, no start point to route from", point);
            return Ok(RouteUpdate::NoStartPoint);
        };

        if let Some(channel) = &self.channel {
            channel.emit(RelayMessage::Endpoints {
                start_point: Some(start),
                stop_point: Some(point),
            });
            tracing::info!("Start and stop points sent");
        }

        self.resolve_route(start, point).await
    }

    /// Record the destination text and refresh suggestions for it.
    ///
    /// Queries under three characters clear the suggestions without a lookup.
    pub async fn update_destination_query(&self, query: &str) -> Vec<PlaceCandidate> {
        {
            let mut session = self.session.lock().await;
            session.destination_query = query.to_string();
            if !is_searchable(query) {
                session.suggestions.clear();
                return Vec::new();
            }
        }

        let candidates = self.places.autocomplete(query).await;

        let mut session = self.session.lock().await;
        // The user may have kept typing while this lookup was in flight.
        if session.destination_query == query {
            session.suggestions = candidates.clone();
        }
        candidates
    }

    /// Use a suggested place as the stop point and route to it.
    pub async fn select_candidate(&self, candidate_id: &str) -> Result<RouteUpdate> {
        let location = self.places.resolve_details(candidate_id).await?;

        let start = {
            let mut session = self.session.lock().await;
            let label = session
                .suggestions
                .iter()
                .find(|c| c.id == candidate_id)
                .map(|c| c.label.clone());
            if let Some(label) = label {
                session.destination_query = label;
            }
            session.suggestions.clear();
            session.stop_point = Some(location);
            session.start_point
        };

        match start {
            Some(start) => self.resolve_route(start, location).await,
            None => {
                tracing::debug!("Destination set, no start point to route from");
                Ok(RouteUpdate::NoStartPoint)
            }
        }
    }

    /// Stop sharing and close the relay channel.
    pub async fn shutdown(&self) {
        self.stop_sharing().await;
        if let Some(channel) = &self.channel {
            channel.close().await;
        }
    }

    async fn resolve_route(&self, start: Coordinate, stop: Coordinate) -> Result<RouteUpdate> {
        let request = self.route_requests.fetch_add(1, Ordering::SeqCst) + 1;
        let result = self.routes.resolve(start, stop).await;

        let mut session = self.session.lock().await;
        let newest = self.route_completed.fetch_max(request, Ordering::SeqCst);
        if newest > request {
            tracing::debug!("Discarding route #{}, #{} already completed", request, newest);
            return Ok(RouteUpdate::Superseded);
        }

        match result {
            Ok(route) => {
                session.route = route.clone();
                Ok(RouteUpdate::Applied(route))
            }
            Err(e) => {
                tracing::warn!("Route lookup failed, keeping the previous route: {}", e);
                Err(e)
            }
        }
    }
}

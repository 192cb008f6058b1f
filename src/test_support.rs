//! Doubles for the crate's external collaborators, shared by unit tests.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use tokio::sync::{oneshot, Semaphore};

use crate::channel::{Channel, RelayMessage};
use crate::device::{LocationProvider, Permission};
use crate::error::{Error, Result};
use crate::geo::{Coordinate, Route};
use crate::maps::{PlaceCandidate, PlaceResolver, RouteResolver};

#[derive(Default)]
pub struct RecordingChannel {
    sent: Mutex<Vec<RelayMessage>>,
}

impl RecordingChannel {
    pub fn messages(&self) -> Vec<RelayMessage> {
        self.sent.lock().unwrap().clone()
    }
}

#[async_trait]
impl Channel for RecordingChannel {
    fn emit(&self, message: RelayMessage) {
        self.sent.lock().unwrap().push(message);
    }
}

/// Plays back fixes in order; `None` is a failed fix. The last entry repeats.
pub struct ScriptedLocation {
    permission: Permission,
    script: Vec<Option<Coordinate>>,
    calls: AtomicUsize,
}

impl ScriptedLocation {
    pub fn new(script: Vec<Option<Coordinate>>) -> Self {
        Self {
            permission: Permission::Granted,
            script,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn always(position: Coordinate) -> Self {
        Self::new(vec![Some(position)])
    }

    pub fn denied() -> Self {
        Self {
            permission: Permission::Denied,
            ..Self::new(vec![None])
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for ScriptedLocation {
    async fn request_permission(&self) -> Permission {
        self.permission
    }

    async fn current_position(&self) -> Result<Coordinate> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.script.len().saturating_sub(1));
        self.script
            .get(index)
            .copied()
            .flatten()
            .ok_or_else(|| Error::LocationUnavailable("scripted failure".into()))
    }
}

/// Every fix waits until the test calls [`GatedLocation::release`].
pub struct GatedLocation {
    position: Coordinate,
    gate: Semaphore,
    calls: AtomicUsize,
}

impl GatedLocation {
    pub fn new(position: Coordinate) -> Self {
        Self {
            position,
            gate: Semaphore::new(0),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn release(&self) {
        self.gate.add_permits(1);
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl LocationProvider for GatedLocation {
    async fn request_permission(&self) -> Permission {
        Permission::Granted
    }

    async fn current_position(&self) -> Result<Coordinate> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let permit = self
            .gate
            .acquire()
            .await
            .map_err(|e| Error::LocationUnavailable(e.to_string()))?;
        permit.forget();
        Ok(self.position)
    }
}

type PendingRoute = (Coordinate, Coordinate, oneshot::Sender<Result<Route>>);

/// Route resolver whose answers the test supplies, possibly out of order.
#[derive(Default)]
pub struct ManualRoutes {
    pending: Mutex<VecDeque<PendingRoute>>,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl ManualRoutes {
    pub fn requests(&self) -> Vec<(Coordinate, Coordinate)> {
        self.requests.lock().unwrap().clone()
    }

    /// Answer the oldest unanswered request.
    pub fn answer_oldest(&self, result: Result<Route>) {
        let (_, _, reply) = self.pending.lock().unwrap().pop_front().expect("no pending route");
        let _ = reply.send(result);
    }

    /// Answer the newest unanswered request.
    pub fn answer_newest(&self, result: Result<Route>) {
        let (_, _, reply) = self.pending.lock().unwrap().pop_back().expect("no pending route");
        let _ = reply.send(result);
    }

    pub fn pending(&self) -> usize {
        self.pending.lock().unwrap().len()
    }
}

#[async_trait]
impl RouteResolver for ManualRoutes {
    async fn resolve(&self, start: Coordinate, stop: Coordinate) -> Result<Route> {
        let (reply, answer) = oneshot::channel();
        self.requests.lock().unwrap().push((start, stop));
        self.pending.lock().unwrap().push_back((start, stop, reply));
        answer.await.unwrap_or(Err(Error::NoRoute))
    }
}

/// Route resolver that answers immediately with a fixed outcome.
pub struct FixedRoutes {
    route: Option<Route>,
    requests: Mutex<Vec<(Coordinate, Coordinate)>>,
}

impl FixedRoutes {
    pub fn ok(route: Route) -> Self {
        Self {
            route: Some(route),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn failing() -> Self {
        Self {
            route: None,
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn requests(&self) -> Vec<(Coordinate, Coordinate)> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl RouteResolver for FixedRoutes {
    async fn resolve(&self, start: Coordinate, stop: Coordinate) -> Result<Route> {
        self.requests.lock().unwrap().push((start, stop));
        self.route.clone().ok_or(Error::NoRoute)
    }
}

/// Place resolver with a fixed catalogue, matched by label prefix.
#[derive(Default)]
pub struct StaticPlaces {
    places: Vec<(PlaceCandidate, Coordinate)>,
    queries: Mutex<Vec<String>>,
}

impl StaticPlaces {
    pub fn new(places: Vec<(PlaceCandidate, Coordinate)>) -> Self {
        Self {
            places,
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn queries(&self) -> Vec<String> {
        self.queries.lock().unwrap().clone()
    }
}

#[async_trait]
impl PlaceResolver for StaticPlaces {
    async fn autocomplete(&self, query: &str) -> Vec<PlaceCandidate> {
        self.queries.lock().unwrap().push(query.to_string());
        self.places
            .iter()
            .filter(|(candidate, _)| candidate.label.starts_with(query))
            .map(|(candidate, _)| candidate.clone())
            .collect()
    }

    async fn resolve_details(&self, candidate_id: &str) -> Result<Coordinate> {
        self.places
            .iter()
            .find(|(candidate, _)| candidate.id == candidate_id)
            .map(|(_, location)| *location)
            .ok_or(Error::MissingGeometry)
    }
}

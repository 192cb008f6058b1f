use async_trait::async_trait;
use serde::Deserialize;

use super::MapsClient;
use crate::error::{Error, Result};
use crate::geo::{Coordinate, Route};
use crate::polyline;

#[derive(Debug, Deserialize)]
struct DirectionsResponse {
    routes: Vec<DirectionsRoute>,
}

#[derive(Debug, Deserialize)]
struct DirectionsRoute {
    overview_polyline: EncodedPolyline,
}

#[derive(Debug, Deserialize)]
struct EncodedPolyline {
    points: String,
}

/// Resolves a driving route between two points.
#[async_trait]
pub trait RouteResolver: Send + Sync {
    async fn resolve(&self, start: Coordinate, stop: Coordinate) -> Result<Route>;
}

#[async_trait]
impl RouteResolver for MapsClient {
    /// Always takes the first route the provider returns; there is no ranking.
    async fn resolve(&self, start: Coordinate, stop: Coordinate) -> Result<Route> {
        let origin = start.to_query_value();
        let destination = stop.to_query_value();

        let response: DirectionsResponse = self
            .get_json(
                "directions",
                "directions/json",
                &[("origin", origin.as_str()), ("destination", destination.as_str())],
                &["ZERO_RESULTS"],
            )
            .await?;

        let first = response.routes.into_iter().next().ok_or(Error::NoRoute)?;
        let route = Route::from(polyline::decode(&first.overview_polyline.points));

        tracing::info!(
            "Route from {} to {} resolved with {} points",
            origin,
            destination,
            route.len()
        );
        Ok(route)
    }
}

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::MapsClient;
use crate::error::{Error, Result};
use crate::geo::Coordinate;

/// Queries shorter than this never reach the provider.
pub const MIN_QUERY_CHARS: usize = 3;

/// One autocomplete suggestion.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceCandidate {
    pub id: String,
    pub label: String,
}

#[derive(Debug, Deserialize)]
struct AutocompleteResponse {
    #[serde(default)]
    predictions: Vec<Prediction>,
}

#[derive(Debug, Deserialize)]
struct Prediction {
    place_id: String,
    description: String,
}

#[derive(Debug, Deserialize)]
struct DetailsResponse {
    result: Option<PlaceResult>,
}

#[derive(Debug, Deserialize)]
struct PlaceResult {
    geometry: Option<Geometry>,
}

#[derive(Debug, Deserialize)]
struct Geometry {
    location: LatLng,
}

#[derive(Debug, Deserialize)]
struct LatLng {
    lat: f64,
    lng: f64,
}

pub fn is_searchable(query: &str) -> bool {
    query.chars().count() >= MIN_QUERY_CHARS
}

#[async_trait]
pub trait PlaceResolver: Send + Sync {
    /// Candidates for a partial destination, in provider order.
    ///
    /// Never fails: errors are logged and produce an empty list.
    async fn autocomplete(&self, query: &str) -> Vec<PlaceCandidate>;

    /// The coordinate of a candidate picked from [`PlaceResolver::autocomplete`].
    async fn resolve_details(&self, candidate_id: &str) -> Result<Coordinate>;
}

impl MapsClient {
    async fn fetch_predictions(&self, query: &str) -> Result<Vec<PlaceCandidate>> {
        let response: AutocompleteResponse = self
            .get_json(
                "autocomplete",
                "place/autocomplete/json",
                &[("input", query)],
                &["ZERO_RESULTS"],
            )
            .await?;

        Ok(response
            .predictions
            .into_iter()
            .map(|p| PlaceCandidate {
                id: p.place_id,
                label: p.description,
            })
            .collect())
    }

    async fn fetch_location(&self, candidate_id: &str) -> Result<Coordinate> {
        let response: DetailsResponse = self
            .get_json(
                "place details",
                "place/details/json",
                &[("placeid", candidate_id)],
                &[],
            )
            .await?;

        let location = response
            .result
            .and_then(|r| r.geometry)
            .map(|g| g.location)
            .ok_or(Error::MissingGeometry)?;

        Ok(Coordinate::new(location.lat, location.lng))
    }
}

#[async_trait]
impl PlaceResolver for MapsClient {
    async fn autocomplete(&self, query: &str) -> Vec<PlaceCandidate> {
        if !is_searchable(query) {
            return Vec::new();
        }

        match self.fetch_predictions(query).await {
            Ok(candidates) => {
                tracing::debug!("{} suggestions for {:?}", candidates.len(), query);
                candidates
            }
            Err(e) => {
                tracing::warn!("Address search for {:?} failed: {}", query, e);
                Vec::new()
            }
        }
    }

    async fn resolve_details(&self, candidate_id: &str) -> Result<Coordinate> {
        match self.fetch_location(candidate_id).await {
            Ok(location) => {
                tracing::info!("Place {} is at {:?}", candidate_id, location);
                Ok(location)
            }
            Err(e) => {
                tracing::warn!("Failed to resolve place {}: {}", candidate_id, e);
                Err(e)
            }
        }
    }
}

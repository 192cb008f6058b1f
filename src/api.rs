//! Local HTTP control surface: the buttons, text box and map of the client,
//! expressed as routes.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};

use crate::controller::{RouteUpdate, SessionController};
use crate::error::Error;
use crate::geo::Coordinate;
use crate::maps::PlaceCandidate;
use crate::state::SharingSession;

#[derive(Debug, Serialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Deserialize)]
struct SuggestionQuery {
    #[serde(default)]
    query: String,
}

#[derive(Debug, Deserialize)]
struct SelectRequest {
    place_id: String,
}

#[derive(Debug)]
pub struct ApiError(StatusCode, String);

impl From<Error> for ApiError {
    fn from(error: Error) -> Self {
        let status = match &error {
            Error::PermissionDenied => StatusCode::FORBIDDEN,
            Error::LocationUnavailable(_) => StatusCode::SERVICE_UNAVAILABLE,
            Error::NoRoute => StatusCode::NOT_FOUND,
            Error::Network { .. }
            | Error::HttpStatus { .. }
            | Error::Upstream { .. }
            | Error::MalformedResponse { .. }
            | Error::MissingGeometry => StatusCode::BAD_GATEWAY,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        ApiError(status, error.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.0, Json(ErrorResponse { error: self.1 })).into_response()
    }
}

pub fn router(controller: Arc<SessionController>) -> Router {
    Router::new()
        .route("/session", get(get_session))
        .route("/sharing/start", post(start_sharing))
        .route("/sharing/stop", post(stop_sharing))
        .route("/map/tap", post(tap_map))
        .route("/destination/suggestions", get(get_suggestions))
        .route("/destination/select", post(select_destination))
        .with_state(controller)
}

async fn get_session(State(controller): State<Arc<SessionController>>) -> Json<SharingSession> {
    Json(controller.snapshot().await)
}

async fn start_sharing(
    State(controller): State<Arc<SessionController>>,
) -> Result<Json<SharingSession>, ApiError> {
    controller.start_sharing().await?;
    Ok(Json(controller.snapshot().await))
}

async fn stop_sharing(State(controller): State<Arc<SessionController>>) -> Json<SharingSession> {
    controller.stop_sharing().await;
    Json(controller.snapshot().await)
}

async fn tap_map(
    State(controller): State<Arc<SessionController>>,
    Json(point): Json<Coordinate>,
) -> Result<Json<RouteUpdate>, ApiError> {
    if !point.is_valid() {
        return Err(ApiError(
            StatusCode::BAD_REQUEST,
            format!("coordinate out of range: {}", point.to_query_value()),
        ));
    }
    Ok(Json(controller.tap_map(point).await?))
}

async fn get_suggestions(
    State(controller): State<Arc<SessionController>>,
    Query(params): Query<SuggestionQuery>,
) -> Json<Vec<PlaceCandidate>> {
    Json(controller.update_destination_query(&params.query).await)
}

async fn select_destination(
    State(controller): State<Arc<SessionController>>,
    Json(request): Json<SelectRequest>,
) -> Result<Json<RouteUpdate>, ApiError> {
    Ok(Json(controller.select_candidate(&request.place_id).await?))
}

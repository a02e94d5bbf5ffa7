pub mod config;
pub mod coordinator;
pub mod error;
pub mod geo;
pub mod gpx_export;
pub mod models;
pub mod planner;
pub mod providers;
pub mod resolver;
pub mod route_index;
pub mod sampler;
pub mod stops;

use std::sync::Arc;

use axum::{Json, Router, extract::State, http::StatusCode, routing::post};
use tower_http::cors::{Any, CorsLayer};

use crate::error::PlannerError;
use crate::models::{
    ApiError, NearbyRequest, NearbyResponse, PlanRequest, PlanResponse, StopLists, StopsRequest,
};
use crate::planner::TripPlanner;

#[derive(Clone)]
pub struct AppState {
    pub planner: Arc<TripPlanner>,
}

pub fn create_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/plan", post(plan_handler))
        .route("/api/stops", post(stops_handler))
        .route("/api/places/nearby", post(nearby_handler))
        .layer(cors)
        .with_state(state)
}

type ApiResult<T> = Result<Json<T>, (StatusCode, Json<ApiError>)>;

async fn plan_handler(
    State(state): State<AppState>,
    Json(req): Json<PlanRequest>,
) -> ApiResult<PlanResponse> {
    tracing::info!(
        "plan request: '{}' -> '{}'",
        req.trip.start_point,
        req.trip.destination
    );
    state.planner.plan(&req).await.map(Json).map_err(api_error)
}

async fn stops_handler(
    State(state): State<AppState>,
    Json(req): Json<StopsRequest>,
) -> ApiResult<StopLists> {
    state
        .planner
        .stops_for(&req.route, &req.trip)
        .await
        .map(Json)
        .map_err(api_error)
}

async fn nearby_handler(
    State(state): State<AppState>,
    Json(req): Json<NearbyRequest>,
) -> ApiResult<NearbyResponse> {
    state.planner.nearby(&req).await.map(Json).map_err(api_error)
}

fn api_error(err: PlannerError) -> (StatusCode, Json<ApiError>) {
    let status = match &err {
        PlannerError::InvalidCoordinate { .. } | PlannerError::InvalidParameter(_) => {
            StatusCode::BAD_REQUEST
        }
        PlannerError::LocationNotFound(_) => StatusCode::NOT_FOUND,
        PlannerError::Geocode(_) | PlannerError::Directions(_) | PlannerError::Places(_) => {
            StatusCode::BAD_GATEWAY
        }
        PlannerError::Gpx(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status.is_server_error() {
        tracing::warn!("request failed: {err}");
    }
    (
        status,
        Json(ApiError {
            message: err.to_string(),
        }),
    )
}

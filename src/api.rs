use std::collections::BTreeSet;
use std::sync::Arc;

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use geojson::{Geometry, Value as GeometryValue};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tower_http::cors::{Any, CorsLayer};
use tracing::debug;

use crate::dijkstra::RouteMode;
use crate::error::RouteError;
use crate::places::{Place, PlaceFilter};
use crate::route::Planner;

pub type AppState = Arc<Planner>;

pub fn router(state: AppState) -> Router {
    // Allows a local HTML map to talk to this API
    let cors = CorsLayer::new()
        .allow_methods(Any)
        .allow_origin(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(|| async { "OK" }))
        .route("/places", get(list_places))
        .route("/places/names", get(place_names))
        .route("/places/search", get(search_place))
        .route("/route", post(calculate_route))
        .layer(cors)
        .with_state(state)
}

pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Unprocessable(String),
}

impl From<RouteError> for ApiError {
    fn from(error: RouteError) -> Self {
        let message = error.to_string();
        match error {
            RouteError::UnknownPlace(_) => ApiError::NotFound(message),
            RouteError::SameEndpoints => ApiError::BadRequest(message),
            RouteError::NoReachableNode | RouteError::NoPath | RouteError::DegenerateRoute => {
                ApiError::Unprocessable(message)
            }
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error) = match self {
            ApiError::BadRequest(message) => (StatusCode::BAD_REQUEST, message),
            ApiError::NotFound(message) => (StatusCode::NOT_FOUND, message),
            ApiError::Unprocessable(message) => (StatusCode::UNPROCESSABLE_ENTITY, message),
        };
        (status, Json(ErrorBody { error })).into_response()
    }
}

// --- API DTOs ---

#[derive(Serialize, Deserialize, Debug, PartialEq)]
pub struct PlaceDto {
    pub name: String,
    pub lat: f64,
    pub lng: f64,
    pub properties: Map<String, Value>,
}

impl From<&Place> for PlaceDto {
    fn from(place: &Place) -> Self {
        Self {
            name: place.name.clone(),
            lat: place.position.lat,
            lng: place.position.lon,
            properties: place.properties.clone(),
        }
    }
}

#[derive(Deserialize)]
pub struct PlacesQuery {
    /// Comma separated.
    category: Option<String>,
    min_safety: Option<f64>,
    min_popularity: Option<f64>,
    min_lighting: Option<f64>,
}

impl From<PlacesQuery> for PlaceFilter {
    fn from(query: PlacesQuery) -> Self {
        let categories: BTreeSet<String> = query
            .category
            .iter()
            .flat_map(|c| c.split(','))
            .map(str::trim)
            .filter(|c| !c.is_empty())
            .map(str::to_string)
            .collect();
        let defaults = PlaceFilter::default();
        PlaceFilter {
            categories,
            min_safety: query.min_safety.unwrap_or(defaults.min_safety),
            min_popularity: query.min_popularity.unwrap_or(defaults.min_popularity),
            min_lighting: query.min_lighting.unwrap_or(defaults.min_lighting),
        }
    }
}

#[derive(Deserialize)]
pub struct SearchQuery {
    q: String,
}

#[derive(Deserialize)]
pub struct RouteRequest {
    pub start: String,
    pub end: String,
    /// "shortest" or "safest"
    pub mode: String,
}

#[derive(Serialize)]
pub struct RouteResponse {
    pub mode: RouteMode,
    /// [lon, lat] standard for GeoJSON
    pub geometry: Geometry,
    pub distance_meters: f64,
    pub safety_cost: f64,
}

// --- Handlers ---

async fn list_places(
    State(state): State<AppState>,
    Query(query): Query<PlacesQuery>,
) -> Json<Vec<PlaceDto>> {
    let filter = PlaceFilter::from(query);
    Json(state.places.filter(&filter).into_iter().map(PlaceDto::from).collect())
}

/// Every place name, unfiltered, for start and destination pickers.
async fn place_names(State(state): State<AppState>) -> Json<Vec<String>> {
    Json(state.places.names().into_iter().map(str::to_string).collect())
}

async fn search_place(
    State(state): State<AppState>,
    Query(query): Query<SearchQuery>,
) -> Result<Json<PlaceDto>, ApiError> {
    state
        .places
        .search(&query.q)
        .map(|place| Json(PlaceDto::from(place)))
        .ok_or_else(|| ApiError::NotFound("No matching place found".to_string()))
}

async fn calculate_route(
    State(state): State<AppState>,
    Json(payload): Json<RouteRequest>,
) -> Result<Json<RouteResponse>, ApiError> {
    let mode: RouteMode = payload.mode.parse().map_err(ApiError::BadRequest)?;
    debug!(start = %payload.start, end = %payload.end, %mode, "Route request");
    let route = state.compute_route(&payload.start, &payload.end, mode)?;

    let coordinates = route.path.iter().map(|c| c.to_lon_lat()).collect();
    Ok(Json(RouteResponse {
        mode: route.mode,
        geometry: Geometry::new(GeometryValue::LineString(coordinates)),
        distance_meters: route.distance_meters,
        safety_cost: route.safety_cost,
    }))
}

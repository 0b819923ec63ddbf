use std::sync::Arc;

use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use safewalk::api::{router, PlaceDto};
use safewalk::loader::Datasets;
use serde_json::{json, Value};
use tower::ServiceExt;

const PLACES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-75.2000, 39.9500]},
         "properties": {"Name": "Van Pelt Library", "Category": "Library", "PerceivedSafety": 4, "LightingLevel": 5, "Popularity_Night": 4}},
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-75.1980, 39.9510]},
         "properties": {"Name": "Houston Hall", "Category": "Student Center", "PerceivedSafety": 3, "LightingLevel": 2, "Popularity_Night": 2}},
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-75.1850, 39.9580]},
         "properties": {"Name": "Boathouse", "Category": "Sports", "PerceivedSafety": 2, "LightingLevel": 1, "Popularity_Night": 1}},
        {"type": "Feature", "geometry": {"type": "Point", "coordinates": [-75.1900, 39.9560]},
         "properties": {"Name": "Annenberg Center", "Category": "Arts"}}
    ]
}"#;

const STREETS: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString",
         "coordinates": [[-75.2000, 39.9500], [-75.1990, 39.9500], [-75.1980, 39.9510]]}},
        {"type": "Feature", "properties": {}, "geometry": {"type": "LineString",
         "coordinates": [[-75.1850, 39.9580], [-75.1850, 39.9585]]}}
    ]
}"#;

const CRIMES: &str = r#"{
    "type": "FeatureCollection",
    "features": [
        {"type": "Feature", "properties": {}, "geometry": {"type": "Point", "coordinates": [-75.1990, 39.9501]}}
    ]
}"#;

fn app() -> Router {
    let planner = Datasets::from_geojson(PLACES, STREETS, CRIMES)
        .unwrap()
        .into_planner();
    router(Arc::new(planner))
}

async fn send(request: Request<Body>) -> (StatusCode, Value) {
    let response = app().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

fn post_route(body: Value) -> Request<Body> {
    Request::post("/route")
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health() {
    let response = app().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn places_are_sorted_and_filterable() {
    let (status, body) = send(get("/places")).await;
    assert_eq!(status, StatusCode::OK);
    let places: Vec<PlaceDto> = serde_json::from_value(body).unwrap();
    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Boathouse", "Houston Hall", "Van Pelt Library"]);
    assert_eq!(places[2].lat, 39.95);
    assert_eq!(places[2].lng, -75.2);

    let (_, body) = send(get("/places?min_lighting=2&category=Library,Student%20Center")).await;
    let places: Vec<PlaceDto> = serde_json::from_value(body).unwrap();
    let names: Vec<&str> = places.iter().map(|p| p.name.as_str()).collect();
    assert_eq!(names, vec!["Houston Hall", "Van Pelt Library"]);
}

#[tokio::test]
async fn places_without_ratings_only_show_up_by_name() {
    let (_, body) = send(get("/places?category=Arts")).await;
    assert_eq!(body, json!([]));

    let (_, body) = send(get("/places?min_safety=0&min_popularity=0&min_lighting=0")).await;
    assert_eq!(body.as_array().unwrap().len(), 3);

    let (status, body) = send(get("/places/names")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!(["Annenberg Center", "Boathouse", "Houston Hall", "Van Pelt Library"])
    );
}

#[tokio::test]
async fn search() {
    let (status, body) = send(get("/places/search?q=houston")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Houston Hall");

    let (status, _) = send(get("/places/search?q=stadium")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn route_returns_geojson_line() {
    let (status, body) = send(post_route(json!({
        "start": "Van Pelt Library",
        "end": "Houston Hall",
        "mode": "safest"
    })))
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["mode"], "safest");
    assert_eq!(body["geometry"]["type"], "LineString");
    assert_eq!(
        body["geometry"]["coordinates"],
        json!([[-75.2, 39.95], [-75.199, 39.95], [-75.198, 39.951]])
    );
    let distance = body["distance_meters"].as_f64().unwrap();
    let safety = body["safety_cost"].as_f64().unwrap();
    assert!(safety > distance && distance > 0.0);
}

#[tokio::test]
async fn route_errors_map_to_status_codes() {
    let cases = [
        (json!({"start": "Van Pelt Library", "end": "Nowhere", "mode": "shortest"}), StatusCode::NOT_FOUND),
        (json!({"start": "Houston Hall", "end": "Houston Hall", "mode": "shortest"}), StatusCode::BAD_REQUEST),
        (json!({"start": "Van Pelt Library", "end": "Boathouse", "mode": "shortest"}), StatusCode::UNPROCESSABLE_ENTITY),
        (json!({"start": "Van Pelt Library", "end": "Houston Hall", "mode": "fastest"}), StatusCode::BAD_REQUEST),
    ];
    for (request, expected) in cases {
        let (status, _) = send(post_route(request.clone())).await;
        assert_eq!(status, expected, "{request}");
    }

    let (_, body) = send(post_route(json!({"start": "Van Pelt Library", "end": "Boathouse", "mode": "safest"}))).await;
    assert_eq!(body["error"], "No route found between these places");
}

#[tokio::test]
async fn unknown_mode_is_a_json_bad_request() {
    let (status, body) = send(post_route(json!({
        "start": "Van Pelt Library",
        "end": "Houston Hall",
        "mode": "fastest"
    })))
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "unknown route mode 'fastest'");
}

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

use axum::{
    body::Body,
    extract::{Path, Query},
    http::{header, HeaderMap, Request, Response, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use insee_geo_finder::config::Config;
use insee_geo_finder::routes::create_router;
use insee_geo_finder::AppState;
use serde_json::{json, Value};
use std::collections::HashMap;
use std::sync::Arc;
use tower::ServiceExt;

/// Answer returned by the fake language model.
#[allow(dead_code)]
pub const FAKE_ANSWER: &str = "Vernon compte environ 25 000 habitants.";

fn authorized(headers: &HeaderMap) -> bool {
    headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        == Some("Bearer test_insee_key")
}

fn square(lon: f64, lat: f64, size: f64) -> Value {
    json!({
        "type": "Polygon",
        "coordinates": [[
            [lon, lat],
            [lon + size, lat],
            [lon + size, lat + size],
            [lon, lat + size],
            [lon, lat]
        ]]
    })
}

async fn metadata(Path(endpoint): Path<String>, headers: HeaderMap) -> impl IntoResponse {
    if !authorized(&headers) {
        return (StatusCode::UNAUTHORIZED, Json(json!({"error": "unauthorized"})));
    }
    let body = match endpoint.as_str() {
        "communes" => json!([
            {"code": "27701", "intitule": "Vernon", "type": "Commune"},
            {"code": "27229", "intitule": "Évreux", "type": "Commune"},
            {"code": "75056", "intitule": "Paris", "type": "Commune"}
        ]),
        "departements" => json!([
            {"code": "27", "intitule": "Eure", "intituleComplet": "Eure"}
        ]),
        "regions" => json!([{"code": 28, "intitule": "Normandie"}]),
        _ => json!([]),
    };
    (StatusCode::OK, Json(body))
}

async fn geo_api(Path((collection, code)): Path<(String, String)>) -> impl IntoResponse {
    match (collection.as_str(), code.as_str()) {
        ("communes", "27701") => (
            StatusCode::OK,
            Json(json!({
                "type": "Feature",
                "properties": {"nom": "Vernon", "code": "27701"},
                "geometry": square(1.45, 49.07, 0.05)
            })),
        ),
        ("communes", "27229") => (
            StatusCode::OK,
            Json(json!({
                "type": "Feature",
                "properties": {"nom": "Évreux", "code": "27229"},
                "geometry": square(1.12, 49.0, 0.06)
            })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({"code": 404}))),
    }
}

async fn nominatim(Query(_params): Query<HashMap<String, String>>) -> Json<Value> {
    Json(json!({"type": "FeatureCollection", "features": []}))
}

async fn static_dataset(Path(file): Path<String>) -> impl IntoResponse {
    match file.as_str() {
        "departements.geojson" => (
            StatusCode::OK,
            Json(json!({
                "type": "FeatureCollection",
                "features": [{
                    "type": "Feature",
                    "properties": {"code": "27", "nom": "Eure"},
                    "geometry": square(0.3, 48.7, 1.2)
                }]
            })),
        ),
        _ => (StatusCode::NOT_FOUND, Json(json!({}))),
    }
}

async fn local_data(
    Path((_crossing, geo)): Path<(String, String)>,
    headers: HeaderMap,
) -> impl IntoResponse {
    if !authorized(&headers) || !geo.starts_with("COM-27701") {
        return (StatusCode::NOT_FOUND, Json(json!({})));
    }
    let body = if geo.ends_with(".all") {
        json!({"Cellule": {"Valeur": "25000"}})
    } else {
        json!({"Cellule": [{"Valeur": "900"}, {"Valeur": 334}]})
    };
    (StatusCode::OK, Json(body))
}

async fn llm(headers: HeaderMap, Query(params): Query<HashMap<String, String>>) -> impl IntoResponse {
    let key = headers.get("x-goog-api-key").and_then(|v| v.to_str().ok());
    if key != Some("test_llm_key") || params.contains_key("key") {
        return (StatusCode::FORBIDDEN, Json(json!({"error": "bad key"})));
    }
    (
        StatusCode::OK,
        Json(json!({
            "candidates": [{"content": {"parts": [{"text": FAKE_ANSWER}]}}]
        })),
    )
}

async fn sirene_search(Query(params): Query<HashMap<String, String>>) -> Json<Value> {
    let q = params.get("q").cloned().unwrap_or_default();
    if q.contains("Toulouse") {
        Json(json!({"unitesLegales": [{"siren": "213105554"}]}))
    } else {
        Json(json!({"unitesLegales": []}))
    }
}

async fn sirene_unit(Path(siren): Path<String>) -> Json<Value> {
    Json(json!({
        "uniteLegale": {"siren": siren, "denominationUniteLegale": "COMMUNE DE TOULOUSE"}
    }))
}

/// Spawn a local server standing in for every upstream service.
/// Returns its base URL.
pub async fn spawn_fake_upstream() -> String {
    let app = Router::new()
        .route("/metadonnees/geo/{endpoint}", get(metadata))
        .route("/geo/{collection}/{code}", get(geo_api))
        .route("/nominatim/search", get(nominatim))
        .route("/static/{file}", get(static_dataset))
        .route("/donnees-locales/V0.1/donnees/{crossing}/{geo}", get(local_data))
        .route("/llm/v1beta/models/{model}", post(llm))
        .route("/api-sirene/3.11/siren", get(sirene_search))
        .route("/api-sirene/3.11/siren/{siren}", get(sirene_unit));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind fake upstream");
    let addr = listener.local_addr().expect("No local address");
    tokio::spawn(async move {
        axum::serve(listener, app).await.ok();
    });
    format!("http://{}", addr)
}

/// Create a test app whose upstreams are unreachable.
/// Returns the router and the shared state.
#[allow(dead_code)]
pub fn create_test_app() -> (Router, Arc<AppState>) {
    create_test_app_with_config(Config::test_default())
}

#[allow(dead_code)]
pub fn create_test_app_with_config(config: Config) -> (Router, Arc<AppState>) {
    let state = Arc::new(AppState::new(config));
    (create_router(state.clone()), state)
}

/// Create a test app wired to a fresh fake upstream.
#[allow(dead_code)]
pub async fn create_test_app_with_upstream() -> (Router, Arc<AppState>) {
    let upstream = spawn_fake_upstream().await;
    create_test_app_with_config(Config::for_upstream(&upstream))
}

/// Send a request, carrying `cookie` if given.
#[allow(dead_code)]
pub async fn send(
    app: &Router,
    method: &str,
    uri: &str,
    cookie: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    let request = match body {
        Some(json) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.clone().oneshot(request).await.unwrap()
}

/// The `name=value` pair from a response's `Set-Cookie` header.
#[allow(dead_code)]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(str::to_string)
}

#[allow(dead_code)]
pub async fn body_bytes(response: Response<Body>) -> Vec<u8> {
    axum::body::to_bytes(response.into_body(), 1024 * 1024)
        .await
        .unwrap()
        .to_vec()
}

#[allow(dead_code)]
pub async fn body_json(response: Response<Body>) -> Value {
    serde_json::from_slice(&body_bytes(response).await).unwrap()
}

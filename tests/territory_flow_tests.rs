// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Search, select and map territories against a fake upstream.

use axum::http::{header, StatusCode};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use geo::polygon;
use insee_geo_finder::config::Config;
use insee_geo_finder::models::{Boundary, BoundaryGeometry};
use insee_geo_finder::routes::create_router;
use insee_geo_finder::services::{BoundaryRequest, BoundarySource, SourceError};
use insee_geo_finder::AppState;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

mod common;

#[tokio::test]
async fn test_vernon_end_to_end() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    // Search by exact name
    let response = common::send(&app, "GET", "/api/territories?kind=commune&q=Vernon", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["code"], "27701");

    // Search by partial, lowercase name
    let response = common::send(&app, "GET", "/api/territories?kind=commune&q=vern", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["catalog_size"], 3);
    let results = body["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["code"], "27701");
    assert_eq!(results[0]["display"], "Vernon (27701)");

    // Select it
    let response = common::send(&app, "GET", "/api/territories/commune/27701", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(common::session_cookie(&response).is_some());
    let info = common::body_json(response).await;
    assert_eq!(info["title"], "Vernon");
    assert_eq!(info["boundary_available"], true);
    assert_eq!(info["boundary_source"], "geo-api");
    assert!(info["dossier_url"]
        .as_str()
        .unwrap()
        .ends_with("COM-27701"));

    // Download the boundary
    let response = common::send(
        &app,
        "GET",
        "/api/territories/commune/27701/boundary",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers().get(header::CONTENT_TYPE).unwrap(),
        "application/geo+json"
    );
    assert_eq!(
        response.headers().get(header::CONTENT_DISPOSITION).unwrap(),
        "attachment; filename=\"27701.geojson\""
    );
    let geojson = common::body_json(response).await;
    assert_eq!(geojson["type"], "FeatureCollection");
    let feature = &geojson["features"][0];
    assert_eq!(feature["properties"]["code"], "27701");
    assert_eq!(feature["properties"]["nom"], "Vernon");
    assert_eq!(feature["properties"]["source"], "geo-api");
    assert_eq!(feature["geometry"]["type"], "Polygon");

    // Map document
    let response = common::send(&app, "GET", "/api/territories/commune/27701/map", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(common::body_bytes(response).await).unwrap();
    assert!(html.contains("L.map"));
    assert!(html.contains("<title>Vernon</title>"));
}

#[tokio::test]
async fn test_map_view_centered_on_boundary() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(&app, "GET", "/api/territories/commune/27701/view", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let view = common::body_json(response).await;

    let lat = view["center"][0].as_f64().unwrap();
    let lon = view["center"][1].as_f64().unwrap();
    assert!((49.07..49.12).contains(&lat));
    assert!((1.45..1.50).contains(&lon));
    assert_eq!(view["zoom"], 12);
    assert_eq!(view["base_layers"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn test_department_falls_back_to_static_dataset() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(&app, "GET", "/api/territories/department/27", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let info = common::body_json(response).await;
    assert_eq!(info["boundary_available"], true);
    assert_eq!(info["boundary_source"], "static-dataset");
}

#[tokio::test]
async fn test_numeric_region_code_is_accepted() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(&app, "GET", "/api/territories?kind=region&q=28", None, None).await;
    let body = common::body_json(response).await;
    assert_eq!(body["results"][0]["title"], "Normandie");
    assert_eq!(body["results"][0]["code"], "28");
}

#[tokio::test]
async fn test_territory_without_boundary() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    // Paris is in the catalog but no source has its boundary
    let response = common::send(&app, "GET", "/api/territories/commune/75056", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let info = common::body_json(response).await;
    assert_eq!(info["boundary_available"], false);
    assert!(info["boundary_source"].is_null());

    let response = common::send(
        &app,
        "GET",
        "/api/territories/commune/75056/boundary",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::send(&app, "GET", "/api/territories/commune/75056/map", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    let html = String::from_utf8(common::body_bytes(response).await).unwrap();
    assert!(html.contains("Sélectionnez un territoire valide"));
    assert!(!html.contains("L.map"));
}

#[tokio::test]
async fn test_unknown_code_is_not_found() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(&app, "GET", "/api/territories/commune/99999", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = common::body_json(response).await;
    assert_eq!(body["error"], "not_found");
}

#[tokio::test]
async fn test_indicators() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(
        &app,
        "GET",
        "/api/territories/commune/27701/indicators",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["population"], 25000.0);
    assert_eq!(body["etablissements"], 1234.0);

    // No data upstream: empty object, not an error
    let response = common::send(
        &app,
        "GET",
        "/api/territories/commune/27229/indicators",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(common::body_json(response).await, serde_json::json!({}));
}

#[tokio::test]
async fn test_sirene_lookup() {
    let (app, _state) = common::create_test_app_with_upstream().await;

    let response = common::send(
        &app,
        "GET",
        "/api/sirene?q=Mairie%20de%20Toulouse",
        None,
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let body = common::body_json(response).await;
    assert_eq!(body["uniteLegale"]["siren"], "213105554");

    let response = common::send(&app, "GET", "/api/sirene?q=Nowhere", None, None).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

/// Boundary source that counts how often it is asked.
struct CountingSource {
    calls: AtomicUsize,
}

impl BoundarySource for CountingSource {
    fn name(&self) -> &'static str {
        "counting"
    }

    fn attempt<'a>(
        &'a self,
        request: &'a BoundaryRequest,
    ) -> BoxFuture<'a, Result<Option<Boundary>, SourceError>> {
        async move {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(Some(Boundary {
                code: request.code.clone(),
                kind: request.kind,
                source: "counting",
                geometry: BoundaryGeometry::Polygon(polygon![
                    (x: 1.45, y: 49.07), (x: 1.50, y: 49.07), (x: 1.50, y: 49.12), (x: 1.45, y: 49.07)
                ]),
                properties: Default::default(),
            }))
        }
        .boxed()
    }
}

#[tokio::test]
async fn test_cache_clear_forces_refetch() {
    let upstream = common::spawn_fake_upstream().await;
    let counter = Arc::new(CountingSource {
        calls: AtomicUsize::new(0),
    });
    let state = Arc::new(
        AppState::new(Config::for_upstream(&upstream))
            .with_boundary_sources(vec![counter.clone() as Arc<dyn BoundarySource>]),
    );
    let app = create_router(state.clone());

    for _ in 0..2 {
        let response = common::send(&app, "GET", "/api/territories/commune/27701", None, None).await;
        assert_eq!(common::body_json(response).await["boundary_source"], "counting");
    }
    assert_eq!(counter.calls.load(Ordering::SeqCst), 1);

    let response = common::send(&app, "DELETE", "/api/cache", None, None).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = common::send(&app, "GET", "/api/territories/commune/27701", None, None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(counter.calls.load(Ordering::SeqCst), 2);
}

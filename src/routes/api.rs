// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory API routes: catalog search, info panel, boundary and map.

use crate::error::{AppError, Result};
use crate::middleware::SessionId;
use crate::models::{IndicatorSet, Territory, TerritoryKind};
use crate::services::render::{render_map_html, MapView};
use crate::services::search::search;
use crate::services::{BoundaryRequest, Selection};
use crate::AppState;
use axum::{
    extract::{Path, Query, State},
    http::{header, HeaderName, StatusCode},
    response::{Html, IntoResponse, Response},
    routing::{delete, get},
    Extension, Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
#[cfg(feature = "binding-generation")]
use ts_rs::TS;
use validator::Validate;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/kinds", get(get_kinds))
        .route("/api/territories", get(search_territories))
        .route("/api/territories/{kind}/{code}", get(get_territory))
        .route("/api/territories/{kind}/{code}/boundary", get(download_boundary))
        .route("/api/territories/{kind}/{code}/map", get(get_map))
        .route("/api/territories/{kind}/{code}/view", get(get_map_view))
        .route("/api/territories/{kind}/{code}/indicators", get(get_indicators))
        .route("/api/sirene", get(find_legal_unit))
        .route("/api/cache", delete(clear_cache))
}

pub(crate) fn parse_kind(raw: &str) -> Result<TerritoryKind> {
    raw.parse()
        .map_err(|e: crate::models::territory::UnknownKind| AppError::BadRequest(e.to_string()))
}

/// Look a territory up in its catalog, 404 if the code is unknown.
pub(crate) async fn find_territory(
    state: &AppState,
    kind: TerritoryKind,
    code: &str,
) -> Result<Territory> {
    state
        .catalog_service
        .find(kind, code)
        .await?
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Aucun territoire de type {} avec le code {}",
                kind,
                kind.pad_code(code)
            ))
        })
}

// ─── Kinds ───────────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct KindResponse {
    pub id: TerritoryKind,
    pub label: String,
}

async fn get_kinds() -> Json<Vec<KindResponse>> {
    Json(
        TerritoryKind::ALL
            .iter()
            .map(|k| KindResponse {
                id: *k,
                label: k.label().to_string(),
            })
            .collect(),
    )
}

// ─── Search ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct SearchQuery {
    kind: String,
    #[validate(length(max = 100))]
    q: Option<String>,
    #[validate(range(min = 1, max = 100))]
    limit: Option<usize>,
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TerritorySummary {
    pub code: String,
    pub title: String,
    pub kind: TerritoryKind,
    pub display: String,
}

impl From<Territory> for TerritorySummary {
    fn from(t: Territory) -> Self {
        Self {
            display: t.display(),
            code: t.code,
            title: t.title,
            kind: t.kind,
        }
    }
}

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct SearchResponse {
    pub kind: TerritoryKind,
    pub query: String,
    /// Size of the loaded catalog; 0 means the metadata service was unavailable.
    pub catalog_size: usize,
    pub results: Vec<TerritorySummary>,
}

/// Search the catalog of one kind by title or code.
async fn search_territories(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SearchQuery>,
) -> Result<Json<SearchResponse>> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    let kind = parse_kind(&params.kind)?;
    let query = params.q.unwrap_or_default();
    let limit = params.limit.unwrap_or(state.config.search_limit);

    let catalog = state.catalog_service.load(kind).await?;
    let results = search(&catalog, &query, limit);

    tracing::debug!(
        kind = %kind,
        query = %query,
        matches = results.len(),
        "Catalog search"
    );

    Ok(Json(SearchResponse {
        kind,
        query,
        catalog_size: catalog.len(),
        results: results.into_iter().map(TerritorySummary::from).collect(),
    }))
}

// ─── Info panel ──────────────────────────────────────────────

#[derive(Serialize)]
#[cfg_attr(feature = "binding-generation", derive(TS))]
#[cfg_attr(
    feature = "binding-generation",
    ts(export, export_to = "web/src/lib/generated/")
)]
pub struct TerritoryInfo {
    pub code: String,
    pub title: String,
    pub kind: TerritoryKind,
    pub dossier_url: String,
    pub boundary_available: bool,
    pub boundary_source: Option<String>,
    pub download_url: String,
    pub map_url: String,
    /// True if selecting this territory started a new chat.
    pub chat_reset: bool,
}

/// Select a territory: records it in the session and resolves its boundary.
async fn get_territory(
    State(state): State<Arc<AppState>>,
    Extension(session): Extension<SessionId>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Json<TerritoryInfo>> {
    let kind = parse_kind(&kind)?;
    let territory = find_territory(&state, kind, &code).await?;

    let chat_reset = state.sessions.select(
        &session.0,
        Selection {
            kind,
            code: territory.code.clone(),
            title: territory.title.clone(),
        },
    );

    let boundary = state
        .boundary_resolver
        .resolve(&BoundaryRequest::new(kind, &territory.code, &territory.title))
        .await;

    let base = format!("/api/territories/{}/{}", kind, territory.code);
    Ok(Json(TerritoryInfo {
        dossier_url: territory.dossier_url(),
        boundary_available: boundary.is_some(),
        boundary_source: boundary.map(|b| b.source.to_string()),
        download_url: format!("{}/boundary", base),
        map_url: format!("{}/map", base),
        code: territory.code,
        title: territory.title,
        kind,
        chat_reset,
    }))
}

// ─── Boundary & map ──────────────────────────────────────────

/// Download the boundary as `{code}.geojson`.
async fn download_boundary(
    State(state): State<Arc<AppState>>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Response> {
    let kind = parse_kind(&kind)?;
    let territory = find_territory(&state, kind, &code).await?;

    let boundary = state
        .boundary_resolver
        .resolve(&BoundaryRequest::new(kind, &territory.code, &territory.title))
        .await
        .ok_or_else(|| {
            AppError::NotFound(format!(
                "Contour indisponible pour {}",
                territory.display()
            ))
        })?;

    let body = serde_json::to_string(&boundary.to_download(&territory.title))
        .map_err(|e| AppError::Internal(e.into()))?;

    let headers: [(HeaderName, String); 2] = [
        (header::CONTENT_TYPE, "application/geo+json".to_string()),
        (
            header::CONTENT_DISPOSITION,
            format!("attachment; filename=\"{}.geojson\"", territory.code),
        ),
    ];
    Ok((StatusCode::OK, headers, body).into_response())
}

async fn map_view(state: &AppState, kind: TerritoryKind, code: &str) -> Result<Option<MapView>> {
    let territory = find_territory(state, kind, code).await?;
    let boundary = state
        .boundary_resolver
        .resolve(&BoundaryRequest::new(kind, &territory.code, &territory.title))
        .await;
    Ok(boundary.and_then(|b| MapView::build(&b, &territory.title, kind)))
}

/// Interactive Leaflet map, or a placeholder page if there is no boundary.
async fn get_map(
    State(state): State<Arc<AppState>>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Html<String>> {
    let kind = parse_kind(&kind)?;
    let view = map_view(&state, kind, &code).await?;
    Ok(Html(render_map_html(view.as_ref())))
}

/// Map view model for clients that draw their own map.
async fn get_map_view(
    State(state): State<Arc<AppState>>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Json<MapView>> {
    let kind = parse_kind(&kind)?;
    map_view(&state, kind, &code)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound("Contour géographique indisponible".to_string()))
}

// ─── Indicators ──────────────────────────────────────────────

async fn get_indicators(
    State(state): State<Arc<AppState>>,
    Path((kind, code)): Path<(String, String)>,
) -> Result<Json<IndicatorSet>> {
    let kind = parse_kind(&kind)?;
    let territory = find_territory(&state, kind, &code).await?;
    Ok(Json(
        state
            .indicators_service
            .fetch(kind, &territory.code)
            .await,
    ))
}

// ─── SIRENE ──────────────────────────────────────────────────

#[derive(Deserialize, Validate)]
struct SireneQuery {
    #[validate(length(min = 1, max = 100))]
    q: String,
}

/// Look up the legal unit of a local authority, e.g. "Mairie de Toulouse".
async fn find_legal_unit(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SireneQuery>,
) -> Result<Json<serde_json::Value>> {
    params
        .validate()
        .map_err(|e| AppError::BadRequest(e.to_string()))?;
    state
        .sirene_service
        .find(&params.q)
        .await?
        .map(Json)
        .ok_or_else(|| AppError::NotFound(format!("Aucune unité légale pour « {} »", params.q)))
}

// ─── Cache ───────────────────────────────────────────────────

async fn clear_cache(State(state): State<Arc<AppState>>) -> StatusCode {
    state.clear_caches();
    StatusCode::NO_CONTENT
}

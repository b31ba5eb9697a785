// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Community-maintained France GeoJSON dataset (departments and regions).
//!
//! Each file is downloaded once and kept in memory; lookups filter by the
//! `code` property.

use super::{BoundaryRequest, BoundarySource};
use crate::config::Config;
use crate::models::{Boundary, TerritoryKind};
use crate::services::upstream::{fetch_text, http_client, SourceError};
use dashmap::DashMap;
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use geojson::{FeatureCollection, GeoJson};
use serde_json::Value;
use std::sync::Arc;

const NAME: &str = "static-dataset";

fn dataset_file(kind: TerritoryKind) -> Option<&'static str> {
    match kind {
        TerritoryKind::Department => Some("departements.geojson"),
        TerritoryKind::Region => Some("regions.geojson"),
        _ => None,
    }
}

/// Select the feature whose `code` property equals `code`.
pub fn find_in_collection(
    collection: &FeatureCollection,
    code: &str,
    kind: TerritoryKind,
) -> Option<Boundary> {
    collection
        .features
        .iter()
        .find(|f| match f.property("code") {
            Some(Value::String(s)) => kind.pad_code(s) == code,
            Some(Value::Number(n)) => kind.pad_code(&n.to_string()) == code,
            _ => false,
        })
        .and_then(|f| Boundary::from_feature(f.clone(), code, kind, NAME))
}

pub struct StaticDatasetSource {
    http: reqwest::Client,
    base_url: String,
    datasets: DashMap<TerritoryKind, Arc<FeatureCollection>>,
}

impl StaticDatasetSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http_client(config.timeouts.geo_api * 4),
            base_url: config.static_boundaries_base_url.clone(),
            datasets: DashMap::new(),
        }
    }

    async fn dataset(
        &self,
        kind: TerritoryKind,
        file: &str,
    ) -> Result<Option<Arc<FeatureCollection>>, SourceError> {
        if let Some(cached) = self.datasets.get(&kind) {
            return Ok(Some(cached.clone()));
        }

        let url = format!("{}/{}", self.base_url, file);
        let Some(body) = fetch_text(self.http.get(&url), NAME).await? else {
            return Ok(None);
        };

        let collection = match body
            .parse::<GeoJson>()
            .map_err(|e| SourceError::malformed(NAME, e))?
        {
            GeoJson::FeatureCollection(fc) => Arc::new(fc),
            _ => return Err(SourceError::malformed(NAME, "expected a FeatureCollection")),
        };

        tracing::info!(
            kind = %kind,
            features = collection.features.len(),
            "Static boundary dataset loaded"
        );
        self.datasets.insert(kind, collection.clone());
        Ok(Some(collection))
    }

    async fn fetch(&self, request: &BoundaryRequest) -> Result<Option<Boundary>, SourceError> {
        let Some(file) = dataset_file(request.kind) else {
            return Ok(None);
        };
        let Some(collection) = self.dataset(request.kind, file).await? else {
            return Ok(None);
        };
        Ok(find_in_collection(&collection, &request.code, request.kind))
    }
}

impl BoundarySource for StaticDatasetSource {
    fn name(&self) -> &'static str {
        NAME
    }

    fn attempt<'a>(
        &'a self,
        request: &'a BoundaryRequest,
    ) -> BoxFuture<'a, Result<Option<Boundary>, SourceError>> {
        self.fetch(request).boxed()
    }
}

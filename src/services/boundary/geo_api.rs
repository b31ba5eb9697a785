// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! geo.api.gouv.fr contour lookup by official code.

use super::{BoundaryRequest, BoundarySource};
use crate::config::Config;
use crate::models::Boundary;
use crate::services::upstream::{fetch_text, http_client, SourceError};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use geojson::GeoJson;

const NAME: &str = "geo-api";

/// Authoritative source keyed by code. Does not serve study zonings.
pub struct GeoApiSource {
    http: reqwest::Client,
    base_url: String,
}

impl GeoApiSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http_client(config.timeouts.geo_api),
            base_url: config.geo_api_base_url.clone(),
        }
    }

    async fn fetch(&self, request: &BoundaryRequest) -> Result<Option<Boundary>, SourceError> {
        let Some(collection) = request.kind.geo_api_collection() else {
            return Ok(None);
        };

        let url = format!(
            "{}/{}/{}",
            self.base_url,
            collection,
            urlencoding::encode(&request.code)
        );
        let http_request = self
            .http
            .get(&url)
            .query(&[("format", "geojson"), ("geometry", "contour")]);

        let Some(body) = fetch_text(http_request, NAME).await? else {
            return Ok(None);
        };

        let geojson: GeoJson = body
            .parse()
            .map_err(|e: geojson::Error| SourceError::malformed(NAME, e))?;

        Ok(Boundary::from_geojson(
            geojson,
            &request.code,
            request.kind,
            NAME,
        ))
    }
}

impl BoundarySource for GeoApiSource {
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

// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! OpenStreetMap Nominatim free-text boundary search.

use super::{BoundaryRequest, BoundarySource};
use crate::config::Config;
use crate::models::{Boundary, TerritoryKind};
use crate::services::upstream::{fetch_text, http_client, SourceError};
use futures_util::future::BoxFuture;
use futures_util::FutureExt;
use geojson::GeoJson;

const NAME: &str = "nominatim";

/// EPCI abbreviations expanded before searching.
const EPCI_PREFIXES: [(&str, &str); 3] = [
    ("CA ", "Communauté d'agglomération "),
    ("CC ", "Communauté de communes "),
    ("CU ", "Communauté urbaine "),
];

/// Build the Nominatim query for a display name.
///
/// Drops anything from the first parenthesis on ("Vernon (27701)" ->
/// "Vernon") and expands EPCI abbreviations.
pub fn nominatim_query(name: &str, kind: TerritoryKind) -> String {
    let mut q = name.split('(').next().unwrap_or("").trim().to_string();

    if kind == TerritoryKind::Intercommunality {
        for (short, long) in EPCI_PREFIXES {
            if let Some(rest) = q.strip_prefix(short) {
                q = format!("{}{}", long, rest);
                break;
            }
        }
    }

    format!("{}, France", q)
}

/// Fallback source searching OSM by cleaned name.
pub struct NominatimSource {
    http: reqwest::Client,
    base_url: String,
    user_agent: String,
}

impl NominatimSource {
    pub fn new(config: &Config) -> Self {
        Self {
            http: http_client(config.timeouts.nominatim),
            base_url: config.nominatim_base_url.clone(),
            user_agent: config.nominatim_user_agent.clone(),
        }
    }

    async fn fetch(&self, request: &BoundaryRequest) -> Result<Option<Boundary>, SourceError> {
        if request.name.trim().is_empty() {
            return Ok(None);
        }

        let q = nominatim_query(&request.name, request.kind);
        let http_request = self
            .http
            .get(format!("{}/search", self.base_url))
            .header(reqwest::header::USER_AGENT, &self.user_agent)
            .query(&[
                ("q", q.as_str()),
                ("format", "geojson"),
                ("polygon_geojson", "1"),
                ("limit", "1"),
            ]);

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

impl BoundarySource for NominatimSource {
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

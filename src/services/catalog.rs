// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! INSEE metadata catalog loading.

use crate::config::Config;
use crate::error::AppError;
use crate::models::{Territory, TerritoryKind};
use crate::services::cache::SharedCache;
use crate::services::upstream::{fetch_json, http_client, SourceError};
use serde::Deserialize;
use serde_json::Value;
use std::sync::Arc;

const UPSTREAM: &str = "insee-metadata";

/// Raw row from `metadonnees/geo/{endpoint}`; field names vary by kind.
#[derive(Debug, Deserialize)]
struct RawTerritory {
    code: Option<Value>,
    #[serde(rename = "intituleComplet")]
    intitule_complet: Option<String>,
    intitule: Option<String>,
}

impl RawTerritory {
    fn into_territory(self, kind: TerritoryKind) -> Option<Territory> {
        let code = match self.code? {
            Value::String(s) => s,
            Value::Number(n) => n.to_string(),
            _ => return None,
        };
        let title = self
            .intitule_complet
            .filter(|t| !t.trim().is_empty())
            .or(self.intitule)?;
        if code.trim().is_empty() || title.trim().is_empty() {
            return None;
        }
        Some(Territory::new(kind, &code, title.trim()))
    }
}

/// Normalize a metadata payload into territories.
pub fn normalize_catalog(payload: Value, kind: TerritoryKind) -> Vec<Territory> {
    let rows = match payload {
        Value::Array(rows) => rows,
        _ => return Vec::new(),
    };

    rows.into_iter()
        .filter_map(|row| serde_json::from_value::<RawTerritory>(row).ok())
        .filter_map(|raw| raw.into_territory(kind))
        .collect()
}

/// Loads and memoizes territory catalogs.
#[derive(Clone)]
pub struct CatalogService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    cache: SharedCache<TerritoryKind, Arc<Vec<Territory>>>,
}

impl CatalogService {
    pub fn new(config: &Config, cache: SharedCache<TerritoryKind, Arc<Vec<Territory>>>) -> Self {
        Self {
            http: http_client(config.timeouts.metadata),
            base_url: config.insee_base_url.clone(),
            api_key: config.insee_api_key.clone(),
            cache,
        }
    }

    /// Load the catalog for a kind.
    ///
    /// Upstream failures yield an empty catalog; only a missing API key is
    /// reported as an error.
    pub async fn load(&self, kind: TerritoryKind) -> Result<Arc<Vec<Territory>>, AppError> {
        let api_key = self
            .api_key
            .as_deref()
            .ok_or(AppError::MissingCredential("INSEE_API_KEY"))?;

        if let Some(cached) = self.cache.get(&kind) {
            return Ok(cached);
        }

        let territories = match self.fetch(kind, api_key).await {
            Ok(Some(payload)) => normalize_catalog(payload, kind),
            Ok(None) => {
                tracing::debug!(kind = %kind, "Catalog endpoint returned no content");
                Vec::new()
            }
            Err(e) => {
                tracing::warn!(kind = %kind, error = %e, "Catalog load failed");
                Vec::new()
            }
        };

        let territories = Arc::new(territories);
        if !territories.is_empty() {
            tracing::info!(kind = %kind, count = territories.len(), "Catalog loaded");
            self.cache.insert(kind, territories.clone());
        }
        Ok(territories)
    }

    /// Find a territory by code within a kind's catalog.
    pub async fn find(
        &self,
        kind: TerritoryKind,
        code: &str,
    ) -> Result<Option<Territory>, AppError> {
        let code = kind.pad_code(code);
        let catalog = self.load(kind).await?;
        Ok(catalog.iter().find(|t| t.code == code).cloned())
    }

    async fn fetch(&self, kind: TerritoryKind, api_key: &str) -> Result<Option<Value>, SourceError> {
        let url = format!(
            "{}/metadonnees/geo/{}",
            self.base_url,
            kind.metadata_endpoint()
        );
        let request = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json");
        fetch_json(request, UPSTREAM).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_normalize_prefers_full_title_and_pads() {
        let payload = json!([
            {"code": "27701", "intitule": "Vernon", "type": "Commune"},
            {"code": 1001, "intitule": "L'Abergement-Clémenciat"},
            {"code": "200040715", "intituleComplet": "CA Seine Normandie Agglomération", "intitule": "SNA"},
        ]);

        let communes = normalize_catalog(payload.clone(), TerritoryKind::Commune);
        assert_eq!(communes[0].code, "27701");
        assert_eq!(communes[1].code, "01001");
        assert_eq!(communes[2].title, "CA Seine Normandie Agglomération");
    }

    #[test]
    fn test_normalize_skips_incomplete_rows() {
        let payload = json!([
            {"code": "84"},
            {"intitule": "Nowhere"},
            {"code": null, "intitule": "Null"},
            {"code": "11", "intitule": "Île-de-France"},
        ]);

        let regions = normalize_catalog(payload, TerritoryKind::Region);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].code, "11");
    }

    #[test]
    fn test_normalize_non_array_is_empty() {
        let payload = json!({"message": "quota exceeded"});
        assert!(normalize_catalog(payload, TerritoryKind::Commune).is_empty());
    }
}

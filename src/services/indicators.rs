// SPDX-License-Identifier: MIT
// Copyright 2026 Roland Dreier <roland@rolandd.dev>

//! Territory indicators from the INSEE local data API.
//!
//! Indicators are best-effort: a failing indicator is logged and left out,
//! it never fails the request.

use crate::config::Config;
use crate::models::{IndicatorSet, TerritoryKind};
use crate::services::cache::SharedCache;
use crate::services::upstream::{fetch_json, http_client, SourceError};
use serde_json::Value;

const UPSTREAM: &str = "insee-donnees-locales";
const API_VERSION: &str = "V0.1";

/// One indicator: a crossing of a dataset, summed over returned cells.
#[derive(Debug, Clone)]
pub struct IndicatorSpec {
    pub name: &'static str,
    /// Variable crossing, e.g. "SEXE" or "NA17"
    pub crossing: &'static str,
    /// Source dataset, e.g. "GEO2023RP2020"
    pub dataset: &'static str,
    /// "all" for the total, "*" for every modality (summed)
    pub modality: &'static str,
}

pub const DEFAULT_INDICATORS: [IndicatorSpec; 2] = [
    IndicatorSpec {
        name: "population",
        crossing: "SEXE",
        dataset: "GEO2023RP2020",
        modality: "all",
    },
    IndicatorSpec {
        name: "etablissements",
        crossing: "NA17",
        dataset: "GEO2023REE2023",
        modality: "*",
    },
];

/// Sum every `Cellule[*].Valeur` in a local-data payload.
///
/// `Cellule` may be an array or, for single-cell answers, a bare object.
/// Values may be numbers or numeric strings. Returns `None` when no cell
/// carries a usable value.
pub fn sum_cells(payload: &Value) -> Option<f64> {
    let cells: Vec<&Value> = match payload.get("Cellule")? {
        Value::Array(cells) => cells.iter().collect(),
        cell @ Value::Object(_) => vec![cell],
        _ => return None,
    };

    let values: Vec<f64> = cells
        .into_iter()
        .filter_map(|cell| match cell.get("Valeur")? {
            Value::Number(n) => n.as_f64(),
            Value::String(s) => s.trim().parse().ok(),
            _ => None,
        })
        .collect();

    if values.is_empty() {
        None
    } else {
        Some(values.iter().sum())
    }
}

#[derive(Clone)]
pub struct IndicatorsService {
    http: reqwest::Client,
    base_url: String,
    api_key: Option<String>,
    specs: Vec<IndicatorSpec>,
    cache: SharedCache<(TerritoryKind, String), IndicatorSet>,
}

impl IndicatorsService {
    pub fn new(config: &Config, cache: SharedCache<(TerritoryKind, String), IndicatorSet>) -> Self {
        Self {
            http: http_client(config.timeouts.stats),
            base_url: config.insee_base_url.clone(),
            api_key: config.insee_api_key.clone(),
            specs: DEFAULT_INDICATORS.to_vec(),
            cache,
        }
    }

    /// Fetch all configured indicators; empty on missing key or failures.
    pub async fn fetch(&self, kind: TerritoryKind, code: &str) -> IndicatorSet {
        let code = kind.pad_code(code);
        let Some(api_key) = self.api_key.as_deref() else {
            tracing::debug!("No INSEE key, skipping indicators");
            return IndicatorSet::default();
        };

        let key = (kind, code.clone());
        if let Some(cached) = self.cache.get(&key) {
            return cached;
        }

        let mut indicators = IndicatorSet::default();
        for spec in &self.specs {
            match self.fetch_one(spec, kind, &code, api_key).await {
                Ok(Some(value)) => indicators.insert(spec.name, value),
                Ok(None) => {
                    tracing::debug!(indicator = spec.name, code = %code, "Indicator not available")
                }
                Err(e) => {
                    tracing::warn!(indicator = spec.name, code = %code, error = %e, "Indicator fetch failed")
                }
            }
        }

        if !indicators.is_empty() {
            self.cache.insert(key, indicators.clone());
        }
        indicators
    }

    async fn fetch_one(
        &self,
        spec: &IndicatorSpec,
        kind: TerritoryKind,
        code: &str,
        api_key: &str,
    ) -> Result<Option<f64>, SourceError> {
        let url = format!(
            "{}/donnees-locales/{}/donnees/geo-{}@{}/{}-{}.{}",
            self.base_url,
            API_VERSION,
            spec.crossing,
            spec.dataset,
            kind.insee_prefix(),
            urlencoding::encode(code),
            spec.modality
        );
        let request = self
            .http
            .get(&url)
            .bearer_auth(api_key)
            .header(reqwest::header::ACCEPT, "application/json");

        let payload: Option<Value> = fetch_json(request, UPSTREAM).await?;
        Ok(payload.as_ref().and_then(sum_cells))
    }
}
